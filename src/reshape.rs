use std::collections::BTreeMap;
use std::f64::consts::PI;

use ndarray::Array1;
use tracing::debug;

use crate::merge::JoinedTable;
use crate::models::{ColumnKey, Metric, YearMatrix};

/// Scales population to a marker diameter in screen pixels.
const MARKER_SCALE: f64 = 0.003;

pub fn marker_size(population: f64) -> f64 {
    MARKER_SCALE * (population / PI).sqrt()
}

/// One row per country, one column per (metric, year).
#[derive(Debug, Clone)]
pub struct WideTable {
    pub entities: Vec<String>,
    pub groups: Vec<String>,
    columns: BTreeMap<ColumnKey, Array1<f64>>,
}

impl WideTable {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn column(&self, key: ColumnKey) -> Option<&Array1<f64>> {
        self.columns.get(&key)
    }
}

fn insert_year_columns(
    columns: &mut BTreeMap<ColumnKey, Array1<f64>>,
    metric: Metric,
    matrix: &YearMatrix,
) {
    for (idx, &year) in matrix.years.iter().enumerate() {
        columns.insert(ColumnKey::new(metric, year), matrix.values.column(idx).to_owned());
    }
}

/// Splits every metric into `<metric>_<year>` columns and derives
/// `size_<year>` for each population year.
pub fn reshape(joined: JoinedTable) -> WideTable {
    let mut columns = BTreeMap::new();
    insert_year_columns(&mut columns, Metric::Gdp, &joined.gdp);
    insert_year_columns(&mut columns, Metric::Lex, &joined.lex);
    insert_year_columns(&mut columns, Metric::Pop, &joined.pop);

    for (idx, &year) in joined.pop.years.iter().enumerate() {
        let sizes = joined.pop.values.column(idx).mapv(marker_size);
        columns.insert(ColumnKey::new(Metric::Size, year), sizes);
    }

    debug!(columns = columns.len(), rows = joined.entities.len(), "reshaped joined table");

    WideTable {
        entities: joined.entities,
        groups: joined.groups,
        columns,
    }
}
