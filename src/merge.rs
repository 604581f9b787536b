use std::collections::HashMap;

use ndarray::Axis;
use tracing::{debug, info};

use crate::models::{RegionRecord, YearMatrix, YearTable};

/// Countries present in every input, aligned row-for-row across metrics.
#[derive(Debug, Clone)]
pub struct JoinedTable {
    pub entities: Vec<String>,
    pub groups: Vec<String>,
    pub gdp: YearMatrix,
    pub lex: YearMatrix,
    pub pop: YearMatrix,
}

impl JoinedTable {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

fn row_lookup(table: &YearTable) -> HashMap<&str, usize> {
    table
        .entities
        .iter()
        .enumerate()
        .map(|(idx, entity)| (entity.as_str(), idx))
        .collect()
}

fn select_rows(matrix: &YearMatrix, rows: &[usize]) -> YearMatrix {
    YearMatrix {
        years: matrix.years.clone(),
        values: matrix.values.select(Axis(0), rows),
    }
}

/// Inner join GDP ⋈ Region ⋈ LifeExpectancy ⋈ Population on the entity name.
/// Entities missing from any input are dropped; row order follows `gdp`.
pub fn merge_tables(
    gdp: &YearTable,
    regions: &[RegionRecord],
    lex: &YearTable,
    pop: &YearTable,
) -> JoinedTable {
    let mut region_of: HashMap<&str, &str> = HashMap::new();
    for record in regions {
        region_of
            .entry(record.entity.as_str())
            .or_insert(record.group.as_str());
    }
    let lex_rows = row_lookup(lex);
    let pop_rows = row_lookup(pop);

    let mut entities = Vec::new();
    let mut groups = Vec::new();
    let mut gdp_idx = Vec::new();
    let mut lex_idx = Vec::new();
    let mut pop_idx = Vec::new();

    for (row, entity) in gdp.entities.iter().enumerate() {
        let key = entity.as_str();
        match (region_of.get(key), lex_rows.get(key), pop_rows.get(key)) {
            (Some(group), Some(&l), Some(&p)) => {
                entities.push(entity.clone());
                groups.push(group.to_string());
                gdp_idx.push(row);
                lex_idx.push(l);
                pop_idx.push(p);
            }
            (None, _, _) => debug!(entity = key, missing_from = "region", "dropped by inner join"),
            (_, None, _) => debug!(entity = key, missing_from = %lex.metric, "dropped by inner join"),
            (_, _, None) => debug!(entity = key, missing_from = %pop.metric, "dropped by inner join"),
        }
    }

    info!(
        kept = entities.len(),
        dropped = gdp.entities.len() - entities.len(),
        "merged indicator tables"
    );

    JoinedTable {
        entities,
        groups,
        gdp: select_rows(&gdp.matrix, &gdp_idx),
        lex: select_rows(&lex.matrix, &lex_idx),
        pop: select_rows(&pop.matrix, &pop_idx),
    }
}
