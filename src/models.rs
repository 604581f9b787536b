use std::fmt;

use ndarray::Array2;
use serde::Deserialize;

/// Per-year quantity carried by the joined table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Gdp,
    Lex,
    Pop,
    /// Marker size derived from `Pop`, never loaded from a file.
    Size,
}

impl Metric {
    pub fn prefix(self) -> &'static str {
        match self {
            Metric::Gdp => "gdp",
            Metric::Lex => "lex",
            Metric::Pop => "pop",
            Metric::Size => "size",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Name of one wide-table column, rendered as `<metric>_<year>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnKey {
    pub metric: Metric,
    pub year: u16,
}

impl ColumnKey {
    pub fn new(metric: Metric, year: u16) -> Self {
        ColumnKey { metric, year }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.metric, self.year)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionRecord {
    #[serde(rename = "Entity")]
    pub entity: String,

    #[serde(rename = "Group")]
    pub group: String,
}

/// Year columns of one metric; missing cells are NaN.
#[derive(Debug, Clone)]
pub struct YearMatrix {
    pub years: Vec<u16>,
    pub values: Array2<f64>,
}

/// One loaded indicator file.
#[derive(Debug, Clone)]
pub struct YearTable {
    pub metric: Metric,
    pub entities: Vec<String>,
    pub matrix: YearMatrix,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_key_renders_metric_then_year() {
        assert_eq!(ColumnKey::new(Metric::Size, 1952).to_string(), "size_1952");
        assert_eq!(ColumnKey::new(Metric::Gdp, 2015).to_string(), "gdp_2015");
    }

    #[test]
    fn column_keys_order_by_metric_then_year() {
        let mut keys = vec![
            ColumnKey::new(Metric::Pop, 1800),
            ColumnKey::new(Metric::Gdp, 2015),
            ColumnKey::new(Metric::Gdp, 1800),
        ];
        keys.sort();
        assert_eq!(keys[0], ColumnKey::new(Metric::Gdp, 1800));
        assert_eq!(keys[2], ColumnKey::new(Metric::Pop, 1800));
    }
}
