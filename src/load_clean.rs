use std::collections::HashSet;
use std::path::Path;

use csv::ReaderBuilder;
use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::error::{GapminderError, Result};
use crate::models::{Metric, RegionRecord, YearMatrix, YearTable};

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> GapminderError + '_ {
    move |source| GapminderError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

// Cells may carry thousands separators ("1,234,567"); blanks and junk read as missing.
pub(crate) fn parse_value(raw: &str) -> f64 {
    let cleaned: String = raw.trim().chars().filter(|&c| c != ',').collect();
    if cleaned.is_empty() {
        return f64::NAN;
    }
    cleaned.parse::<f64>().unwrap_or(f64::NAN)
}

/// Loads one indicator file. Column 0 is the entity name whatever its header;
/// every other header must be a year.
pub fn load_year_table(path: &Path, metric: Metric) -> Result<YearTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error(path))?;

    let headers = reader.headers().map_err(csv_error(path))?.clone();
    if headers.is_empty() {
        return Err(GapminderError::MissingHeader(path.to_path_buf()));
    }

    // (csv field index, year) for the declared year columns
    let mut year_columns = Vec::new();
    for (idx, header) in headers.iter().enumerate().skip(1) {
        match header.trim().parse::<u16>() {
            Ok(year) => year_columns.push((idx, year)),
            Err(_) => warn!(file = %path.display(), header, "skipping non-year column"),
        }
    }

    let mut entities = Vec::new();
    let mut seen = HashSet::new();
    let mut data = Vec::new();

    for record in reader.records() {
        let record = record.map_err(csv_error(path))?;
        let entity = record.get(0).unwrap_or("").trim();
        if entity.is_empty() {
            continue;
        }
        if !seen.insert(entity.to_string()) {
            warn!(file = %path.display(), entity, "duplicate entity, keeping first row");
            continue;
        }

        entities.push(entity.to_string());
        data.extend(
            year_columns
                .iter()
                .map(|&(idx, _)| record.get(idx).map(parse_value).unwrap_or(f64::NAN)),
        );
    }

    let rows = entities.len();
    let cols = year_columns.len();
    let values = Array2::from_shape_vec((rows, cols), data)?;

    info!(
        file = %path.display(),
        %metric,
        entities = rows,
        years = cols,
        "loaded indicator table"
    );

    Ok(YearTable {
        metric,
        entities,
        matrix: YearMatrix {
            years: year_columns.into_iter().map(|(_, year)| year).collect(),
            values,
        },
    })
}

pub fn load_regions(path: &Path) -> Result<Vec<RegionRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_error(path))?;

    let mut records = Vec::new();
    for result in reader.deserialize() {
        let mut record: RegionRecord = result.map_err(csv_error(path))?;
        record.entity = record.entity.trim().to_string();
        record.group = record.group.trim().to_string();
        records.push(record);
    }

    debug!(file = %path.display(), rows = records.len(), "loaded region labels");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parse_value_strips_thousands_separators() {
        assert_eq!(parse_value("1,234,567"), 1_234_567.0);
        assert_eq!(parse_value(" 42.5 "), 42.5);
        assert!(parse_value("").is_nan());
        assert!(parse_value("n/a").is_nan());
    }

    #[test]
    fn loads_year_table_with_missing_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pop.csv");
        fs::write(
            &path,
            "Total population,1800,1810,note\n\
             Sweden,\"2,000\",,x\n\
             ,1,2,\n\
             Norway,900\n",
        )
        .unwrap();

        let table = load_year_table(&path, Metric::Pop).unwrap();
        assert_eq!(table.entities, vec!["Sweden", "Norway"]);
        assert_eq!(table.matrix.years, vec![1800, 1810]);
        assert_eq!(table.matrix.values[(0, 0)], 2000.0);
        assert!(table.matrix.values[(0, 1)].is_nan());
        assert_eq!(table.matrix.values[(1, 0)], 900.0);
        assert!(table.matrix.values[(1, 1)].is_nan());
    }

    #[test]
    fn duplicate_entities_keep_first_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gdp.csv");
        fs::write(&path, "GDP per capita,2000\nChad,100\nChad,999\n").unwrap();

        let table = load_year_table(&path, Metric::Gdp).unwrap();
        assert_eq!(table.entities.len(), 1);
        assert_eq!(table.matrix.values[(0, 0)], 100.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_year_table(&dir.path().join("absent.csv"), Metric::Lex).unwrap_err();
        assert!(matches!(err, GapminderError::Csv { .. }));
    }

    #[test]
    fn empty_file_has_no_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();

        let err = load_year_table(&path, Metric::Gdp).unwrap_err();
        assert!(matches!(err, GapminderError::MissingHeader(p) if p == path));
    }

    #[test]
    fn regions_ignore_extra_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("regions.csv");
        fs::write(
            &path,
            "Entity,Code,Group\nSweden,SWE,Europe & Central Asia\nChad,TCD,Sub-Saharan Africa\n",
        )
        .unwrap();

        let regions = load_regions(&path).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].entity, "Chad");
        assert_eq!(regions[1].group, "Sub-Saharan Africa");
    }
}
