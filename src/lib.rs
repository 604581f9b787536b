//! Gapminder-style bubble chart: income against life expectancy per country,
//! one frame per year, written as a single interactive HTML page.

pub mod chart;
pub mod config;
pub mod error;
pub mod load_clean;
pub mod merge;
pub mod models;
pub mod page;
pub mod reshape;
pub mod snapshot;

use std::path::PathBuf;

use tracing::info;

use crate::chart::{axis_bounds, render_chart, value_extent};
use crate::config::Config;
use crate::error::{GapminderError, Result};
use crate::load_clean::{load_regions, load_year_table};
use crate::merge::merge_tables;
use crate::models::Metric;
use crate::page::{render_document, write_document};
use crate::reshape::reshape;
use crate::snapshot::{require_year, GroupPalette};

/// Loads the four inputs, builds the chart and writes the page.
/// Returns the path of the written document.
pub fn run(config: &Config) -> Result<PathBuf> {
    config.validate()?;

    let gdp = load_year_table(&config.gdp_path(), Metric::Gdp)?;
    let regions = load_regions(&config.regions_path())?;
    let lex = load_year_table(&config.lex_path(), Metric::Lex)?;
    let pop = load_year_table(&config.pop_path(), Metric::Pop)?;

    // Axis ranges cover every country in the source tables, joined or not.
    let gdp_extent =
        value_extent(&gdp.matrix.values).ok_or(GapminderError::EmptyMetric(Metric::Gdp))?;
    let lex_extent =
        value_extent(&lex.matrix.values).ok_or(GapminderError::EmptyMetric(Metric::Lex))?;
    let bounds = axis_bounds(gdp_extent, lex_extent)?;

    let palette = GroupPalette::from_labels(regions.iter().map(|r| r.group.as_str()))?;

    let table = reshape(merge_tables(&gdp, &regions, &lex, &pop));
    require_year(&table, config.snapshot_year)?;
    let colors = palette.row_colors(&table.groups)?;

    let chart = render_chart(&table, &palette, &bounds, config)?;
    let html = render_document(&chart, &table, &colors, config)?;
    write_document(&config.output_path, &html)?;

    info!(countries = table.len(), groups = palette.groups().len(), "done");
    Ok(config.output_path.clone())
}
