use std::collections::BTreeMap;
use std::ops::Range;

use ndarray::Array2;
use ndarray_stats::QuantileExt;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{GapminderError, Result};
use crate::reshape::WideTable;
use crate::snapshot::{select_snapshot, GroupPalette, Snapshot, SPECTRAL6};

const X_DESC: &str = "Income per person (GDP/capita, PPP$ inflation-adjusted)";
const Y_DESC: &str = "Life expectancy (years)";
const LEGEND_TEXT: RGBColor = RGBColor(0x66, 0x66, 0x66);
// Legend swatches sit this far left of their label, in GDP units.
const LEGEND_SWATCH_OFFSET: f64 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

fn floor_to(value: f64, step: f64) -> f64 {
    step * (value / step).floor()
}

/// Smallest and largest non-missing value in the table.
pub fn value_extent(values: &Array2<f64>) -> Option<(f64, f64)> {
    let min = *values.min_skipnan();
    let max = *values.max_skipnan();
    if min.is_nan() || max.is_nan() {
        None
    } else {
        Some((min, max))
    }
}

/// Rounds the data extents outward: x to hundreds below and thousands above,
/// y to tens below and hundreds above.
pub fn axis_bounds(gdp: (f64, f64), lex: (f64, f64)) -> Result<AxisBounds> {
    let (min_gdp, max_gdp) = gdp;
    let (min_lex, max_lex) = lex;

    let mut min_x = floor_to(min_gdp, 100.0);
    if min_x <= 0.0 {
        // log axis cannot start at zero
        min_x = min_gdp;
    }
    if min_x <= 0.0 {
        return Err(GapminderError::InvalidLogRange(min_gdp));
    }

    Ok(AxisBounds {
        min_x,
        max_x: floor_to(max_gdp, 1000.0) + 1000.0,
        min_y: floor_to(min_lex, 10.0),
        max_y: floor_to(max_lex, 100.0) + 100.0,
    })
}

const ABBREVIATIONS: [(f64, &str); 5] =
    [(1.0, ""), (1e3, "k"), (1e6, "m"), (1e9, "b"), (1e12, "t")];

/// Tick label in numeral.js `0a` style: 500, 1k, 25k, 3m.
pub fn format_abbrev(value: f64) -> String {
    let magnitude = value.abs();
    let mut unit = ABBREVIATIONS
        .iter()
        .rposition(|&(scale, _)| magnitude >= scale)
        .unwrap_or(0);
    // halves round away from zero; 999.7 becomes 1k rather than 1000
    let mut whole = (value / ABBREVIATIONS[unit].0).round();
    if whole.abs() >= 1000.0 && unit + 1 < ABBREVIATIONS.len() {
        unit += 1;
        whole = (value / ABBREVIATIONS[unit].0).round();
    }
    format!("{}{}", whole, ABBREVIATIONS[unit].1)
}

/// Pre-serialised bubble positions for one slider year. `None` hides the row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub cx: Vec<Option<i32>>,
    pub cy: Vec<Option<i32>>,
    pub r: Vec<Option<f64>>,
    pub pop: Vec<Option<f64>>,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Projects a snapshot into pixel space. Marker size is a diameter.
pub fn build_frame<F>(snapshot: &Snapshot, project: F) -> Frame
where
    F: Fn(f64, f64) -> (i32, i32),
{
    let rows = snapshot.x.len();
    let mut frame = Frame {
        cx: Vec::with_capacity(rows),
        cy: Vec::with_capacity(rows),
        r: Vec::with_capacity(rows),
        pop: Vec::with_capacity(rows),
    };

    for row in 0..rows {
        let point = finite(snapshot.x[row])
            .filter(|&x| x > 0.0)
            .zip(finite(snapshot.y[row]))
            .zip(finite(snapshot.size[row]));

        match point {
            Some(((x, y), size)) => {
                let (cx, cy) = project(x, y);
                frame.cx.push(Some(cx));
                frame.cy.push(Some(cy));
                frame.r.push(Some((size * 50.0).round() / 100.0));
            }
            None => {
                frame.cx.push(None);
                frame.cy.push(None);
                frame.r.push(None);
            }
        }
        frame.pop.push(finite(snapshot.pop[row]));
    }

    frame
}

#[derive(Debug, Clone)]
pub struct RenderedChart {
    /// Axes, labels and legend; the bubble layer is added by the page.
    pub svg: String,
    pub frames: BTreeMap<u16, Frame>,
    /// Pixel extent of the plotting area, x then y.
    pub plot_area: (Range<i32>, Range<i32>),
}

struct StaticLayers {
    frames: BTreeMap<u16, Frame>,
    plot_area: (Range<i32>, Range<i32>),
}

fn draw_static_layers(
    svg: &mut String,
    table: &WideTable,
    palette: &GroupPalette,
    bounds: &AxisBounds,
    config: &Config,
) -> Result<StaticLayers> {
    let root = SVGBackend::with_string(svg, (config.plot_width, config.plot_height))
        .into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (bounds.min_x..bounds.max_x).log_scale(),
            bounds.min_y..bounds.max_y,
        )?;

    chart
        .configure_mesh()
        .x_desc(X_DESC)
        .y_desc(Y_DESC)
        .x_label_formatter(&|x| format_abbrev(*x))
        .axis_desc_style(("sans-serif", 15))
        .label_style(("sans-serif", 12))
        .draw()?;

    let (text_x, mut text_y) = config.legend_origin;
    for (slot, group) in palette.groups().iter().enumerate() {
        chart.draw_series(std::iter::once(Text::new(
            group.clone(),
            (text_x, text_y),
            ("sans-serif", 13)
                .into_font()
                .color(&LEGEND_TEXT)
                .pos(Pos::new(HPos::Left, VPos::Bottom)),
        )))?;
        chart.draw_series(std::iter::once(Circle::new(
            (text_x - LEGEND_SWATCH_OFFSET, text_y + 1.0),
            5,
            SPECTRAL6[slot].mix(0.8).filled(),
        )))?;
        text_y -= config.legend_step;
    }

    let frames: BTreeMap<u16, Frame> = config
        .slider
        .years()
        .map(|year| {
            let snapshot = select_snapshot(table, year);
            (year, build_frame(&snapshot, |x, y| chart.backend_coord(&(x, y))))
        })
        .collect();

    let plot_area = chart.plotting_area().get_pixel_range();
    root.present()?;
    Ok(StaticLayers { frames, plot_area })
}

/// Draws the static chart and pre-computes one frame per slider year.
pub fn render_chart(
    table: &WideTable,
    palette: &GroupPalette,
    bounds: &AxisBounds,
    config: &Config,
) -> Result<RenderedChart> {
    debug!(?bounds, "drawing chart");
    let mut svg = String::new();
    let layers = draw_static_layers(&mut svg, table, palette, bounds, config)?;
    info!(frames = layers.frames.len(), rows = table.len(), "rendered chart");
    Ok(RenderedChart {
        svg,
        frames: layers.frames,
        plot_area: layers.plot_area,
    })
}
