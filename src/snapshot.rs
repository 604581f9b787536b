use itertools::Itertools;
use ndarray::Array1;
use plotters::style::RGBColor;

use crate::error::{GapminderError, Result};
use crate::models::{ColumnKey, Metric};
use crate::reshape::WideTable;

/// Brewer "Spectral" scheme, six classes.
pub const SPECTRAL6: [RGBColor; 6] = [
    RGBColor(0x32, 0x88, 0xbd),
    RGBColor(0x99, 0xd5, 0x94),
    RGBColor(0xe6, 0xf5, 0x98),
    RGBColor(0xfe, 0xe0, 0x8b),
    RGBColor(0xfc, 0x8d, 0x59),
    RGBColor(0xd5, 0x3e, 0x4f),
];

/// `#rrggbb` form for the page.
pub fn css_hex(color: RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

/// Stable mapping from group labels to palette slots, in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPalette {
    groups: Vec<String>,
}

impl GroupPalette {
    pub fn from_labels<'a, I>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let groups: Vec<String> = labels.into_iter().unique().map(str::to_string).collect();
        if groups.len() > SPECTRAL6.len() {
            return Err(GapminderError::PaletteExhausted {
                groups: groups.len(),
                slots: SPECTRAL6.len(),
            });
        }
        Ok(GroupPalette { groups })
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn code(&self, label: &str) -> Option<usize> {
        self.groups.iter().position(|g| g == label)
    }

    pub fn color(&self, label: &str) -> Option<RGBColor> {
        self.code(label).map(|code| SPECTRAL6[code])
    }

    /// One colour per row; a label the palette has never seen is an error.
    pub fn row_colors(&self, labels: &[String]) -> Result<Vec<String>> {
        labels
            .iter()
            .map(|label| {
                self.color(label)
                    .map(css_hex)
                    .ok_or_else(|| GapminderError::UnknownGroup(label.clone()))
            })
            .collect()
    }
}

/// The x/y/size/pop columns shown for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub year: u16,
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub size: Array1<f64>,
    pub pop: Array1<f64>,
}

fn column_or_missing(table: &WideTable, metric: Metric, year: u16) -> Array1<f64> {
    table
        .column(ColumnKey::new(metric, year))
        .cloned()
        .unwrap_or_else(|| Array1::from_elem(table.len(), f64::NAN))
}

pub fn select_snapshot(table: &WideTable, year: u16) -> Snapshot {
    Snapshot {
        year,
        x: column_or_missing(table, Metric::Gdp, year),
        y: column_or_missing(table, Metric::Lex, year),
        size: column_or_missing(table, Metric::Size, year),
        pop: column_or_missing(table, Metric::Pop, year),
    }
}

/// The year shown on first load must have every column.
pub fn require_year(table: &WideTable, year: u16) -> Result<()> {
    for metric in [Metric::Gdp, Metric::Lex, Metric::Pop, Metric::Size] {
        let key = ColumnKey::new(metric, year);
        if table.column(key).is_none() {
            return Err(GapminderError::MissingColumn(key));
        }
    }
    Ok(())
}
