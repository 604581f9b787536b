use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

use crate::models::{ColumnKey, Metric};

#[derive(Debug, Error)]
pub enum GapminderError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{0} has no header row")]
    MissingHeader(PathBuf),

    #[error("column {0} is not present in the joined table")]
    MissingColumn(ColumnKey),

    #[error("no {0} values to derive an axis range from")]
    EmptyMetric(Metric),

    #[error("{groups} distinct groups exceed the {slots}-colour palette")]
    PaletteExhausted { groups: usize, slots: usize },

    #[error("group '{0}' has no palette slot")]
    UnknownGroup(String),

    #[error("axis range starting at {0} cannot be log-scaled")]
    InvalidLogRange(f64),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("chart drawing failed: {0}")]
    Draw(String),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for GapminderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        GapminderError::Draw(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GapminderError>;
