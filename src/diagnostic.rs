//! Terminal, non-exception outcomes of chart preparation.
//!
//! Each variant is shown in place of the chart as a warning panel. They are
//! returned as the `Err` side of [`crate::engine::prepare_chart`], never panicked.

use crate::kind::{ChartKind, FieldRole};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Diagnostic {
    /// No rows were supplied
    #[error("No data available to display the chart")]
    EmptyDataset,

    /// The descriptor references columns the data does not have
    #[error(
        "Chart references column(s) not found in the data: {}. Available columns: {}",
        .missing.join(", "),
        .available.join(", ")
    )]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    /// Columns exist but none of their cells hold a number
    #[error("The chart data could not be processed: no numeric values in {}", .columns.join(", "))]
    UnparseableSeries { columns: Vec<String> },

    /// The descriptor leaves out a field its own kind requires
    #[error("Chart type '{kind}' requires '{field}' but the configuration does not set it")]
    MissingRequiredField { kind: ChartKind, field: FieldRole },

    /// The kind tag is not one of the supported kinds
    #[error("Chart type '{kind}' is not supported")]
    UnsupportedKind { kind: String },
}

/// A diagnostic with the chart title it belongs to, as rendered in the warning panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticReport {
    pub title: String,
    pub message: String,
    pub diagnostic: Diagnostic,
}

impl DiagnosticReport {
    pub fn new(title: impl Into<String>, diagnostic: Diagnostic) -> Self {
        Self {
            title: title.into(),
            message: diagnostic.to_string(),
            diagnostic,
        }
    }
}
