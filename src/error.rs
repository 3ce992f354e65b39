//! Crate-level display error.

use thiserror::Error;

/// Result type for chart-building operations.
pub type ChartResult<T> = Result<T, ChartError>;

/// A user-presentable failure: a title plus a description, both plain
/// strings so a hosting layer can localize or display them directly. The
/// top-level chart orchestration converts these into an error display state;
/// everything else propagates them synchronously.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{title}: {message}")]
pub struct ChartError {
    pub title: String,
    pub message: String,
}

impl ChartError {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// The query service answered with an error payload instead of a query
    /// document.
    pub fn malformed_document(detail: impl Into<String>) -> Self {
        Self::new("Invalid chart query", detail)
    }

    /// A chart or series type string this renderer does not support.
    pub fn unsupported_chart_type(chart_type: &str) -> Self {
        Self::new(
            "Unsupported chart type",
            format!("the chart type '{chart_type}' is not supported"),
        )
    }

    /// A definition that cannot produce a chart (no category, no measure,
    /// conflicting aggregators).
    pub fn invalid_definition(detail: impl Into<String>) -> Self {
        Self::new("Invalid chart definition", detail)
    }
}
