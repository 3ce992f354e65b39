//! Fetch-expression error types.

use thiserror::Error;

use crate::error::ChartError;
use crate::xml::XmlError;

/// Result type for fetch-expression operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while parsing or mutating fetch-expression documents.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The fetch XML itself is not well formed.
    #[error("malformed fetch xml: {0}")]
    Xml(#[from] XmlError),

    /// Well-formed XML that is not a fetch document.
    #[error("invalid fetch document: {0}")]
    Structure(String),

    /// A `link-entity` carries a join type outside natural/inner/outer.
    #[error("invalid link-entity join type: {0}")]
    InvalidJoinType(String),

    /// A required attribute is missing from an element.
    #[error("element <{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// The service returned an `<Error>` payload instead of a query document.
    #[error("server error payload: {0}")]
    Server(ChartError),
}

impl From<QueryError> for ChartError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Server(chart) => chart,
            other => ChartError::malformed_document(other.to_string()),
        }
    }
}
