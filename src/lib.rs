//! # fetchchart
//!
//! A chart query layer over the fetch-XML dialect: parse a query description
//! into a typed model, mutate it programmatically, re-serialize it
//! byte-compatibly, and map retrieved rows into chart series.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        fetch XML + presentation XML (wire dialects)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [xml: arena DOM + path evaluators]
//! ┌─────────────────────────────────────────────────────────┐
//! │     XmlDocument / XmlNode / EvaluatorFactory             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [query: parse ⇄ mutate ⇄ serialize]
//! ┌─────────────────────────────────────────────────────────┐
//! │   FetchQuery (EntityQuery, FilterExpression, orders…)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [chart + metadata]
//! ┌─────────────────────────────────────────────────────────┐
//! │  ChartDataDefinition → ChartData (categories + series)   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering the final chart-library configuration and localizing error
//! strings are the hosting client's concerns; this crate stops at
//! [`chart::ChartData`].

pub mod chart;
pub mod error;
pub mod metadata;
pub mod query;
pub mod xml;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::chart::{
        parser_for, ChartData, ChartDataDefinition, ChartDataParser, ChartKind,
        ChartPresentation, DataRow, SeriesData,
    };
    pub use crate::error::{ChartError, ChartResult};
    pub use crate::metadata::{
        AttributeKind, AttributeMetadata, ChartMetadata, EntityMetadata, MetadataSource,
    };
    pub use crate::query::{
        merge_fetch_xml_filter_expression_xml, merge_fetch_xml_filter_xml, AttributeSpec,
        ColumnSet, Condition, ConditionValue, DateGrouping, EntityQuery, FetchQuery, FilterBody,
        FilterExpression, FilterOperator, JoinType, OrderByExpr,
    };
    pub use crate::xml::{EvaluatorFactory, EvaluatorKind, XmlDocument, XmlNode};
}

// Also export the workhorse types at crate root for convenience.
pub use error::{ChartError, ChartResult};
pub use query::{DateGrouping, FetchQuery, FilterExpression};
pub use xml::{EvaluatorFactory, XmlDocument, XmlNode};
