//! Fetch-expression query model: parse, mutate, re-serialize.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  fetch-XML document                      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [FetchQuery::parse]
//! ┌─────────────────────────────────────────────────────────┐
//! │   FetchQuery ── EntityQuery ── LinkedEntityQuery…        │
//! │   (object graph + retained XmlDocument, kept in step)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [insert_* mutators]  ▼ [fetch_xml()]
//!                   mutated graph + DOM      re-serialized XML
//! ```
//!
//! [`merge_fetch_xml_filter_xml`] and its per-entity variant splice view
//! filters into fetch documents at the XML-tree level without going through
//! the model.

mod attribute;
mod columns;
mod entity;
mod error;
mod filter;
mod grouping;
mod merge;

pub use attribute::{AttributeExpr, AttributeSpec, OrderByExpr};
pub use columns::ColumnSet;
pub use entity::{EntityQuery, FetchQuery, JoinType, LinkedEntityQuery};
pub use error::{QueryError, QueryResult};
pub use filter::{Condition, ConditionValue, FilterBody, FilterExpression, FilterOperator};
pub use grouping::DateGrouping;
pub use merge::{merge_fetch_xml_filter_expression_xml, merge_fetch_xml_filter_xml};
