//! XML document model and path-query abstraction.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     XmlNode (wrapper)                    │
//! │  select_single_node / select_nodes / get_attribute /     │
//! │  child_nodes / get_elements_by_tag_name / outer_xml      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [EvaluatorFactory, decided once]
//! ┌───────────────────────────┬─────────────────────────────┐
//! │  CompiledPathEvaluator    │  TreeWalkEvaluator           │
//! │  (compile + cache)        │  (interpret per call)        │
//! └───────────────────────────┴─────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │              XmlDocument (arena, quick-xml I/O)          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Both evaluators implement the same restricted path grammar; the grammar is
//! documented on [`CompiledPathEvaluator`]'s module and must stay identical
//! between the two strategies.

mod document;
mod evaluator;
mod node;
mod path;
mod walker;

pub use document::{NodeId, XmlDocument, XmlError, XmlResult};
pub use evaluator::{EvaluatorFactory, EvaluatorKind, NamespaceMap, PathEvaluator};
pub use node::XmlNode;
pub use path::CompiledPathEvaluator;
pub use walker::TreeWalkEvaluator;
