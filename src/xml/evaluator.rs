//! Path-evaluator strategy selection.
//!
//! Two interchangeable engines evaluate the restricted path grammar over an
//! [`XmlDocument`]: a compiled evaluator that parses each expression once and
//! caches the compiled form, and a tree walker that interprets the expression
//! string directly on every call. Which one a process uses is decided once, by
//! a smoke probe, and reused for every wrap thereafter; callers that want a
//! specific engine inject it through [`EvaluatorFactory::with_kind`] instead
//! of relying on the shared choice.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::document::{NodeId, XmlDocument};
use super::node::XmlNode;
use super::path::CompiledPathEvaluator;
use super::walker::TreeWalkEvaluator;

/// Prefix-to-URI map registered on a wrapper via `add_namespace`.
pub type NamespaceMap = HashMap<String, String>;

/// Which engine answers path queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorKind {
    /// Compile-once evaluator with a shared expression cache.
    Compiled,
    /// Per-call recursive-descent tree walker.
    TreeWalk,
}

/// A strategy that evaluates the restricted path grammar.
///
/// Both implementations support exactly the same grammar; anything outside it
/// silently yields no matches. `select_nodes` returns an ordered snapshot,
/// `select_single_node` stops at the first match.
pub trait PathEvaluator: Send + Sync {
    fn select_nodes(
        &self,
        doc: &XmlDocument,
        context: NodeId,
        path: &str,
        namespaces: &NamespaceMap,
    ) -> Vec<NodeId>;

    fn select_single_node(
        &self,
        doc: &XmlDocument,
        context: NodeId,
        path: &str,
        namespaces: &NamespaceMap,
    ) -> Option<NodeId>;

    fn kind(&self) -> EvaluatorKind;
}

static GLOBAL_FACTORY: OnceCell<EvaluatorFactory> = OnceCell::new();

/// Wraps raw document nodes with the selected evaluator strategy.
#[derive(Clone)]
pub struct EvaluatorFactory {
    evaluator: Arc<dyn PathEvaluator>,
}

impl EvaluatorFactory {
    /// The process-wide factory. The first call probes the compiled engine
    /// against a throwaway document and falls back to the tree walker if the
    /// probe does not select exactly the probe root; later calls reuse the
    /// cached choice.
    pub fn global() -> &'static EvaluatorFactory {
        GLOBAL_FACTORY.get_or_init(|| EvaluatorFactory::with_kind(probe_kind()))
    }

    /// Build a factory for an explicitly chosen engine, bypassing the probe.
    pub fn with_kind(kind: EvaluatorKind) -> Self {
        let evaluator: Arc<dyn PathEvaluator> = match kind {
            EvaluatorKind::Compiled => Arc::new(CompiledPathEvaluator::new()),
            EvaluatorKind::TreeWalk => Arc::new(TreeWalkEvaluator::new()),
        };
        Self { evaluator }
    }

    pub fn kind(&self) -> EvaluatorKind {
        self.evaluator.kind()
    }

    pub fn evaluator(&self) -> Arc<dyn PathEvaluator> {
        Arc::clone(&self.evaluator)
    }

    /// Wrap a node of `doc` in an [`XmlNode`] bound to this factory's engine.
    pub fn wrap<'d>(&self, doc: &'d XmlDocument, id: NodeId) -> XmlNode<'d> {
        XmlNode::new(doc, id, self.evaluator())
    }
}

/// Smoke-test the compiled engine: `//root` against `<root/>` must select the
/// root element itself.
fn probe_kind() -> EvaluatorKind {
    let doc = XmlDocument::new("root");
    let compiled = CompiledPathEvaluator::new();
    let hits = compiled.select_nodes(&doc, doc.root(), "//root", &NamespaceMap::new());
    if hits.len() == 1 && hits[0] == doc.root() {
        EvaluatorKind::Compiled
    } else {
        EvaluatorKind::TreeWalk
    }
}

/// Does the element `id` match the (possibly prefixed) name `test`?
///
/// A literal qualified-name match always wins. Otherwise the local names must
/// agree and both prefixes must resolve, through the registered map, to the
/// same namespace URI. `*` matches any element.
pub(crate) fn name_matches(
    doc: &XmlDocument,
    id: NodeId,
    test: &str,
    namespaces: &NamespaceMap,
) -> bool {
    let Some(tag) = doc.tag_name(id) else {
        return false;
    };
    if test == "*" || tag == test {
        return true;
    }
    if namespaces.is_empty() {
        return false;
    }
    let (test_prefix, test_local) = split_qualified(test);
    let (tag_prefix, tag_local) = split_qualified(tag);
    if test_local != tag_local {
        return false;
    }
    match (namespaces.get(test_prefix), namespaces.get(tag_prefix)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn split_qualified(name: &str) -> (&str, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", name),
    }
}
