//! Node wrapper exposing the capability set the query layer works against:
//! path selection, attribute access, child traversal and serialization, with
//! a per-wrapper namespace registry for prefixed documents.

use std::sync::Arc;

use super::document::{NodeId, XmlDocument};
use super::evaluator::{name_matches, EvaluatorFactory, NamespaceMap, PathEvaluator};

/// A borrowed view of one node, bound to a path-evaluator strategy.
///
/// Selections return further wrappers sharing the same evaluator and
/// namespace registrations; all results are snapshots, not live views.
#[derive(Clone)]
pub struct XmlNode<'d> {
    doc: &'d XmlDocument,
    id: NodeId,
    evaluator: Arc<dyn PathEvaluator>,
    namespaces: NamespaceMap,
}

impl<'d> XmlNode<'d> {
    pub fn new(doc: &'d XmlDocument, id: NodeId, evaluator: Arc<dyn PathEvaluator>) -> Self {
        Self {
            doc,
            id,
            evaluator,
            namespaces: NamespaceMap::new(),
        }
    }

    /// Wrap the document root with the process-wide evaluator.
    pub fn for_document(doc: &'d XmlDocument) -> Self {
        EvaluatorFactory::global().wrap(doc, doc.root())
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'d XmlDocument {
        self.doc
    }

    /// Register a namespace prefix for subsequent selections on this wrapper
    /// and any wrapper derived from it. Register the default namespace under
    /// an empty prefix.
    pub fn add_namespace(&mut self, prefix: &str, uri: &str) {
        self.namespaces.insert(prefix.to_string(), uri.to_string());
    }

    pub fn select_single_node(&self, path: &str) -> Option<XmlNode<'d>> {
        self.evaluator
            .select_single_node(self.doc, self.id, path, &self.namespaces)
            .map(|id| self.derive(id))
    }

    pub fn select_nodes(&self, path: &str) -> Vec<XmlNode<'d>> {
        self.evaluator
            .select_nodes(self.doc, self.id, path, &self.namespaces)
            .into_iter()
            .map(|id| self.derive(id))
            .collect()
    }

    pub fn get_attribute(&self, name: &str) -> Option<&'d str> {
        self.doc.attribute(self.id, name)
    }

    /// Immediate children, elements and text alike.
    pub fn child_nodes(&self) -> Vec<XmlNode<'d>> {
        self.doc
            .children(self.id)
            .iter()
            .map(|id| self.derive(*id))
            .collect()
    }

    /// All descendant elements whose name matches `tag`, honoring registered
    /// namespace prefixes (an element `a:foo` matches the tag `foo` when `a`
    /// and the default prefix resolve to the same URI).
    pub fn get_elements_by_tag_name(&self, tag: &str) -> Vec<XmlNode<'d>> {
        self.doc
            .descendant_elements(self.id)
            .into_iter()
            .filter(|id| name_matches(self.doc, *id, tag, &self.namespaces))
            .map(|id| self.derive(id))
            .collect()
    }

    pub fn tag_name(&self) -> Option<&'d str> {
        self.doc.tag_name(self.id)
    }

    pub fn outer_xml(&self) -> String {
        self.doc.outer_xml(self.id)
    }

    pub fn inner_xml(&self) -> String {
        self.doc.inner_xml(self.id)
    }

    pub fn inner_text(&self) -> String {
        self.doc.inner_text(self.id)
    }

    fn derive(&self, id: NodeId) -> XmlNode<'d> {
        XmlNode {
            doc: self.doc,
            id,
            evaluator: Arc::clone(&self.evaluator),
            namespaces: self.namespaces.clone(),
        }
    }
}
