//! Recursive-descent tree walker.
//!
//! The fallback strategy: no compilation, no cache. Each call splits the
//! expression on `/` and interprets the segments directly against the tree,
//! re-parsing predicate text as it goes. Single-node selection stops at the
//! first hit instead of materializing the full result set.
//!
//! The accepted grammar is exactly the one documented in [`super::path`];
//! expressions outside it yield an empty result, never an error.

use std::collections::HashSet;

use super::document::{NodeId, XmlDocument};
use super::evaluator::{name_matches, EvaluatorKind, NamespaceMap, PathEvaluator};

/// Per-call interpreting evaluator.
pub struct TreeWalkEvaluator;

impl TreeWalkEvaluator {
    pub fn new() -> Self {
        Self
    }

    fn walk(
        &self,
        doc: &XmlDocument,
        context: NodeId,
        path: &str,
        namespaces: &NamespaceMap,
        first_only: bool,
    ) -> Vec<NodeId> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        // Anchor prefix: where do we start, and how does the first segment bind?
        let (start, rest, mut descendant, mut self_match) =
            if let Some(rest) = trimmed.strip_prefix(".//") {
                (context, rest, true, false)
            } else if let Some(rest) = trimmed.strip_prefix("//") {
                (doc.root(), rest, true, true)
            } else if let Some(rest) = trimmed.strip_prefix("./") {
                (context, rest, false, false)
            } else if let Some(rest) = trimmed.strip_prefix('/') {
                (doc.root(), rest, false, true)
            } else {
                (context, trimmed, false, false)
            };

        let segments: Vec<&str> = rest.split('/').collect();
        let mut frontier = vec![start];
        let mut stepped = false;

        for (i, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                descendant = true;
                continue;
            }
            if *segment == "." {
                descendant = false;
                self_match = false;
                stepped = true;
                continue;
            }
            stepped = true;
            let last = i == segments.len() - 1;
            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for &node in &frontier {
                if self_match && !descendant {
                    // Absolute `/name`: test the root element itself.
                    if self.segment_matches(doc, node, segment, namespaces)
                        && seen.insert(node)
                    {
                        next.push(node);
                        if first_only && last {
                            return next;
                        }
                    }
                    continue;
                }
                if descendant && self_match {
                    // Leading `//name` counts the start node as a candidate.
                    if self.segment_matches(doc, node, segment, namespaces)
                        && seen.insert(node)
                    {
                        next.push(node);
                        if first_only && last {
                            return next;
                        }
                    }
                }
                let candidates = if descendant {
                    doc.descendant_elements(node)
                } else {
                    doc.child_elements(node)
                };
                for candidate in candidates {
                    if self.segment_matches(doc, candidate, segment, namespaces)
                        && seen.insert(candidate)
                    {
                        next.push(candidate);
                        if first_only && last {
                            return next;
                        }
                    }
                }
            }
            frontier = next;
            if frontier.is_empty() {
                return frontier;
            }
            descendant = false;
            self_match = false;
        }

        // Anchor-only paths like "/" or ".//" never selected anything.
        if !stepped {
            return Vec::new();
        }
        frontier
    }

    /// Interpret one `name[predicate]` segment against a node.
    fn segment_matches(
        &self,
        doc: &XmlDocument,
        id: NodeId,
        segment: &str,
        namespaces: &NamespaceMap,
    ) -> bool {
        let (name, predicate) = match segment.find('[') {
            Some(open) => {
                if !segment.ends_with(']') {
                    return false;
                }
                (&segment[..open], Some(&segment[open + 1..segment.len() - 1]))
            }
            None => (segment, None),
        };
        if name.is_empty() || !plain_name(name) {
            return false;
        }
        if name != "*" && !name_matches(doc, id, name, namespaces) {
            return false;
        }
        if name == "*" && !doc.is_element(id) {
            return false;
        }
        match predicate {
            None => true,
            Some(pred) => self.predicate_matches(doc, id, pred, namespaces),
        }
    }

    fn predicate_matches(
        &self,
        doc: &XmlDocument,
        id: NodeId,
        pred: &str,
        namespaces: &NamespaceMap,
    ) -> bool {
        if let Some(attr_expr) = pred.strip_prefix('@') {
            return match attr_expr.split_once('=') {
                Some((attr, value)) => match strip_quotes(value) {
                    Some(expected) => {
                        plain_name(attr) && doc.attribute(id, attr) == Some(expected)
                    }
                    None => false,
                },
                None => plain_name(attr_expr) && doc.attribute(id, attr_expr).is_some(),
            };
        }
        match pred.split_once('=') {
            Some((child, value)) => match strip_quotes(value) {
                Some(expected) => {
                    plain_name(child)
                        && doc.child_elements(id).into_iter().any(|c| {
                            name_matches(doc, c, child, namespaces)
                                && doc.inner_text(c) == expected
                        })
                }
                None => false,
            },
            None => {
                plain_name(pred)
                    && doc
                        .child_elements(id)
                        .into_iter()
                        .any(|c| name_matches(doc, c, pred, namespaces))
            }
        }
    }
}

impl Default for TreeWalkEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl PathEvaluator for TreeWalkEvaluator {
    fn select_nodes(
        &self,
        doc: &XmlDocument,
        context: NodeId,
        path: &str,
        namespaces: &NamespaceMap,
    ) -> Vec<NodeId> {
        self.walk(doc, context, path, namespaces, false)
    }

    fn select_single_node(
        &self,
        doc: &XmlDocument,
        context: NodeId,
        path: &str,
        namespaces: &NamespaceMap,
    ) -> Option<NodeId> {
        self.walk(doc, context, path, namespaces, true)
            .first()
            .copied()
    }

    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::TreeWalk
    }
}

fn plain_name(name: &str) -> bool {
    if name == "*" {
        return true;
    }
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ':' || c == '.')
        && !name.contains("::")
}

fn strip_quotes(value: &str) -> Option<&str> {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'\'' || first == b'"') && bytes[bytes.len() - 1] == first {
            return Some(&value[1..value.len() - 1]);
        }
    }
    None
}
