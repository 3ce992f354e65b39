//! Compile-once path evaluator.
//!
//! Expressions are parsed a single time into a step list and cached; repeated
//! queries with the same expression (the common case: the query layer asks
//! for `fetch/entity`, `filter`, `//Error` over and over) skip the string
//! work entirely.
//!
//! Grammar, shared verbatim with the tree walker:
//!
//! ```text
//! path      := anchor? segment ('/' segment)*
//! anchor    := './/' | '//' | './' | '/'
//! segment   := name predicate? | '.' | ''           ('' flips descendant)
//! name      := '*' | QName
//! predicate := '[@' attr ('=' quoted)? ']'
//!            | '[' child ('=' quoted)? ']'
//! ```
//!
//! Anything outside this grammar fails to compile and yields no matches,
//! never an error. Call sites compose multi-step expressions against exactly
//! these limits, so the grammar must not be extended here without extending
//! the walker identically.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;

use super::document::{NodeId, XmlDocument};
use super::evaluator::{name_matches, EvaluatorKind, NamespaceMap, PathEvaluator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    /// Immediate children of the frontier.
    Child,
    /// All descendants, excluding the frontier nodes themselves.
    Descendant,
    /// Frontier nodes plus all their descendants (leading `//`).
    DescendantOrSelf,
    /// The frontier nodes themselves (absolute `/name`, or a `.` segment).
    SelfNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    HasAttr(String),
    AttrEq(String, String),
    HasChild(String),
    ChildEq(String, String),
}

#[derive(Debug, Clone)]
struct Step {
    axis: Axis,
    test: NameTest,
    predicate: Option<Predicate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// Evaluation starts at the context node.
    Context,
    /// Evaluation starts at the document root.
    Root,
}

#[derive(Debug, Clone)]
struct CompiledPath {
    anchor: Anchor,
    steps: Vec<Step>,
}

/// Path evaluator that compiles expressions into [`CompiledPath`] form and
/// caches them keyed by the raw expression text.
pub struct CompiledPathEvaluator {
    cache: DashMap<String, Option<Arc<CompiledPath>>>,
}

impl CompiledPathEvaluator {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    fn compiled(&self, path: &str) -> Option<Arc<CompiledPath>> {
        if let Some(entry) = self.cache.get(path) {
            return entry.clone();
        }
        let compiled = compile(path).map(Arc::new);
        self.cache.insert(path.to_string(), compiled.clone());
        compiled
    }

    fn evaluate(
        &self,
        doc: &XmlDocument,
        context: NodeId,
        path: &str,
        namespaces: &NamespaceMap,
    ) -> Vec<NodeId> {
        let Some(compiled) = self.compiled(path) else {
            return Vec::new();
        };
        let mut frontier = vec![match compiled.anchor {
            Anchor::Context => context,
            Anchor::Root => doc.root(),
        }];
        for step in &compiled.steps {
            frontier = apply_step(doc, &frontier, step, namespaces);
            if frontier.is_empty() {
                break;
            }
        }
        frontier
    }
}

impl Default for CompiledPathEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl PathEvaluator for CompiledPathEvaluator {
    fn select_nodes(
        &self,
        doc: &XmlDocument,
        context: NodeId,
        path: &str,
        namespaces: &NamespaceMap,
    ) -> Vec<NodeId> {
        self.evaluate(doc, context, path, namespaces)
    }

    fn select_single_node(
        &self,
        doc: &XmlDocument,
        context: NodeId,
        path: &str,
        namespaces: &NamespaceMap,
    ) -> Option<NodeId> {
        self.evaluate(doc, context, path, namespaces).first().copied()
    }

    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Compiled
    }
}

fn apply_step(
    doc: &XmlDocument,
    frontier: &[NodeId],
    step: &Step,
    namespaces: &NamespaceMap,
) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for &node in frontier {
        let candidates: Vec<NodeId> = match step.axis {
            Axis::Child => doc.child_elements(node),
            Axis::Descendant => doc.descendant_elements(node),
            Axis::DescendantOrSelf => {
                let mut all = vec![node];
                all.extend(doc.descendant_elements(node));
                all
            }
            Axis::SelfNode => vec![node],
        };
        for candidate in candidates {
            if !step_matches(doc, candidate, step, namespaces) {
                continue;
            }
            if seen.insert(candidate) {
                out.push(candidate);
            }
        }
    }
    out
}

fn step_matches(
    doc: &XmlDocument,
    id: NodeId,
    step: &Step,
    namespaces: &NamespaceMap,
) -> bool {
    match &step.test {
        NameTest::Any => {
            if !doc.is_element(id) {
                return false;
            }
        }
        NameTest::Name(name) => {
            if !name_matches(doc, id, name, namespaces) {
                return false;
            }
        }
    }
    match &step.predicate {
        None => true,
        Some(Predicate::HasAttr(attr)) => doc.attribute(id, attr).is_some(),
        Some(Predicate::AttrEq(attr, value)) => doc.attribute(id, attr) == Some(value.as_str()),
        Some(Predicate::HasChild(child)) => doc
            .child_elements(id)
            .into_iter()
            .any(|c| name_matches(doc, c, child, namespaces)),
        Some(Predicate::ChildEq(child, value)) => doc
            .child_elements(id)
            .into_iter()
            .any(|c| name_matches(doc, c, child, namespaces) && doc.inner_text(c) == *value),
    }
}

fn compile(path: &str) -> Option<CompiledPath> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Anchor decides where the frontier starts and how the first segment binds.
    let (anchor, rest, first_axis) = if let Some(rest) = trimmed.strip_prefix(".//") {
        (Anchor::Context, rest, Axis::Descendant)
    } else if let Some(rest) = trimmed.strip_prefix("//") {
        (Anchor::Root, rest, Axis::DescendantOrSelf)
    } else if let Some(rest) = trimmed.strip_prefix("./") {
        (Anchor::Context, rest, Axis::Child)
    } else if let Some(rest) = trimmed.strip_prefix('/') {
        // Absolute path: the first segment names the root element itself.
        (Anchor::Root, rest, Axis::SelfNode)
    } else {
        (Anchor::Context, trimmed, Axis::Child)
    };

    let mut steps = Vec::new();
    let mut axis = first_axis;
    for token in rest.split('/') {
        if token.is_empty() {
            // In `a//b` the empty token between the slashes flips the next
            // segment to a descendant search.
            axis = Axis::Descendant;
            continue;
        }
        if token == "." {
            steps.push(Step {
                axis: Axis::SelfNode,
                test: NameTest::Any,
                predicate: None,
            });
            axis = Axis::Child;
            continue;
        }
        let (test, predicate) = parse_segment(token)?;
        steps.push(Step {
            axis,
            test,
            predicate,
        });
        axis = Axis::Child;
    }
    if steps.is_empty() {
        return None;
    }
    Some(CompiledPath { anchor, steps })
}

fn parse_segment(token: &str) -> Option<(NameTest, Option<Predicate>)> {
    let (name, predicate) = match token.find('[') {
        Some(open) => {
            if !token.ends_with(']') {
                return None;
            }
            let inner = &token[open + 1..token.len() - 1];
            (&token[..open], Some(parse_predicate(inner)?))
        }
        None => (token, None),
    };
    if name.is_empty() {
        return None;
    }
    let test = if name == "*" {
        NameTest::Any
    } else if valid_name(name) {
        NameTest::Name(name.to_string())
    } else {
        return None;
    };
    Some((test, predicate))
}

fn parse_predicate(inner: &str) -> Option<Predicate> {
    if let Some(attr_expr) = inner.strip_prefix('@') {
        return match attr_expr.split_once('=') {
            Some((attr, value)) => {
                let attr = valid_name(attr).then(|| attr.to_string())?;
                Some(Predicate::AttrEq(attr, unquote(value)?))
            }
            None => {
                let attr = valid_name(attr_expr).then(|| attr_expr.to_string())?;
                Some(Predicate::HasAttr(attr))
            }
        };
    }
    match inner.split_once('=') {
        Some((child, value)) => {
            let child = valid_name(child).then(|| child.to_string())?;
            Some(Predicate::ChildEq(child, unquote(value)?))
        }
        None => {
            let child = valid_name(inner).then(|| inner.to_string())?;
            Some(Predicate::HasChild(child))
        }
    }
}

/// Plain or prefixed XML name. Positional predicates, axis syntax, functions
/// and the rest of full XPath deliberately fail this check.
fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ':' || c == '.')
        && !name.contains("::")
}

fn unquote(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'\'' || first == b'"') && bytes[bytes.len() - 1] == first {
            return Some(value[1..value.len() - 1].to_string());
        }
    }
    None
}
