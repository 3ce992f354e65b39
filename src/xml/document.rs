//! Arena-backed XML document.
//!
//! The query layer keeps a parsed fetch-XML document alive for its whole
//! lifetime and splices nodes in and out of it, so the tree must be cheap to
//! mutate and to re-serialize. Nodes live in a flat arena and reference each
//! other by index; no owning pointers between nodes, no reference cycles.
//!
//! Reading and writing go through `quick_xml`. Whitespace-only text nodes are
//! dropped on parse (indentation is formatting, not data); all other text is
//! unescaped on read and re-escaped on write. Attribute order is preserved.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Result type for XML document operations.
pub type XmlResult<T> = Result<T, XmlError>;

/// Errors raised while reading or writing XML trees.
#[derive(Error, Debug)]
pub enum XmlError {
    /// Underlying XML syntax error.
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute.
    #[error("attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// Text could not be decoded with the document encoding.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// An entity reference could not be expanded.
    #[error("escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// The document has no root element, or more than one.
    #[error("unexpected structure: {0}")]
    Structure(String),

    /// Serialization failed.
    #[error("failed to serialize node: {0}")]
    Serialize(String),
}

/// Index of a node inside its owning [`XmlDocument`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Node payload. Comments and processing instructions are retained verbatim so
/// unknown content survives a parse/serialize round trip.
#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A mutable XML tree with arena-index node references.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl XmlDocument {
    /// Create a document holding a single empty root element.
    pub fn new(root_tag: &str) -> Self {
        let root = NodeData {
            kind: NodeKind::Element {
                tag: root_tag.to_string(),
                attributes: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Parse an XML string into a document.
    pub fn parse(xml: &str) -> XmlResult<Self> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();

        let mut nodes: Vec<NodeData> = Vec::new();
        let mut root: Option<NodeId> = None;
        // Open-element stack; the top is the current parent.
        let mut stack: Vec<NodeId> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let id = push_element(&mut nodes, &e, stack.last().copied())?;
                    attach(&mut nodes, &mut root, &stack, id)?;
                    stack.push(id);
                }
                Event::Empty(e) => {
                    let id = push_element(&mut nodes, &e, stack.last().copied())?;
                    attach(&mut nodes, &mut root, &stack, id)?;
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(t) => {
                    let raw = t.decode()?;
                    if raw.trim().is_empty() || stack.is_empty() {
                        continue;
                    }
                    let text = unescape(&raw)?.into_owned();
                    let id = NodeId(nodes.len());
                    nodes.push(NodeData {
                        kind: NodeKind::Text(text),
                        parent: stack.last().copied(),
                        children: Vec::new(),
                    });
                    attach(&mut nodes, &mut root, &stack, id)?;
                }
                Event::CData(c) => {
                    let text = c.decode()?.into_owned();
                    if text.trim().is_empty() || stack.is_empty() {
                        continue;
                    }
                    let id = NodeId(nodes.len());
                    nodes.push(NodeData {
                        kind: NodeKind::Text(text),
                        parent: stack.last().copied(),
                        children: Vec::new(),
                    });
                    attach(&mut nodes, &mut root, &stack, id)?;
                }
                Event::Comment(c) => {
                    let text = c.decode()?.into_owned();
                    let id = NodeId(nodes.len());
                    nodes.push(NodeData {
                        kind: NodeKind::Comment(text),
                        parent: stack.last().copied(),
                        children: Vec::new(),
                    });
                    // Comments before the root element are dropped.
                    if !stack.is_empty() {
                        attach(&mut nodes, &mut root, &stack, id)?;
                    }
                }
                // The reader splits text at entity references; resolve them
                // back into text nodes so no characters are lost.
                Event::GeneralRef(r) => {
                    if stack.is_empty() {
                        continue;
                    }
                    let name = r.decode()?;
                    let text = resolve_reference(&name).ok_or_else(|| {
                        XmlError::Structure(format!("unresolved entity reference '&{name};'"))
                    })?;
                    let id = NodeId(nodes.len());
                    nodes.push(NodeData {
                        kind: NodeKind::Text(text),
                        parent: stack.last().copied(),
                        children: Vec::new(),
                    });
                    attach(&mut nodes, &mut root, &stack, id)?;
                }
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
            buf.clear();
        }

        let root = root.ok_or_else(|| XmlError::Structure("document has no root element".into()))?;
        Ok(Self { nodes, root })
    }

    /// The document's root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Tag name, or `None` for text/comment nodes.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Element { .. })
    }

    /// Attribute value by name, or `None` when absent or not an element.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// All attributes in document order. Empty for non-elements.
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Set (or replace) an attribute, preserving first-write position.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[id.0].kind {
            match attributes.iter_mut().find(|(k, _)| k == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Text content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Immediate children (elements, text and comments) in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Immediate element children in document order.
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All descendant elements of `id` in document order, excluding `id`.
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[id.0].children {
            if self.is_element(*child) {
                out.push(*child);
                self.collect_descendants(*child, out);
            }
        }
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind: NodeKind::Element {
                tag: tag.to_string(),
                attributes: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, content: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind: NodeKind::Text(content.to_string()),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `new` immediately before `reference` among `parent`'s children.
    /// Appends at the end when `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, new: NodeId, reference: NodeId) {
        self.detach(new);
        self.nodes[new.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        match children.iter().position(|c| *c == reference) {
            Some(pos) => children.insert(pos, new),
            None => children.push(new),
        }
    }

    /// Detach `child` from `parent`. The subtree stays in the arena but is no
    /// longer reachable from the root.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.retain(|c| *c != child);
        if self.nodes[child.0].parent == Some(parent) {
            self.nodes[child.0].parent = None;
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent {
            self.nodes[parent.0].children.retain(|c| *c != id);
            self.nodes[id.0].parent = None;
        }
    }

    /// Deep-copy a subtree from another document into this arena. The copy is
    /// detached; attach it with [`append_child`](Self::append_child).
    pub fn import(&mut self, src: &XmlDocument, src_id: NodeId) -> NodeId {
        let kind = src.nodes[src_id.0].kind.clone();
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        for child in src.children(src_id).to_vec() {
            let copied = self.import(src, child);
            self.append_child(id, copied);
        }
        id
    }

    /// Concatenated text of all descendant text nodes.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(t) => out.push_str(t),
            _ => {
                for child in &self.nodes[id.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Serialize the whole document.
    pub fn to_xml(&self) -> String {
        self.outer_xml(self.root)
    }

    /// Serialize one node including its own tag.
    pub fn outer_xml(&self, id: NodeId) -> String {
        let mut writer = Writer::new(Vec::new());
        // Writes to an in-memory buffer cannot fail.
        if self.write_node(&mut writer, id).is_ok() {
            String::from_utf8_lossy(&writer.into_inner()).into_owned()
        } else {
            String::new()
        }
    }

    /// Serialize a node's children only.
    pub fn inner_xml(&self, id: NodeId) -> String {
        let mut writer = Writer::new(Vec::new());
        for child in self.children(id) {
            if self.write_node(&mut writer, *child).is_err() {
                return String::new();
            }
        }
        String::from_utf8_lossy(&writer.into_inner()).into_owned()
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> XmlResult<()> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, attributes } => {
                let mut start = BytesStart::new(tag.as_str());
                for (k, v) in attributes {
                    start.push_attribute((k.as_str(), v.as_str()));
                }
                let children = &self.nodes[id.0].children;
                if children.is_empty() {
                    writer
                        .write_event(Event::Empty(start))
                        .map_err(|e| XmlError::Serialize(e.to_string()))?;
                } else {
                    writer
                        .write_event(Event::Start(start))
                        .map_err(|e| XmlError::Serialize(e.to_string()))?;
                    for child in children {
                        self.write_node(writer, *child)?;
                    }
                    writer
                        .write_event(Event::End(BytesEnd::new(tag.as_str())))
                        .map_err(|e| XmlError::Serialize(e.to_string()))?;
                }
            }
            NodeKind::Text(t) => {
                writer
                    .write_event(Event::Text(BytesText::new(t)))
                    .map_err(|e| XmlError::Serialize(e.to_string()))?;
            }
            NodeKind::Comment(t) => {
                writer
                    .write_event(Event::Comment(BytesText::new(t)))
                    .map_err(|e| XmlError::Serialize(e.to_string()))?;
            }
        }
        Ok(())
    }
}

fn push_element(
    nodes: &mut Vec<NodeData>,
    e: &BytesStart<'_>,
    parent: Option<NodeId>,
) -> XmlResult<NodeId> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    let id = NodeId(nodes.len());
    nodes.push(NodeData {
        kind: NodeKind::Element { tag, attributes },
        parent,
        children: Vec::new(),
    });
    Ok(id)
}

/// Expand a character reference (`#38`, `#x26`) or predefined entity name.
fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        return char::from_u32(value).map(|c| c.to_string());
    }
    quick_xml::escape::resolve_predefined_entity(name).map(str::to_string)
}

fn attach(
    nodes: &mut [NodeData],
    root: &mut Option<NodeId>,
    stack: &[NodeId],
    id: NodeId,
) -> XmlResult<()> {
    match stack.last() {
        Some(parent) => {
            nodes[parent.0].children.push(id);
            Ok(())
        }
        None => {
            if root.is_some() {
                return Err(XmlError::Structure(
                    "document has more than one root element".into(),
                ));
            }
            *root = Some(id);
            Ok(())
        }
    }
}
