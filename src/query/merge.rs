//! Fetch/view filter splicing.
//!
//! Merges a filter-expression XML fragment into an already valid fetch-XML
//! document by node-by-node copy, not by rebuilding the query model. Only
//! allow-listed `<fetch>`/`<entity>`/`<link-entity>` attributes are carried
//! over; unknown child node types pass through opaquely so round-tripped
//! documents stay structurally identical to their source.

use crate::xml::{NodeId, XmlDocument};

use super::error::{QueryError, QueryResult};

/// `<fetch>` attributes preserved across a merge.
const FETCH_ATTRS: [&str; 12] = [
    "version",
    "count",
    "page",
    "paging-cookie",
    "utc-offset",
    "aggregate",
    "distinct",
    "top",
    "mapping",
    "min-active-row-version",
    "output-format",
    "returntotalrecordcount",
];

/// `<entity>` attributes preserved across a merge.
const ENTITY_ATTRS: [&str; 1] = ["name"];

/// `<link-entity>` attributes preserved by the per-entity merge variant.
const LINK_ENTITY_ATTRS: [&str; 5] = ["name", "from", "to", "visible", "link-type"];

/// Splice a filter fragment into a fetch document, passing `<link-entity>`
/// subtrees through verbatim.
pub fn merge_fetch_xml_filter_xml(fetch_xml: &str, filter_xml: &str) -> QueryResult<String> {
    merge(fetch_xml, filter_xml, false)
}

/// Per-entity merge variant: additionally rebuilds `<link-entity>` subtrees
/// from their allow-listed attributes, auto-aliasing any linked entity that
/// carries its own filter as `"{name}__alias"`.
pub fn merge_fetch_xml_filter_expression_xml(
    fetch_xml: &str,
    filter_xml: &str,
) -> QueryResult<String> {
    merge(fetch_xml, filter_xml, true)
}

fn merge(fetch_xml: &str, filter_xml: &str, rebuild_links: bool) -> QueryResult<String> {
    // An empty fragment merges to the original document, byte for byte.
    if filter_xml.trim().is_empty() {
        return Ok(fetch_xml.to_string());
    }

    let src = XmlDocument::parse(fetch_xml)?;
    let src_fetch = src.root();
    if src.tag_name(src_fetch) != Some("fetch") {
        return Err(QueryError::Structure("document root is not <fetch>".into()));
    }
    let src_entity = src
        .child_elements(src_fetch)
        .into_iter()
        .find(|c| src.tag_name(*c) == Some("entity"))
        .ok_or_else(|| QueryError::Structure("missing <entity> under <fetch>".into()))?;

    let frag = XmlDocument::parse(filter_xml)?;

    let mut out = XmlDocument::new("fetch");
    let out_fetch = out.root();
    copy_allowed_attributes(&mut out, out_fetch, &src, src_fetch, &FETCH_ATTRS);

    let out_entity = out.create_element("entity");
    copy_allowed_attributes(&mut out, out_entity, &src, src_entity, &ENTITY_ATTRS);
    out.append_child(out_fetch, out_entity);

    let mut existing_filter: Option<NodeId> = None;
    for child in src.children(src_entity).to_vec() {
        if src.tag_name(child) == Some("filter") && existing_filter.is_none() {
            existing_filter = Some(child);
            continue;
        }
        let copied = if rebuild_links && src.tag_name(child) == Some("link-entity") {
            copy_link_entity(&mut out, &src, child)
        } else {
            out.import(&src, child)
        };
        out.append_child(out_entity, copied);
    }

    let frag_root = frag.root();
    let new_filter = match frag.tag_name(frag_root) {
        Some("filter") => out.import(&frag, frag_root),
        // A bare condition gets its own and-filter.
        Some("condition") => {
            let filter = out.create_element("filter");
            out.set_attribute(filter, "type", "and");
            let condition = out.import(&frag, frag_root);
            out.append_child(filter, condition);
            filter
        }
        _ => {
            return Err(QueryError::Structure(
                "filter fragment root must be <filter> or <condition>".into(),
            ))
        }
    };

    let merged = match existing_filter {
        // Existing + new filter wrap together in an and-envelope.
        Some(old) => {
            let envelope = out.create_element("filter");
            out.set_attribute(envelope, "type", "and");
            let old_copy = out.import(&src, old);
            out.append_child(envelope, old_copy);
            out.append_child(envelope, new_filter);
            envelope
        }
        None => new_filter,
    };
    out.append_child(out_entity, merged);

    Ok(out.to_xml())
}

fn copy_allowed_attributes(
    out: &mut XmlDocument,
    dst: NodeId,
    src: &XmlDocument,
    src_node: NodeId,
    allowed: &[&str],
) {
    for (key, value) in src.attributes(src_node).to_vec() {
        if allowed.contains(&key.as_str()) {
            out.set_attribute(dst, &key, &value);
        }
    }
}

fn copy_link_entity(out: &mut XmlDocument, src: &XmlDocument, src_node: NodeId) -> NodeId {
    let dst = out.create_element("link-entity");
    copy_allowed_attributes(out, dst, src, src_node, &LINK_ENTITY_ATTRS);

    let has_own_filter = src
        .child_elements(src_node)
        .into_iter()
        .any(|c| src.tag_name(c) == Some("filter"));
    if has_own_filter {
        if let Some(name) = src.attribute(src_node, "name") {
            let alias = format!("{name}__alias");
            out.set_attribute(dst, "alias", &alias);
        }
    }

    for child in src.children(src_node).to_vec() {
        let copied = if src.tag_name(child) == Some("link-entity") {
            copy_link_entity(out, src, child)
        } else {
            out.import(src, child)
        };
        out.append_child(dst, copied);
    }
    dst
}
