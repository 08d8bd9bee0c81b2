//! Owned HTML fragment tree.
//!
//! A thin layer over `html5ever` + `markup5ever_rcdom`: parse a post body as a
//! fragment in `<body>` context, query elements, rewrite attributes, and
//! serialize the top-level nodes back out.
//!
//! Parsing follows the HTML5 tree-construction algorithm, so any input
//! produces a tree: unclosed tags are closed, stray end tags dropped, nested
//! anchors split, as a browser would. Parse diagnostics are collected by the
//! sink and discarded with it. Input is always decoded as UTF-8, regardless of
//! any `<meta charset>` inside the fragment.

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    Attribute, LocalName, ParseOpts, QualName, local_name, namespace_url, ns, parse_fragment,
};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use tracing::warn;

/// A parsed HTML fragment that owns its tree.
pub struct Fragment {
    dom: RcDom,
}

impl Fragment {
    /// Parse `content` as the children of a `<body>` element.
    pub fn parse(content: &str) -> Self {
        let context = QualName::new(None, ns!(html), local_name!("body"));
        let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new())
            .from_utf8()
            .one(content.as_bytes());
        Self { dom }
    }

    /// The synthetic root element holding the fragment's top-level nodes.
    ///
    /// The fragment parser wraps everything in a single `<html>` element under
    /// the document node; `None` only if the sink produced no tree at all.
    pub fn root(&self) -> Option<Handle> {
        self.dom
            .document
            .children
            .borrow()
            .iter()
            .find(|child| matches!(child.data, NodeData::Element { .. }))
            .cloned()
    }

    /// All elements with the given HTML local name, in document order.
    pub fn elements(&self, local: &str) -> Vec<Handle> {
        match self.root() {
            Some(root) => descendants(&root)
                .into_iter()
                .filter(|node| is_element(node, local))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of top-level nodes (elements, text, comments) in the fragment.
    pub fn top_level_count(&self) -> usize {
        self.root()
            .map(|root| root.children.borrow().len())
            .unwrap_or(0)
    }

    /// Serialize every top-level node in order and concatenate the results.
    ///
    /// Returns an empty string when the parse produced no root.
    pub fn to_html(&self) -> String {
        let Some(root) = self.root() else {
            return String::new();
        };
        let children = root.children.borrow();
        children.iter().map(serialize_node).collect()
    }
}

/// Serialize one node including its own tag.
fn serialize_node(node: &Handle) -> String {
    let mut buf = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    if let Err(err) = serialize(&mut buf, &SerializableHandle::from(node.clone()), opts) {
        warn!(error = %err, "failed to serialize node, dropping it");
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// All descendants of `node` in pre-order, excluding `node` itself.
pub fn descendants(node: &Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    let mut stack: Vec<Handle> = node.children.borrow().iter().rev().cloned().collect();
    while let Some(next) = stack.pop() {
        stack.extend(next.children.borrow().iter().rev().cloned());
        out.push(next);
    }
    out
}

/// True if `node` is an HTML element named `local` (e.g. `"a"`, `"img"`).
pub fn is_element(node: &Handle, local: &str) -> bool {
    match &node.data {
        NodeData::Element { name, .. } => name.ns == ns!(html) && &*name.local == local,
        _ => false,
    }
}

/// Value of a non-namespaced attribute.
pub fn attr(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| a.name.ns == ns!() && &*a.name.local == name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

pub fn has_attr(node: &Handle, name: &str) -> bool {
    attr(node, name).is_some()
}

/// Set (or replace) a non-namespaced attribute. No-op on non-elements.
pub fn set_attr(node: &Handle, name: &str, value: &str) {
    let NodeData::Element { attrs, .. } = &node.data else {
        return;
    };
    let mut attrs = attrs.borrow_mut();
    match attrs
        .iter_mut()
        .find(|a| a.name.ns == ns!() && &*a.name.local == name)
    {
        Some(existing) => existing.value = StrTendril::from_slice(value),
        None => attrs.push(Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: StrTendril::from_slice(value),
        }),
    }
}

/// Concatenated text of every text node under `node`.
pub fn text_content(node: &Handle) -> String {
    descendants(node)
        .iter()
        .filter_map(|n| match &n.data {
            NodeData::Text { contents } => Some(contents.borrow().to_string()),
            _ => None,
        })
        .collect()
}
