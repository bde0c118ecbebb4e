//! HTML Serialization (innerHTML/outerHTML)
//!
//! Key features:
//! - Text and attribute escaping
//! - Void elements without end tags
//! - Verbatim content for script-like raw-text elements
//! - Inline style recomposed from the style store when no raw
//!   `style` attribute exists

use lumen_dom::{DomTree, NodeData, NodeId};

use crate::parser::is_void;

/// Elements whose text children are written without escaping
const UNESCAPED_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

/// HTML serializer
#[derive(Debug, Default)]
pub struct HtmlSerializer;

impl HtmlSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize innerHTML of a node (children only)
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(tree, node_id, &mut output);
        output
    }

    /// Serialize outerHTML of a node (including the node itself)
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output);
        output
    }

    /// Concatenated outerHTML of a node sequence
    pub fn serialize_nodes(&self, tree: &DomTree, nodes: &[NodeId]) -> String {
        let mut output = String::new();
        for &node in nodes {
            self.serialize_node(tree, node, &mut output);
        }
        output
    }

    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => self.serialize_children(tree, node_id, output),
            NodeData::Element(elem) => {
                let tag = elem.tag_name();

                output.push('<');
                output.push_str(tag);
                for attr in elem.attrs().iter() {
                    output.push(' ');
                    output.push_str(&attr.name);
                    if !attr.value.is_empty() {
                        output.push_str("=\"");
                        escape_attribute(&attr.value, output);
                        output.push('"');
                    }
                }
                // Style set only through the style store
                if !elem.attrs().contains("style") && !elem.style().is_empty() {
                    output.push_str(" style=\"");
                    escape_attribute(&elem.style().css_text(), output);
                    output.push('"');
                }
                output.push('>');

                if is_void(tag) {
                    return;
                }
                if UNESCAPED_TEXT_ELEMENTS.contains(&tag) {
                    for &child in tree.children(node_id) {
                        if let Some(text) = tree.get(child).and_then(|n| n.as_text()) {
                            output.push_str(text);
                        }
                    }
                } else {
                    self.serialize_children(tree, node_id, output);
                }
                output.push_str("</");
                output.push_str(tag);
                output.push('>');
            }
            NodeData::Text(text) => escape_text(&text.content, output),
        }
    }

    fn serialize_children(&self, tree: &DomTree, node_id: NodeId, output: &mut String) {
        for &child in tree.children(node_id) {
            self.serialize_node(tree, child, output);
        }
    }
}

/// Serialize nodes back to markup
pub fn serialize(tree: &DomTree, nodes: &[NodeId]) -> String {
    HtmlSerializer::new().serialize_nodes(tree, nodes)
}

/// Markup of the node's children
pub fn inner_html(tree: &DomTree, node: NodeId) -> String {
    HtmlSerializer::new().serialize_inner(tree, node)
}

/// Markup of the node itself
pub fn outer_html(tree: &DomTree, node: NodeId) -> String {
    HtmlSerializer::new().serialize_outer(tree, node)
}

/// Escape text content
pub fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
pub fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}
