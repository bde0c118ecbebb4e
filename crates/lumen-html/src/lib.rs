//! Lumen HTML
//!
//! Markup in and out of the Lumen DOM: a forgiving fragment parser,
//! document construction, serialization and sanitizing.

mod document;
mod entities;
mod parser;
mod sanitize;
mod serializer;

pub use document::{build_document, set_inner_html};
pub use entities::decode_entities;
pub use parser::{FragmentParser, RAW_TEXT_ELEMENTS, VOID_ELEMENTS, is_void};
pub use sanitize::{SanitizeReport, is_unsafe_url, sanitize, sanitize_with_report};
pub use serializer::{
    HtmlSerializer, escape_attribute, escape_text, inner_html, outer_html, serialize,
};

use lumen_dom::{Document, DomTree, NodeId};

/// Parse a fragment into detached nodes of `tree`
pub fn parse_fragment(tree: &mut DomTree, markup: &str) -> Vec<NodeId> {
    FragmentParser::new().parse_into(tree, markup)
}

/// Parse a complete document
pub fn parse(markup: &str) -> Document {
    build_document(markup)
}
