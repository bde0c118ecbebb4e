//! Document Construction
//!
//! Builds a full `Document` from markup and assigns innerHTML.

use lumen_dom::{Document, DomResult, NodeId};

use crate::parser::FragmentParser;

/// Tags that belong in `<head>` when they precede body content
const HEAD_CONTENT: &[&str] = &["title", "meta", "link", "base", "style", "script"];

/// Parse markup into a new document.
///
/// `html`, `head` and `body` wrappers are honored when present (their
/// attributes copied onto the document's own elements). Without them,
/// head content seen before any body content goes to `<head>` and the
/// rest to `<body>`. The document comes back dirty with no pending
/// mutation records.
pub fn build_document(markup: &str) -> Document {
    let mut doc = Document::new();
    let roots = FragmentParser::new().parse_into(doc.tree_mut(), markup);

    let mut placement = Placement {
        body_started: false,
        body_closed: false,
    };
    placement.distribute(&mut doc, roots);

    let title = doc
        .get_elements_by_tag_name("title")
        .first()
        .map(|&title| collapse_whitespace(&doc.text_content(title)))
        .unwrap_or_default();
    doc.set_title(title);
    doc.mark_dirty();

    tracing::debug!(
        bytes = markup.len(),
        nodes = doc.tree().len(),
        title = doc.title(),
        "Built document"
    );
    doc
}

/// Replace the children of `node` with parsed markup, recorded as one
/// child-list mutation
pub fn set_inner_html(doc: &mut Document, node: NodeId, markup: &str) -> DomResult<()> {
    if !doc.tree().get(node).is_some_and(|n| n.can_have_children()) {
        return Err(lumen_dom::DomError::InvalidNodeType(node));
    }
    let nodes = FragmentParser::new().parse_into(doc.tree_mut(), markup);
    doc.replace_children(node, &nodes)
}

struct Placement {
    body_started: bool,
    body_closed: bool,
}

impl Placement {
    fn distribute(&mut self, doc: &mut Document, nodes: Vec<NodeId>) {
        for node in nodes {
            let tag = doc.tag_name(node).map(str::to_string);
            match tag.as_deref() {
                Some("html") => {
                    let html = doc.document_element();
                    copy_attributes(doc, node, html);
                    self.unwrap(doc, node);
                }
                Some("head") => self.unwrap(doc, node),
                Some("body") => {
                    let body = doc.body();
                    copy_attributes(doc, node, body);
                    self.body_started = true;
                    self.unwrap(doc, node);
                    self.body_closed = true;
                }
                Some(tag) if !self.body_started && HEAD_CONTENT.contains(&tag) => {
                    let head = doc.head();
                    Self::move_to(doc, head, node);
                }
                // Whitespace outside body content
                None if (!self.body_started || self.body_closed)
                    && doc.text_content(node).trim().is_empty() => {}
                _ => {
                    self.body_started = true;
                    let body = doc.body();
                    Self::move_to(doc, body, node);
                }
            }
        }
    }

    /// Distribute a wrapper's children and drop the wrapper
    fn unwrap(&mut self, doc: &mut Document, wrapper: NodeId) {
        let children = doc.children(wrapper).to_vec();
        for &child in &children {
            doc.tree_mut().detach(child);
        }
        doc.tree_mut().detach(wrapper);
        self.distribute(doc, children);
    }

    fn move_to(doc: &mut Document, parent: NodeId, node: NodeId) {
        if let Err(err) = doc.tree_mut().append_child(parent, node) {
            tracing::debug!(%node, %err, "Dropped node while building document");
        }
    }
}

/// Copy attributes the target does not already have
fn copy_attributes(doc: &mut Document, from: NodeId, to: NodeId) {
    let attrs: Vec<(String, String)> = doc
        .element(from)
        .map(|elem| {
            elem.attrs()
                .iter()
                .map(|attr| (attr.name.clone(), attr.value.clone()))
                .collect()
        })
        .unwrap_or_default();
    if let Some(target) = doc.tree_mut().element_mut(to) {
        for (name, value) in attrs {
            if !target.attrs().contains(&name) {
                target.set_attr(&name, &value);
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_fragment_goes_to_body() {
        let doc = build_document("<p>hello</p>");
        let body = doc.body();
        assert_eq!(doc.children(body).len(), 1);
        assert_eq!(doc.text_content(body), "hello");
        assert!(doc.children(doc.head()).is_empty());
        assert!(doc.is_dirty());
        assert!(doc.pending_records().is_empty());
    }

    #[test]
    fn test_head_content_before_body() {
        let doc = build_document("<title> My  Page </title><meta charset=utf-8><p>x</p><script>1</script>");
        assert_eq!(doc.title(), "My Page");
        assert_eq!(doc.children(doc.head()).len(), 2);
        // Script after body content stays in body
        assert_eq!(doc.children(doc.body()).len(), 2);
    }

    #[test]
    fn test_wrappers_honored() {
        let doc = build_document(
            "<!DOCTYPE html>\n<html lang=en>\n<head><title>T</title></head>\n<body class=home><div>x</div></body>\n</html>",
        );
        assert_eq!(doc.get_attribute(doc.document_element(), "lang"), Some("en"));
        assert_eq!(doc.get_attribute(doc.body(), "class"), Some("home"));
        assert_eq!(doc.title(), "T");
        assert_eq!(doc.element_children(doc.body()).len(), 1);
        assert_eq!(doc.children(doc.body()).len(), 1);
        assert_eq!(doc.tag_name(doc.children(doc.head())[0]), Some("title"));
    }

    #[test]
    fn test_whitespace_between_inline_siblings_kept() {
        for markup in ["<body><b>hello</b> <i>world</i></body>", "<b>hello</b> <i>world</i>"] {
            let doc = build_document(markup);
            assert_eq!(doc.text_content(doc.body()), "hello world", "{markup:?}");
            assert_eq!(doc.children(doc.body()).len(), 3, "{markup:?}");
        }
    }

    #[test]
    fn test_whitespace_outside_body_dropped() {
        let doc = build_document("\n<html>\n<head>\n<title>T</title>\n</head>\n<body>\n<p>x</p>\n</body>\n</html>\n");
        assert_eq!(doc.children(doc.head()), doc.element_children(doc.head()).as_slice());
        assert_eq!(doc.text_content(doc.body()), "\nx\n");
    }

    #[test]
    fn test_body_inside_unclosed_head() {
        let doc = build_document("<html><head><meta name=a><body><p>x</p>");
        assert_eq!(doc.children(doc.head()).len(), 1);
        assert_eq!(doc.text_content(doc.body()), "x");
    }

    #[test]
    fn test_set_inner_html_records_once() {
        let mut doc = build_document("<div id=box><i>old</i></div>");
        let div = doc.get_element_by_id("box").unwrap();
        set_inner_html(&mut doc, div, "<b>new</b> text").unwrap();

        assert_eq!(doc.text_content(div), "new text");
        let records = doc.take_records();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_child_list());
    }

    #[test]
    fn test_set_inner_html_on_text_rejected() {
        let mut doc = Document::new();
        let text = doc.create_text_node("x");
        assert!(set_inner_html(&mut doc, text, "<b>").is_err());
    }
}
