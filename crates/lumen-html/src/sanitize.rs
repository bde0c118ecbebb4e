//! Markup Sanitizer
//!
//! Re-serializes markup without script-bearing content: `script` and
//! `style` elements are dropped, `on*` handler and `srcdoc` attributes
//! stripped, and script URLs replaced with `#`.

use lumen_dom::{DomTree, NodeId};

use crate::entities::decode_entities;
use crate::parser::FragmentParser;
use crate::serializer::serialize;

/// Elements removed together with their content
const BLOCKED_ELEMENTS: &[&str] = &["script", "style"];

/// Attributes holding a URL
const URL_ATTRIBUTES: &[&str] = &[
    "href", "src", "action", "formaction", "xlink:href", "poster", "background", "cite", "data",
    "lowsrc", "dynsrc",
];

/// Schemes that execute in the page
const UNSAFE_SCHEMES: &[&str] = &[
    "javascript:",
    "vbscript:",
    "data:text/html",
    "data:image/svg+xml",
];

/// Attributes carrying an embedded document
const EMBEDDED_MARKUP_ATTRIBUTES: &[&str] = &["srcdoc"];

/// Replacement for neutralized URLs
const SAFE_URL: &str = "#";

/// Counts of what sanitizing removed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeReport {
    pub elements_removed: usize,
    pub attributes_removed: usize,
    pub urls_neutralized: usize,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Sanitize markup, returning safe markup
pub fn sanitize(markup: &str) -> String {
    sanitize_with_report(markup).0
}

/// Sanitize markup and report what was removed
pub fn sanitize_with_report(markup: &str) -> (String, SanitizeReport) {
    let mut tree = DomTree::new();
    let mut report = SanitizeReport::default();
    let roots: Vec<NodeId> = FragmentParser::new()
        .parse_into(&mut tree, markup)
        .into_iter()
        .filter(|&root| {
            let blocked = is_blocked(&tree, root);
            report.elements_removed += usize::from(blocked);
            !blocked
        })
        .collect();

    let mut pending = roots.clone();
    while let Some(node) = pending.pop() {
        scrub_attributes(&mut tree, node, &mut report);
        for child in tree.children(node).to_vec() {
            if is_blocked(&tree, child) {
                tree.detach(child);
                report.elements_removed += 1;
            } else {
                pending.push(child);
            }
        }
    }

    if !report.is_clean() {
        tracing::debug!(
            elements = report.elements_removed,
            attributes = report.attributes_removed,
            urls = report.urls_neutralized,
            "Sanitized markup"
        );
    }
    (serialize(&tree, &roots), report)
}

fn is_blocked(tree: &DomTree, node: NodeId) -> bool {
    tree.tag_name(node)
        .is_some_and(|tag| BLOCKED_ELEMENTS.contains(&tag))
}

fn scrub_attributes(tree: &mut DomTree, node: NodeId, report: &mut SanitizeReport) {
    let Some(elem) = tree.element_mut(node) else {
        return;
    };

    let handlers: Vec<String> = elem
        .attrs()
        .names()
        .into_iter()
        .filter(|name| name.starts_with("on") || EMBEDDED_MARKUP_ATTRIBUTES.contains(name))
        .map(str::to_string)
        .collect();
    for name in handlers {
        elem.remove_attr(&name);
        report.attributes_removed += 1;
    }

    for name in URL_ATTRIBUTES {
        if elem.get_attr(name).is_some_and(is_unsafe_url) {
            elem.set_attr(name, SAFE_URL);
            report.urls_neutralized += 1;
        }
    }
}

/// Scheme check on the decoded value with whitespace and control
/// characters removed, so `jav&#x09;ascript:` is caught
pub fn is_unsafe_url(value: &str) -> bool {
    let compact: String = decode_entities(value)
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    UNSAFE_SCHEMES.iter().any(|scheme| compact.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_script_and_style() {
        assert_eq!(
            sanitize("<p>a</p><script>alert(1)</script><div><style>p{}</style>b</div>"),
            "<p>a</p><div>b</div>"
        );
    }

    #[test]
    fn test_strips_event_handlers() {
        assert_eq!(
            sanitize(r#"<img src="x.png" onerror="alert(1)" ONLOAD=go alt=pic>"#),
            r#"<img src="x.png" alt="pic">"#
        );
    }

    #[test]
    fn test_neutralizes_script_urls() {
        let (out, report) = sanitize_with_report(
            r#"<a href="javascript:alert(1)">x</a><a href=" JaVa&#x09;Script:go">y</a><a href="/ok">z</a>"#,
        );
        assert_eq!(out, r##"<a href="#">x</a><a href="#">y</a><a href="/ok">z</a>"##);
        assert_eq!(report.urls_neutralized, 2);
    }

    #[test]
    fn test_data_html_urls() {
        assert!(is_unsafe_url("data:text/html;base64,AAAA"));
        assert!(is_unsafe_url("vbscript:msgbox"));
        assert!(!is_unsafe_url("data:image/png;base64,AAAA"));
        assert!(!is_unsafe_url("https://example.com/javascript:"));
    }

    #[test]
    fn test_strips_embedded_documents() {
        let (out, report) = sanitize_with_report(
            r#"<iframe srcdoc="<script>alert(1)</script>" SRCDOC=x title=t></iframe>"#,
        );
        assert_eq!(out, r#"<iframe title="t"></iframe>"#);
        assert_eq!(report.attributes_removed, 1);
    }

    #[test]
    fn test_svg_data_urls() {
        assert!(is_unsafe_url("data:image/svg+xml;base64,PHN2Zz4="));
        assert!(is_unsafe_url(" DATA:Image/SVG+XML,<svg onload=x>"));
        assert_eq!(
            sanitize("<img src=\"data:image/svg+xml,<svg></svg>\">"),
            "<img src=\"#\">"
        );
    }

    #[test]
    fn test_clean_markup_unchanged() {
        let (out, report) = sanitize_with_report("<p class=\"x\">hello <b>world</b></p>");
        assert_eq!(out, "<p class=\"x\">hello <b>world</b></p>");
        assert!(report.is_clean());
    }
}
