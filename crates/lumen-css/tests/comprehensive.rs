//! Comprehensive tests for lumen-css
//!
//! Selector matching and queries over documents built through lumen-dom.

use lumen_css::{ElementQuery, SelectorList, closest, matches, query_all};
use lumen_dom::{Document, NodeId};

fn element(doc: &mut Document, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let node = doc.create_element(tag);
    for (name, value) in attrs {
        doc.set_attribute(node, name, value).unwrap();
    }
    doc.append_child(parent, node).unwrap();
    node
}

/// body
///   div#main.content
///     p.lead
///     section
///       p
///     p[data-kind=note]
///   p.footer
fn sample() -> (Document, Vec<NodeId>) {
    let mut doc = Document::new();
    let body = doc.body();
    let div = element(&mut doc, body, "div", &[("id", "main"), ("class", "content")]);
    let lead = element(&mut doc, div, "p", &[("class", "lead")]);
    let section = element(&mut doc, div, "section", &[]);
    let nested = element(&mut doc, section, "p", &[]);
    let note = element(&mut doc, div, "p", &[("data-kind", "note")]);
    let footer = element(&mut doc, body, "p", &[("class", "footer")]);
    (doc, vec![div, lead, section, nested, note, footer])
}

// ============================================================================
// COMBINATORS
// ============================================================================

#[test]
fn test_child_combinator_query() {
    let (doc, n) = sample();
    let found = query_all(doc.tree(), doc.root(), "div > p");
    assert_eq!(found, vec![n[1], n[4]]);
}

#[test]
fn test_descendant_combinator_query() {
    let (doc, n) = sample();
    let found = doc.query_selector_all(doc.root(), "div p");
    assert_eq!(found, vec![n[1], n[3], n[4]]);
}

#[test]
fn test_comma_group_no_duplicates() {
    let (doc, n) = sample();
    // The lead paragraph matches all three branches
    let found = doc.query_selector_all(doc.root(), "div > p, .lead, p:first-child");
    assert_eq!(found, vec![n[1], n[3], n[4]]);
}

#[test]
fn test_sibling_combinators() {
    let (doc, n) = sample();
    assert!(doc.matches(n[2], "p.lead + section"));
    assert!(!doc.matches(n[4], "p.lead + p"));
    assert!(doc.matches(n[4], "p.lead ~ p"));
    assert!(doc.matches(n[5], "div#main ~ p.footer"));
    assert!(!doc.matches(n[1], "section ~ p"));
}

#[test]
fn test_mixed_chain() {
    let (doc, n) = sample();
    assert!(doc.matches(n[3], "body > div.content section > p"));
    assert!(!doc.matches(n[3], "body > section p"));
    assert!(doc.matches(n[3], "html body div p"));
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

#[test]
fn test_attribute_operators() {
    let mut doc = Document::new();
    let body = doc.body();
    let a = element(
        &mut doc,
        body,
        "a",
        &[("href", "https://example.com/docs.pdf"), ("lang", "en-GB"), ("rel", "noopener external")],
    );

    for selector in [
        "[href]",
        "[href^='https://']",
        "[href$=\".pdf\"]",
        "[href*=example]",
        "[rel~=external]",
        "[lang|=en]",
        "[LANG|=EN i]",
        "a[href][rel]",
    ] {
        assert!(doc.matches(a, selector), "expected match for {selector}");
    }
    for selector in ["[title]", "[rel~=extern]", "[lang|=EN]", "[lang=en-gb s]"] {
        assert!(!doc.matches(a, selector), "unexpected match for {selector}");
    }
}

#[test]
fn test_type_selector_case_insensitive() {
    let (doc, n) = sample();
    assert!(doc.matches(n[0], "DIV#main"));
    assert!(!doc.matches(n[0], "div#MAIN"));
    assert!(!doc.matches(n[0], ".Content"));
}

// ============================================================================
// PSEUDO-CLASSES
// ============================================================================

#[test]
fn test_nth_child_odd_on_list() {
    let mut doc = Document::new();
    let body = doc.body();
    let ul = element(&mut doc, body, "ul", &[]);
    let items: Vec<NodeId> = (0..3).map(|_| element(&mut doc, ul, "li", &[])).collect();

    assert!(doc.matches(items[1], ":nth-child(2)"));
    assert!(!doc.matches(items[0], ":nth-child(2)"));
    assert!(!doc.matches(items[2], ":nth-child(2)"));
    assert_eq!(doc.query_selector_all(ul, ":nth-child(odd)"), vec![items[0], items[2]]);
    assert_eq!(doc.query_selector_all(ul, "li:nth-child(-n+2)"), vec![items[0], items[1]]);
    assert_eq!(doc.query_selector_all(ul, ":nth-child(3n)"), vec![items[2]]);
}

#[test]
fn test_of_type_variants() {
    let (doc, n) = sample();
    // Inside div: p.lead, section, p[data-kind]
    assert!(doc.matches(n[1], "p:first-of-type"));
    assert!(doc.matches(n[4], "p:last-of-type"));
    assert!(doc.matches(n[2], "section:only-of-type"));
    assert!(doc.matches(n[4], "p:nth-of-type(2)"));
    assert!(doc.matches(n[1], "p:nth-last-of-type(2)"));
    assert!(!doc.matches(n[4], ":last-child:first-child"));
}

#[test]
fn test_logical_pseudo_classes() {
    let (doc, n) = sample();
    assert_eq!(
        doc.query_selector_all(doc.root(), "p:not(.lead, .footer)"),
        vec![n[3], n[4]]
    );
    assert_eq!(doc.query_selector_all(doc.root(), ":is(section, .footer)"), vec![n[2], n[5]]);
    assert!(doc.matches(n[0], "div:where(.content)"));
    assert!(doc.matches(n[0], "div:has(section > p)"));
    assert!(!doc.matches(n[2], ":has(.lead)"));
}

#[test]
fn test_unknown_pseudo_class_matches() {
    let (doc, n) = sample();
    assert!(doc.matches(n[1], "p:hover"));
    assert!(doc.matches(n[1], "p.lead::first-line"));
    assert!(!doc.matches(n[2], "p:hover"));
}

// ============================================================================
// QUERIES
// ============================================================================

#[test]
fn test_closest_walks_up() {
    let (doc, n) = sample();
    assert_eq!(doc.closest(n[3], "div"), Some(n[0]));
    assert_eq!(doc.closest(n[3], "p"), Some(n[3]));
    assert_eq!(closest(doc.tree(), n[3], "body > div"), Some(n[0]));
    assert_eq!(doc.closest(n[3], ".footer"), None);
}

#[test]
fn test_query_scoped_to_root() {
    let (doc, n) = sample();
    assert_eq!(doc.query_selector(n[0], "p"), Some(n[1]));
    assert_eq!(doc.query_selector_all(n[2], "p"), vec![n[3]]);
    // Root itself is excluded
    assert!(doc.query_selector_all(n[3], "p").is_empty());
}

#[test]
fn test_reusable_selector_list() {
    let (doc, n) = sample();
    let list = SelectorList::parse("p.lead, p.footer").unwrap();
    assert_eq!(list.query_all(doc.tree(), doc.root()), vec![n[1], n[5]]);
    assert!(list.matches(doc.tree(), n[5]));
    assert!(matches(doc.tree(), n[5], "p.footer"));
}
