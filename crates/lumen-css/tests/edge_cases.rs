//! Edge case tests for lumen-css
//!
//! Malformed selectors, unusual whitespace and large sibling sets.

use lumen_css::{ElementQuery, SelectorError, SelectorList, matches, query_all};
use lumen_dom::{Document, NodeId};

fn with_children(count: usize, tag: &str) -> (Document, NodeId, Vec<NodeId>) {
    let mut doc = Document::new();
    let parent = doc.create_element("div");
    doc.append_child(doc.body(), parent).unwrap();
    let children = (0..count)
        .map(|_| {
            let child = doc.create_element(tag);
            doc.append_child(parent, child).unwrap();
            child
        })
        .collect();
    (doc, parent, children)
}

// ============================================================================
// MALFORMED INPUT
// ============================================================================

#[test]
fn test_malformed_selectors_match_nothing() {
    let (doc, parent, children) = with_children(2, "span");
    for selector in ["", "   ", ">", "span >", "[", "span[=x]", ":nth-child(", "#", "span..x", "a,,"] {
        assert!(
            doc.query_selector_all(parent, selector).is_empty(),
            "selector {selector:?} should match nothing"
        );
        assert!(!matches(doc.tree(), children[0], selector), "{selector:?}");
    }
}

#[test]
fn test_bad_branch_does_not_poison_group() {
    let (doc, parent, children) = with_children(2, "span");
    assert_eq!(query_all(doc.tree(), parent, "span:first-child, ][, :nth-child(zz)"), vec![children[0]]);
}

#[test]
fn test_strict_parse_reports_errors() {
    assert_eq!(SelectorList::parse(""), Err(SelectorError::Empty));
    assert_eq!(SelectorList::parse("a >"), Err(SelectorError::DanglingCombinator));
    assert_eq!(SelectorList::parse("a[b"), Err(SelectorError::Unclosed('[')));
    assert!(matches!(
        SelectorList::parse("li:nth-child(2x)"),
        Err(SelectorError::InvalidNth(_))
    ));
    assert!(matches!(
        SelectorList::parse("a[b=c d]"),
        Err(SelectorError::InvalidAttribute(_))
    ));
}

#[test]
fn test_extreme_nth_offsets_do_not_fault() {
    let (doc, _, children) = with_children(3, "li");
    assert!(matches(doc.tree(), children[0], ":nth-child(n-2147483648)"));
    assert!(matches(doc.tree(), children[2], ":nth-last-child(n-2147483648)"));
    assert!(!matches(doc.tree(), children[0], ":nth-child(-n-2147483647)"));
    assert!(matches(doc.tree(), children[1], ":nth-of-type(2147483647n+2)"));
}

// ============================================================================
// WHITESPACE AND QUOTING
// ============================================================================

#[test]
fn test_whitespace_around_combinators() {
    let (doc, parent, children) = with_children(3, "i");
    for selector in ["div>i", "div > i", "div\n>\ti", "  div  >  i  "] {
        assert_eq!(doc.query_selector_all(doc.root(), selector), children, "{selector:?}");
    }
    assert_eq!(doc.query_selector_all(parent, "i + i"), children[1..].to_vec());
    assert_eq!(doc.query_selector_all(parent, "i~i"), children[1..].to_vec());
}

#[test]
fn test_quoted_values_with_special_chars() {
    let mut doc = Document::new();
    let div = doc.create_element("div");
    doc.append_child(doc.body(), div).unwrap();
    doc.set_attribute(div, "title", "a, b] (c)").unwrap();
    doc.set_attribute(div, "data-q", "it's").unwrap();

    assert!(doc.matches(div, "[title='a, b] (c)']"));
    assert!(doc.matches(div, "[title*=\"] (\"], span"));
    assert!(doc.matches(div, r#"[data-q="it's"]"#));
    assert!(doc.matches(div, r"[data-q='it\'s']"));
}

#[test]
fn test_escaped_identifiers() {
    let mut doc = Document::new();
    let div = doc.create_element("div");
    doc.append_child(doc.body(), div).unwrap();
    doc.set_attribute(div, "class", "w-1/2 md:flex").unwrap();

    assert!(doc.matches(div, r".w-1\/2"));
    assert!(doc.matches(div, r".md\:flex"));
}

// ============================================================================
// STRUCTURE
// ============================================================================

#[test]
fn test_text_siblings_ignored_for_positions() {
    let mut doc = Document::new();
    let ul = doc.create_element("ul");
    doc.append_child(doc.body(), ul).unwrap();
    let mut items = Vec::new();
    for _ in 0..3 {
        let space = doc.create_text_node("\n  ");
        doc.append_child(ul, space).unwrap();
        let li = doc.create_element("li");
        doc.append_child(ul, li).unwrap();
        items.push(li);
    }
    assert!(doc.matches(items[0], ":first-child"));
    assert!(doc.matches(items[2], ":last-child"));
    assert!(doc.matches(items[1], "li + li:nth-child(2)"));
    assert!(!doc.matches(ul, ":empty"));
}

#[test]
fn test_detached_subtree_queries() {
    let mut doc = Document::new();
    let outer = doc.create_element("section");
    let inner = doc.create_element("p");
    doc.append_child(outer, inner).unwrap();

    assert!(doc.matches(inner, "section > p"));
    assert_eq!(doc.query_selector_all(outer, "p"), vec![inner]);
    assert!(doc.query_selector_all(doc.root(), "section").is_empty());
}

#[test]
fn test_large_sibling_set() {
    let (doc, parent, children) = with_children(300, "li");
    let even = doc.query_selector_all(parent, "li:nth-child(even)");
    assert_eq!(even.len(), 150);
    assert_eq!(even[0], children[1]);
    assert_eq!(doc.query_selector(parent, ":nth-last-child(1)"), children.last().copied());
    assert_eq!(doc.query_selector_all(parent, ":nth-child(n+296)").len(), 5);
}

#[test]
fn test_deep_descendant_match() {
    let mut doc = Document::new();
    let mut parent = doc.body();
    for _ in 0..500 {
        let div = doc.create_element("div");
        doc.append_child(parent, div).unwrap();
        parent = div;
    }
    let leaf = doc.create_element("em");
    doc.append_child(parent, leaf).unwrap();

    assert!(doc.matches(leaf, "body em"));
    assert!(doc.matches(leaf, "body > div div > em"));
    assert!(!doc.matches(leaf, "head em"));
}
