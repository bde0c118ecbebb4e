//! Edge case tests for lumen-html
//!
//! Malformed markup, hostile input and large documents.

use lumen_dom::{DomTree, NodeId};
use lumen_html::{build_document, decode_entities, parse_fragment, sanitize, serialize};

fn parse(markup: &str) -> (DomTree, Vec<NodeId>) {
    let mut tree = DomTree::new();
    let roots = parse_fragment(&mut tree, markup);
    (tree, roots)
}

// ============================================================================
// MALFORMED MARKUP
// ============================================================================

#[test]
fn test_empty_and_whitespace_input() {
    let (_, roots) = parse("");
    assert!(roots.is_empty());

    let doc = build_document("   \n\t ");
    assert!(doc.children(doc.body()).is_empty());
    assert!(doc.children(doc.head()).is_empty());
}

#[test]
fn test_truncated_inputs_never_panic() {
    for markup in [
        "<", "</", "<!", "<!-", "<!--", "<!-- x", "<?", "<a", "<a ", "<a b", "<a b=", "<a b='",
        "<a b=\"x", "</a", "<script>", "<script>x</scr", "&", "&#", "&#x", "&amp", "<p/",
        "<a =x>", "<a/b>",
    ] {
        let (tree, roots) = parse(markup);
        let _ = serialize(&tree, &roots);
        let _ = build_document(markup);
        let _ = sanitize(markup);
    }
}

#[test]
fn test_misnested_tags() {
    let (tree, roots) = parse("<b><i>x</b>y</i>z");
    assert_eq!(serialize(&tree, &roots), "<b><i>x</i></b>yz");
}

#[test]
fn test_end_tag_for_void_ignored() {
    let (tree, roots) = parse("<p>a<br></br>b</p>");
    assert_eq!(serialize(&tree, &roots), "<p>a<br>b</p>");
}

#[test]
fn test_attribute_oddities() {
    let (tree, roots) = parse("<div a=1 a=2 B = 'x' c=\"\" =junk d>");
    let attrs = tree.element(roots[0]).unwrap().attrs();
    assert_eq!(attrs.get("a"), Some("1"));
    assert_eq!(attrs.get("b"), Some("x"));
    assert_eq!(attrs.get("c"), Some(""));
    assert!(attrs.contains("junk"));
    assert!(attrs.contains("d"));
}

#[test]
fn test_implicit_close_stops_at_boundary() {
    // The inner div shields the open li from the new one
    let (tree, roots) = parse("<ul><li><div><li>inner</div></ul>");
    let ul = roots[0];
    assert_eq!(tree.children(ul).len(), 1);
    let div = tree.children(tree.children(ul)[0])[0];
    assert_eq!(tree.tag_name(div), Some("div"));
    assert_eq!(tree.children(div).len(), 1);
}

#[test]
fn test_paragraph_closed_by_table_not_by_span() {
    let (tree, roots) = parse("<p>a<span>b</span><table></table>");
    assert_eq!(roots.len(), 2);
    assert_eq!(tree.children(roots[0]).len(), 2);
}

// ============================================================================
// ENTITIES
// ============================================================================

#[test]
fn test_entity_edge_cases() {
    assert_eq!(decode_entities("&;"), "&;");
    assert_eq!(decode_entities("&&amp;&"), "&&&");
    assert_eq!(decode_entities("&#x41;&#x;"), "A&#x;");
    assert_eq!(decode_entities("&AMP;"), "&AMP;");
}

#[test]
fn test_text_with_ampersands_round_trips() {
    let (tree, roots) = parse("Q&A: AT&T &copy");
    assert_eq!(tree.text_content(roots[0]), "Q&A: AT&T ©");
    assert_eq!(serialize(&tree, &roots), "Q&amp;A: AT&amp;T ©");
}

// ============================================================================
// HOSTILE INPUT
// ============================================================================

#[test]
fn test_sanitize_nested_and_uppercase() {
    let out = sanitize("<DIV ONMOUSEOVER=x><SCRIPT>a()</SCRIPT><IFRAME SRC=' javascript:b()'></IFRAME></DIV>");
    assert_eq!(out, "<div><iframe src=\"#\"></iframe></div>");
}

#[test]
fn test_sanitize_script_close_inside_string() {
    let out = sanitize("<script>var s = '<b>';</script><b>ok</b>");
    assert_eq!(out, "<b>ok</b>");
}

#[test]
fn test_sanitize_entity_obfuscated_scheme() {
    let out = sanitize("<a href=\"&#106;avascript&#58;go()\">x</a>");
    assert_eq!(out, "<a href=\"#\">x</a>");
}

#[test]
fn test_sanitize_is_idempotent() {
    let once = sanitize("<p onclick=x>a<style>b</style><a href=vbscript:c>d</a></p>");
    assert_eq!(sanitize(&once), once);
}

// ============================================================================
// STRESS
// ============================================================================

#[test]
fn test_deeply_nested_markup() {
    let depth = 500;
    let markup = format!("{}leaf{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let (tree, roots) = parse(&markup);
    assert_eq!(roots.len(), 1);
    assert_eq!(tree.descendants(roots[0]).len(), depth);
    assert_eq!(serialize(&tree, &roots), markup);
}

#[test]
fn test_unclosed_deep_nesting() {
    let markup = "<span>".repeat(1000);
    let (tree, roots) = parse(&markup);
    assert_eq!(roots.len(), 1);
    assert_eq!(tree.descendants(roots[0]).len(), 999);
}

#[test]
fn test_large_flat_document() {
    let markup: String = (0..2000).map(|i| format!("<li data-i={i}>item {i}")).collect();
    let doc = build_document(&format!("<ul>{markup}</ul>"));
    let ul = doc.element_children(doc.body())[0];
    assert_eq!(doc.children(ul).len(), 2000);
    assert_eq!(doc.get_attribute(doc.children(ul)[1999], "data-i"), Some("1999"));
}
