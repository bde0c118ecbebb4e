//! Integration tests for lumen-engine
//!
//! Whole-pipeline scenarios: load, query, dispatch, mutate, tick.

use std::cell::RefCell;
use std::rc::Rc;

use lumen_engine::css::ElementQuery;
use lumen_engine::dom::{Event, ListenerOptions, MutationRecord};
use lumen_engine::{Config, Engine, EngineError};

const APP: &str = r#"<html><head><title>App</title></head>
<body>
  <form id="signup">
    <input name="email" required>
    <input name="age" disabled>
    <button type="submit" onclick="x()">Go</button>
  </form>
  <ul id="items"><li>a<li>b<li>c</ul>
</body></html>"#;

// ============================================================================
// LOADING
// ============================================================================

#[test]
fn test_load_and_query() {
    let engine = Engine::default();
    let page = engine.load_markup("https://app.test/", APP).unwrap();
    let doc = page.document();

    assert_eq!(page.title(), "App");
    assert_eq!(doc.query_selector_all(doc.root(), "input:required").len(), 1);
    assert_eq!(doc.query_selector_all(doc.root(), "input:disabled").len(), 1);
    assert_eq!(doc.query_selector_all(doc.root(), "#items > li:nth-child(odd)").len(), 2);
    assert!(doc.query_selector(doc.root(), "[onclick]").is_none());
    assert!(doc.is_dirty());
    assert!(doc.pending_records().is_empty());
}

#[test]
fn test_size_limit() {
    let engine = Engine::new(Config::default().with_max_markup_bytes(APP.len() - 1));
    let err = engine.load_markup("https://app.test/", APP).unwrap_err();
    assert!(matches!(err, EngineError::MarkupTooLarge { .. }));
    assert!(err.to_string().contains("too large"));
}

// ============================================================================
// EVENTS AND MUTATIONS
// ============================================================================

#[test]
fn test_submit_listener_mutates_and_tick_delivers() {
    let engine = Engine::default();
    let mut page = engine.load_markup("https://app.test/", APP).unwrap();

    let batches = Rc::new(RefCell::new(Vec::<Vec<MutationRecord>>::new()));
    let sink = Rc::clone(&batches);
    page.document_mut()
        .observe(move |_, records| sink.borrow_mut().push(records.to_vec()));

    let doc = page.document_mut();
    let form = doc.get_element_by_id("signup").unwrap();
    let button = doc.query_selector(form, "button").unwrap();
    let items = doc.get_element_by_id("items").unwrap();

    let handler = doc.register_handler(move |doc, event| {
        event.prevent_default();
        let li = doc.create_element("li");
        doc.set_text_content(li, "d").unwrap();
        doc.append_child(items, li).unwrap();
        doc.set_attribute(items, "data-count", "4").unwrap();
    });
    doc.add_event_listener(form, "submit", handler, ListenerOptions::default());

    let mut submit = Event::new("submit", true, true);
    assert!(!doc.dispatch_event(button, &mut submit));
    assert!(submit.default_prevented());

    // Text into the new item, the item into the list, then the attribute
    assert_eq!(page.tick(), 3);
    assert_eq!(page.tick(), 0);

    let batches = batches.borrow();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][1].target(), items);
    assert!(batches[0][1].is_child_list());
    assert_eq!(batches[0][2].attribute_name(), Some("data-count"));
    assert_eq!(page.document().query_selector_all(items, "li").len(), 4);
}

#[test]
fn test_inner_html_through_page() {
    let engine = Engine::default();
    let mut page = engine.load_markup("https://app.test/", APP).unwrap();
    let items = page.document().get_element_by_id("items").unwrap();

    page.set_inner_html(items, "<li>x<li onmouseover=y()>z").unwrap();
    let doc = page.document();
    assert_eq!(doc.children(items).len(), 2);
    assert!(doc.query_selector(items, "[onmouseover]").is_none());
    assert_eq!(doc.pending_records().len(), 1);
}

#[test]
fn test_serialize_round_trip_through_engine() {
    let raw = Engine::new(Config::default().with_sanitize_markup(false));
    let page = raw.load_markup("a", APP).unwrap();
    let html = page.serialize();

    let again = raw.load_markup("b", &html).unwrap();
    assert_eq!(again.serialize(), html);
    assert_eq!(again.title(), "App");
}
