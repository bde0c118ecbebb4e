//! Example: Basic usage of the Lumen engine

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Context;
use lumen_engine::css::ElementQuery;
use lumen_engine::dom::{Event, ListenerOptions};
use lumen_engine::{Config, Engine};
use tracing_subscriber::EnvFilter;

const MARKUP: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><title>Todo</title></head>
<body>
  <ul id="todos">
    <li class="done">Write parser
    <li>Write selector engine
    <li>Ship it
  </ul>
  <button id="add" onclick="steal()">Add</button>
  <script>steal()</script>
</body>
</html>"#;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let engine = Engine::new(Config::default());
    let mut page = engine.load_markup("about:todo", MARKUP)?;
    println!("Loaded {:?} (Lumen v{})", page.title(), lumen_engine::VERSION);

    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    page.document_mut().observe(move |_, records| {
        sink.borrow_mut().extend(records.iter().map(|r| format!("{r:?}")));
    });

    let doc = page.document_mut();
    let list = doc.get_element_by_id("todos").context("missing #todos")?;
    let button = doc.get_element_by_id("add").context("missing #add")?;

    // Clicking the button appends a new item
    let handler = doc.register_handler(move |doc, _event| {
        let item = doc.create_element("li");
        if doc.set_text_content(item, "New item").is_ok() {
            let _ = doc.append_child(list, item);
        }
    });
    doc.add_event_listener(button, "click", handler, ListenerOptions::default());
    doc.dispatch_event(button, &mut Event::bubbling("click"));

    let open = doc.query_selector_all(list, "li:not(.done)");
    println!("{} open items", open.len());
    for item in open {
        println!("  - {}", doc.text_content(item).trim());
    }

    let delivered = page.tick();
    println!("Delivered {delivered} mutation records:");
    for line in log.borrow().iter() {
        println!("  {line}");
    }

    println!("{}", page.serialize());
    Ok(())
}
