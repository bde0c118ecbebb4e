//! Lumen Engine
//!
//! Host-facing facade over the Lumen document engine: load markup into a
//! `Page`, query and mutate its `Document`, and drive mutation delivery
//! from the host's tick loop.
//!
//! # Example
//! ```rust,ignore
//! use lumen_engine::{Config, Engine};
//!
//! let engine = Engine::new(Config::default());
//! let mut page = engine.load_markup("about:blank", "<p>Hello</p>")?;
//! page.tick();
//! ```

mod config;
mod engine;
mod page;

pub use config::Config;
pub use engine::{Engine, EngineError};
pub use page::Page;

// Re-export sub-crates
pub use lumen_css as css;
pub use lumen_dom as dom;
pub use lumen_html as html;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
