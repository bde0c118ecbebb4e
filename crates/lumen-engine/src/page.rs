//! Page - A loaded document plus its tick-driven housekeeping

use lumen_dom::{Document, NodeId};

use crate::EngineError;

/// A loaded page
#[derive(Debug)]
pub struct Page {
    url: String,
    document: Document,
    auto_flush: bool,
    sanitize_markup: bool,
    ticks: u64,
}

impl Page {
    pub(crate) fn new(url: &str, document: Document, auto_flush: bool, sanitize_markup: bool) -> Self {
        Self {
            url: url.to_string(),
            document,
            auto_flush,
            sanitize_markup,
            ticks: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Get the page title
    pub fn title(&self) -> &str {
        self.document.title()
    }

    /// Number of ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// One processing tick: delivers queued mutation records to observers
    /// when auto-flush is on. Returns the number of records delivered.
    pub fn tick(&mut self) -> usize {
        self.ticks += 1;
        if !self.auto_flush {
            return 0;
        }
        let delivered = self.document.flush();
        if delivered > 0 {
            tracing::trace!(tick = self.ticks, delivered, "Flushed mutation records");
        }
        delivered
    }

    /// Replace a node's children with markup, sanitized when the engine
    /// sanitizes page markup
    pub fn set_inner_html(&mut self, node: NodeId, markup: &str) -> Result<(), EngineError> {
        if self.sanitize_markup {
            let clean = lumen_html::sanitize(markup);
            lumen_html::set_inner_html(&mut self.document, node, &clean)?;
        } else {
            lumen_html::set_inner_html(&mut self.document, node, markup)?;
        }
        Ok(())
    }

    /// Serialize the whole document
    pub fn serialize(&self) -> String {
        lumen_html::outer_html(self.document.tree(), self.document.root())
    }
}
