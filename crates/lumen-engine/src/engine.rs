//! Engine - Main entry point

use crate::{Config, Page};

/// The Lumen document engine
#[derive(Debug)]
pub struct Engine {
    config: Config,
}

impl Engine {
    /// Create a new engine with the given configuration
    pub fn new(config: Config) -> Self {
        tracing::info!("Lumen Engine {} initialized", crate::VERSION);
        Self { config }
    }

    /// Build a page from markup.
    ///
    /// Markup over `max_markup_bytes` is rejected. With `sanitize_markup`
    /// on, script-bearing content is stripped before parsing.
    pub fn load_markup(&self, url: &str, markup: &str) -> Result<Page, EngineError> {
        tracing::info!("Loading: {}", url);

        if markup.len() > self.config.max_markup_bytes {
            tracing::warn!(
                url,
                size = markup.len(),
                limit = self.config.max_markup_bytes,
                "Rejected oversized markup"
            );
            return Err(EngineError::MarkupTooLarge {
                size: markup.len(),
                limit: self.config.max_markup_bytes,
            });
        }

        let document = if self.config.sanitize_markup {
            let (clean, report) = lumen_html::sanitize_with_report(markup);
            if !report.is_clean() {
                tracing::debug!(url, ?report, "Sanitized page markup");
            }
            lumen_html::build_document(&clean)
        } else {
            lumen_html::build_document(markup)
        };

        Ok(Page::new(
            url,
            document,
            self.config.auto_flush,
            self.config.sanitize_markup,
        ))
    }

    /// Get engine configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Engine error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Markup too large: {size} bytes (limit {limit})")]
    MarkupTooLarge { size: usize, limit: usize },

    #[error("DOM error: {0}")]
    Dom(#[from] lumen_dom::DomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_builds_document() {
        let engine = Engine::default();
        let page = engine
            .load_markup("about:test", "<title>Hi</title><p>x</p>")
            .unwrap();
        assert_eq!(page.url(), "about:test");
        assert_eq!(page.title(), "Hi");
    }

    #[test]
    fn test_oversized_markup_rejected() {
        let engine = Engine::new(Config::default().with_max_markup_bytes(4));
        assert_eq!(
            engine.load_markup("about:big", "<p>too long</p>").unwrap_err(),
            EngineError::MarkupTooLarge { size: 15, limit: 4 }
        );
    }

    #[test]
    fn test_sanitize_toggle() {
        let markup = "<p onclick=go()>x</p><script>1</script>";

        let page = Engine::default().load_markup("a", markup).unwrap();
        assert!(!page.serialize().contains("script"));
        assert!(!page.serialize().contains("onclick"));

        let raw = Engine::new(Config::default().with_sanitize_markup(false));
        let page = raw.load_markup("a", markup).unwrap();
        assert!(page.serialize().contains("<script>1</script>"));
        assert!(page.serialize().contains("onclick=\"go()\""));
    }
}
