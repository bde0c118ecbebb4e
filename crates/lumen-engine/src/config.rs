//! Engine Configuration

/// Engine configuration options
#[derive(Debug, Clone)]
pub struct Config {
    /// Run markup through the sanitizer before building documents
    pub sanitize_markup: bool,

    /// Largest markup accepted by `Engine::load_markup` (bytes)
    pub max_markup_bytes: usize,

    /// Deliver pending mutation records on every `Page::tick`
    pub auto_flush: bool,

    /// User agent string
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sanitize_markup: true,
            max_markup_bytes: 8 * 1024 * 1024, // 8MB
            auto_flush: true,
            user_agent: format!("Lumen/{}", crate::VERSION),
        }
    }
}

impl Config {
    pub fn with_sanitize_markup(mut self, sanitize: bool) -> Self {
        self.sanitize_markup = sanitize;
        self
    }

    pub fn with_max_markup_bytes(mut self, bytes: usize) -> Self {
        self.max_markup_bytes = bytes;
        self
    }

    pub fn with_auto_flush(mut self, auto_flush: bool) -> Self {
        self.auto_flush = auto_flush;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
