use std::path::PathBuf;

/// Default user agents rotated per session to reduce bot-detection signal
const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_6) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
];

/// Immutable session configuration, threaded into [`BrowserSession::launch`].
///
/// Everything that shapes how the browser presents itself (headless mode,
/// window size, user agent, language) lives here rather than as ambient
/// defaults at call sites.
///
/// [`BrowserSession::launch`]: crate::browser::BrowserSession::launch
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run Chrome without a visible window
    pub headless: bool,

    /// Browser window width in pixels
    pub window_width: u32,

    /// Browser window height in pixels
    pub window_height: u32,

    /// User-agent strings to choose from at launch
    pub user_agents: Vec<String>,

    /// Accept-Language header value reported by the page
    pub accept_language: String,

    /// Platform string reported by the page
    pub platform: String,

    /// Path to a custom Chrome/Chromium binary
    pub chrome_path: Option<PathBuf>,

    /// Persistent profile directory
    pub user_data_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1366,
            window_height: 900,
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            accept_language: "en-US,en;q=0.9".to_string(),
            platform: "Win32".to_string(),
            chrome_path: None,
            user_data_dir: None,
        }
    }
}

impl SessionConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Builder method: set window size
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Builder method: set Chrome binary path
    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Builder method: set persistent profile directory
    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    /// Pick a user agent for this session
    pub fn pick_user_agent(&self) -> Option<&str> {
        use rand::seq::SliceRandom;
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(|s| s.as_str())
    }
}
