//! Browser session management
//!
//! Wraps `headless_chrome` with the small set of page operations the plan
//! engine and extractor need: navigation with readiness waits, bounded
//! selector waits, fill/click/submit primitives, scrolling, markup capture
//! and screenshots. Session behavior (headless mode, window size, user
//! agent, language) is an explicit immutable [`SessionConfig`] value.

pub mod config;
pub mod session;

pub use config::SessionConfig;
pub use session::BrowserSession;
