//! Selector resolution with multi-tier fallback
//!
//! Maps a semantic action target to a live element despite layout drift:
//! try the step's selector first, then each configured fallback in priority
//! order, swallowing per-candidate failures. Both entry points return a
//! plain success flag; nothing here raises past its boundary.

use crate::browser::BrowserSession;
use crate::selectors::SelectorConfig;
use std::thread;
use std::time::Duration;

const CLICK_WAIT: Duration = Duration::from_secs(10);
const FILL_WAIT: Duration = Duration::from_secs(8);
const SUBMIT_WAIT: Duration = Duration::from_secs(3);

/// Delay between attachment and interaction, so client-side hydration can
/// finish before we type
const HYDRATION_SETTLE: Duration = Duration::from_secs(1);

/// Fill an input, trying the given selector and then the configured
/// search-input fallbacks.
pub fn resolve_fill(
    session: &BrowserSession,
    selector: &str,
    value: &str,
    cfg: &SelectorConfig,
) -> bool {
    for sel in cfg.candidates(selector, &cfg.search_inputs) {
        if session.wait_for(sel, FILL_WAIT).is_err() {
            log::debug!("fill candidate '{}' not attached", sel);
            continue;
        }

        thread::sleep(HYDRATION_SETTLE);

        match session.fill(sel, value) {
            Ok(()) => {
                log::debug!("filled '{}'", sel);
                return true;
            }
            Err(e) => {
                log::debug!("fill candidate '{}' failed: {}", sel, e);
            }
        }
    }

    false
}

/// Click an element, trying the given selector and then the configured
/// submit fallbacks; as a last resort, focus a known search input and press
/// Enter.
pub fn resolve_click(session: &BrowserSession, selector: &str, cfg: &SelectorConfig) -> bool {
    for sel in cfg.candidates(selector, &cfg.search_submits) {
        if session.wait_for(sel, CLICK_WAIT).is_err() {
            log::debug!("click candidate '{}' not visible", sel);
            continue;
        }

        match session.click(sel) {
            Ok(()) => {
                log::debug!("clicked '{}'", sel);
                return true;
            }
            Err(e) => {
                log::debug!("click candidate '{}' failed: {}", sel, e);
            }
        }
    }

    // Keyboard submit: focus the search box and send Enter
    for sel in &cfg.search_inputs {
        if session.wait_for(sel, SUBMIT_WAIT).is_err() {
            continue;
        }
        if session.press_enter_in(sel).is_ok() {
            log::debug!("submitted via Enter in '{}'", sel);
            return true;
        }
    }

    false
}
