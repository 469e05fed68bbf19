//! Page context snapshotting
//!
//! Samples the current page's visible interactive elements into a compact
//! structural summary for the external planner. The snapshot is lossy and
//! size-capped by design: downstream consumers must tolerate staleness and
//! omission. A fresh snapshot is taken on every request, never cached.

use crate::browser::BrowserSession;
use serde::{Deserialize, Serialize};

/// Maximum number of elements sampled per snapshot (kept in sync with the
/// CAP constant in snapshot.js)
pub const SAMPLE_CAP: usize = 100;

const SNAPSHOT_JS: &str = include_str!("snapshot.js");

/// One sampled element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSample {
    pub tag: String,

    /// ARIA role, `"none"` when absent
    pub role: String,

    /// ARIA label, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria: Option<String>,

    /// Visible text, truncated
    pub text: String,
}

/// A compact structural sample of the current page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContext {
    pub title: String,
    pub url: String,
    pub element_samples: Vec<ElementSample>,
}

/// Capture a fresh snapshot of the session's current page.
///
/// Best-effort: elements whose sampling fails are silently excluded, and a
/// page where the script cannot run yields a context with no samples.
pub fn capture(session: &BrowserSession) -> PageContext {
    let mut context = PageContext {
        title: session.title(),
        url: session.url(),
        element_samples: Vec::new(),
    };

    match session.eval_string(SNAPSHOT_JS) {
        Ok(json) => match serde_json::from_str::<Vec<ElementSample>>(&json) {
            Ok(samples) => context.element_samples = samples,
            Err(e) => log::debug!("Snapshot payload did not parse: {}", e),
        },
        Err(e) => log::debug!("Snapshot script failed: {}", e),
    }

    context.element_samples.truncate(SAMPLE_CAP);
    context
}
