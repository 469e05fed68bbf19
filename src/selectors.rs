//! Selector configuration
//!
//! Every selector the agent relies on lives here as data, not code. The
//! target site's layout drifts constantly, so each semantic slot (search
//! box, submit button, product card, price text) carries an ordered,
//! priority-ranked candidate list, and the whole config can be swapped out
//! (it round-trips through serde) without touching engine logic.

use serde::{Deserialize, Serialize};

/// Ordered selector candidate lists and page markers for the target site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Search input candidates, highest priority first
    pub search_inputs: Vec<String>,

    /// Search submit button candidates
    pub search_submits: Vec<String>,

    /// Primary results container
    pub results_container: String,

    /// Signals that prices have rendered (any match suffices)
    pub price_ready: String,

    /// Primary product-card selector set
    pub cards_primary: String,

    /// Coarser card selector tried when the primary set yields nothing
    pub cards_fallback: String,

    /// Title sub-selectors per card, priority order
    pub card_titles: Vec<String>,

    /// Link sub-selectors per card, priority order
    pub card_links: Vec<String>,

    /// Price sub-selectors per card (offscreen text preferred)
    pub card_prices: Vec<String>,

    /// Whole/fraction/symbol price fallbacks
    pub price_whole: String,
    pub price_fraction: String,
    pub price_symbol: String,

    /// Sub-selectors flagging a card as sponsored
    pub sponsored_markers: Vec<String>,

    /// Lowercase substrings in the raw markup signalling an anti-bot block
    pub block_markers: Vec<String>,

    /// Consent/location overlay dismissers, clicked best-effort
    pub overlay_dismissers: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            search_inputs: strings(&[
                "input#twotabsearchtextbox",
                "input[name='field-keywords']",
            ]),
            search_submits: strings(&[
                "input#nav-search-submit-button",
                "input[type='submit'][value]",
                "input[type='submit']",
            ]),
            results_container: "div.s-main-slot".to_string(),
            price_ready:
                ".a-price .a-offscreen, span[data-a-color='price'] .a-offscreen, div.s-widget-container"
                    .to_string(),
            cards_primary:
                "div.s-main-slot div[data-asin]:not([data-asin='']), div.s-card-container, div.sg-col-inner"
                    .to_string(),
            cards_fallback: "div.s-card-container".to_string(),
            card_titles: strings(&[
                "h2 a span",
                ".a-size-medium.a-color-base.a-text-normal",
                ".a-size-base-plus.a-color-base.a-text-normal",
            ]),
            card_links: strings(&[
                "h2 a[href]",
                "a.a-link-normal.s-underline-text",
                "a.a-link-normal",
            ]),
            card_prices: strings(&[
                ".a-price .a-offscreen",
                ".a-text-price .a-offscreen",
                "span[data-a-color='price'] .a-offscreen",
                "span[data-a-color='base'] .a-offscreen",
                "span.a-price[data-a-size] .a-offscreen",
                ".a-price .a-price-range .a-offscreen",
            ]),
            price_whole: ".a-price .a-price-whole".to_string(),
            price_fraction: ".a-price .a-price-fraction".to_string(),
            price_symbol: ".a-price-symbol".to_string(),
            sponsored_markers: strings(&[
                "[aria-label='Sponsored']",
                ".s-sponsored-label-text",
                ".puis-sponsored-label-text",
            ]),
            block_markers: strings(&[
                "captcha",
                "robot check",
                "enter the characters you see",
                "/errors/validatecaptcha",
            ]),
            overlay_dismissers: strings(&[
                "input#sp-cc-accept",
                "button[name='glowDoneButton']",
                "input[name='glowDoneButton']",
            ]),
        }
    }
}

impl SelectorConfig {
    /// Candidate order for an interaction: the requested selector first,
    /// then the configured fallbacks, deduplicated.
    pub fn candidates<'a>(&'a self, primary: &'a str, fallbacks: &'a [String]) -> Vec<&'a str> {
        let mut out = Vec::with_capacity(fallbacks.len() + 1);
        if !primary.trim().is_empty() {
            out.push(primary);
        }
        for sel in fallbacks {
            if sel != primary && !sel.is_empty() {
                out.push(sel.as_str());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_order_dedups_primary() {
        let cfg = SelectorConfig::default();
        let candidates = cfg.candidates("input#twotabsearchtextbox", &cfg.search_inputs);

        assert_eq!(
            candidates,
            vec!["input#twotabsearchtextbox", "input[name='field-keywords']"]
        );
    }

    #[test]
    fn test_candidate_order_unlisted_primary_first() {
        let cfg = SelectorConfig::default();
        let candidates = cfg.candidates("#custom-box", &cfg.search_inputs);

        assert_eq!(candidates[0], "#custom-box");
        assert_eq!(candidates.len(), 1 + cfg.search_inputs.len());
    }

    #[test]
    fn test_empty_primary_skipped() {
        let cfg = SelectorConfig::default();
        let candidates = cfg.candidates("", &cfg.search_submits);

        assert_eq!(candidates.len(), cfg.search_submits.len());
    }

    #[test]
    fn test_config_round_trips_through_serde() {
        let cfg = SelectorConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SelectorConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.block_markers, cfg.block_markers);
        assert_eq!(back.cards_primary, cfg.cards_primary);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: SelectorConfig =
            serde_json::from_str(r#"{"results_container": "div.results"}"#).unwrap();

        assert_eq!(cfg.results_container, "div.results");
        assert!(!cfg.search_inputs.is_empty());
    }
}
