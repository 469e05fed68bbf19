//! Price-constraint parsing and search-URL building
//!
//! Free-text goals like `"cheapest usb hub under $30"` carry an optional
//! price constraint. [`parse_price_filters`] pulls the constraint out and
//! returns the goal with the matched phrase removed; [`build_search_url`]
//! additionally strips shopping stopwords and encodes the constraint into
//! the target site's cents-based range filter with an ascending price sort.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Range phrase: `50 to 100`, `$50 through $100`, `50-100`
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$?\s*(\d+(?:\.\d{1,2})?)\s*(?:to|through|[-\u{2013}])\s*\$?\s*(\d+(?:\.\d{1,2})?)")
        .expect("range regex is valid")
});

/// Single-sided phrase: `above $50`, `under 30`, `>= 12.50`
static SINGLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(above|over|under|below|less\s+than|more\s+than|at\s+least|>=|>|<=|<)\s*\$?\s*(\d+(?:\.\d{1,2})?)")
        .expect("single-sided regex is valid")
});

/// Generic verbs that belong to the request, not the product
static STOPWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(cheapest|find|show|get|buy)\b").expect("stopword regex is valid")
});

/// Substituted when stripping leaves the query empty
pub const DEFAULT_QUERY: &str = "shirt";

/// An inclusive price bound parsed from a goal string.
///
/// At most one of a single-sided bound or a two-sided range is ever derived
/// from one goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBound {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceBound {
    /// Whether any bound is present
    pub fn is_some(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Inclusive containment check
    pub fn contains(&self, price: f64) -> bool {
        if let Some(min) = self.min {
            if price < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if price > max {
                return false;
            }
        }
        true
    }
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_match(text: &str, m: &regex::Match) -> String {
    collapse_ws(&format!("{} {}", &text[..m.start()], &text[m.end()..]))
}

/// Parse a goal string into a price bound and a cleaned query.
///
/// A range match wins over a single-sided match. Only the matched phrase is
/// removed, so re-parsing the cleaned query never yields a further bound
/// (a bare number with no comparison phrase is not a constraint).
pub fn parse_price_filters(goal: &str) -> (PriceBound, String) {
    let g = goal.trim();

    if let Some(caps) = RANGE_RE.captures(g) {
        let lo = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
        let hi = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok());
        if let (Some(whole), Some(lo), Some(hi)) = (caps.get(0), lo, hi) {
            return (
                PriceBound {
                    min: Some(lo),
                    max: Some(hi),
                },
                strip_match(g, &whole),
            );
        }
    }

    if let Some(caps) = SINGLE_RE.captures(g) {
        let op = caps
            .get(1)
            .map(|m| collapse_ws(&m.as_str().to_lowercase()))
            .unwrap_or_default();
        let val = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok());
        if let (Some(whole), Some(val)) = (caps.get(0), val) {
            let cleaned = strip_match(g, &whole);
            let bound = match op.as_str() {
                "above" | "over" | "more than" | "at least" | ">" | ">=" => PriceBound {
                    min: Some(val),
                    max: None,
                },
                _ => PriceBound {
                    min: None,
                    max: Some(val),
                },
            };
            return (bound, cleaned);
        }
    }

    (PriceBound::default(), collapse_ws(g))
}

/// Build a constrained search URL for the target site.
///
/// Price bounds go into the `rh=p_36` filter in cents, inclusive on the
/// side(s) specified, and results are sorted ascending by price so the
/// first valid item is the cheapest within the constraint.
pub fn build_search_url(goal: &str) -> (String, PriceBound) {
    let (bound, cleaned) = parse_price_filters(goal);

    let query = collapse_ws(&STOPWORD_RE.replace_all(&cleaned, ""));
    let query = if query.is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        query
    };

    let mut url = format!(
        "https://www.amazon.com/s?k={}",
        urlencoding::encode(&query)
    );

    if bound.is_some() {
        let lo = bound
            .min
            .map(|v| ((v * 100.0).round() as i64).to_string())
            .unwrap_or_default();
        let hi = bound
            .max
            .map(|v| ((v * 100.0).round() as i64).to_string())
            .unwrap_or_default();
        url.push_str(&format!("&rh=p_36%3A{}-{}", lo, hi));
    }

    url.push_str("&s=price-asc-rank");
    (url, bound)
}
