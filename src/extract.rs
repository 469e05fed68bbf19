//! Product extraction
//!
//! Opens a constrained search for the goal, waits out the site's lazy
//! rendering, then harvests `{title, link, price}` records from the result
//! cards. Field extraction runs in-page and returns *raw* card records;
//! all validation, price normalization, bound filtering and sorting happen
//! here in Rust. The extractor never raises past its boundary: every
//! failure mode (anti-bot block, no cards, no valid products, unexpected
//! fault) produces an empty list plus diagnostic artifacts on disk.

use crate::browser::BrowserSession;
use crate::error::{AgentError, Result};
use crate::price::{PriceBound, build_search_url};
use crate::selectors::SelectorConfig;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

/// Base used to absolutize relative product links
pub const BASE_URL: &str = "https://www.amazon.com";

const CARDS_JS: &str = include_str!("extract_cards.js");

const RESULTS_WAIT: Duration = Duration::from_secs(30);
const PRICE_WAIT: Duration = Duration::from_secs(25);
const OVERLAY_WAIT: Duration = Duration::from_millis(1500);
const SCROLL_CYCLES: usize = 12;
const CARD_POLLS: usize = 5;

const DEBUG_MARKUP_PATH: &str = "debug_results_page.html";

/// A validated product record.
///
/// Never constructed with an empty title, a relative link, or a
/// non-finite/non-positive price, and never for a sponsored card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub link: String,
    pub price: f64,
}

/// Raw card record as returned by the in-page script, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCard {
    pub title: Option<String>,
    pub href: Option<String>,
    pub price_text: Option<String>,
    #[serde(default)]
    pub sponsored: bool,
}

/// Normalize a price string to a number.
///
/// Strips everything but digits, `.`, `,` and `-`, splits on a range dash
/// taking the lower end, drops thousands separators, then parses.
pub fn parse_price_text(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    let lower = cleaned.split('-').next()?.replace(',', "");
    lower.parse::<f64>().ok()
}

/// Whether the raw markup carries an anti-bot challenge marker
pub fn is_blocked(html: &str, markers: &[String]) -> bool {
    let lower = html.to_lowercase();
    markers.iter().any(|m| lower.contains(m.as_str()))
}

/// Validate raw cards into products: reject sponsored cards, missing
/// titles/links, unparseable or non-positive prices and out-of-bound
/// prices, then sort ascending by price (stable, so ties keep page order).
pub fn refine_cards(cards: Vec<RawCard>, bound: &PriceBound) -> Vec<Product> {
    let mut products: Vec<Product> = cards
        .into_iter()
        .filter_map(|card| {
            if card.sponsored {
                return None;
            }

            let title = card.title?.trim().to_string();
            if title.is_empty() {
                return None;
            }

            let href = card.href?;
            if href.is_empty() {
                return None;
            }
            let link = if href.starts_with("http") {
                href
            } else {
                format!("{}{}", BASE_URL, href)
            };

            let price = parse_price_text(card.price_text.as_deref()?)?;
            if !price.is_finite() || price <= 0.0 {
                return None;
            }
            if !bound.contains(price) {
                return None;
            }

            Some(Product { title, link, price })
        })
        .collect();

    products.sort_by(|a, b| a.price.total_cmp(&b.price));
    products
}

/// Refine the primary card set, engaging the coarser fallback set only
/// when the primary yields zero valid products.
fn refine_with_fallback(
    primary: Vec<RawCard>,
    fallback: impl FnOnce() -> Vec<RawCard>,
    bound: &PriceBound,
) -> Vec<Product> {
    let products = refine_cards(primary, bound);
    if !products.is_empty() {
        return products;
    }

    log::debug!("Primary card set yielded nothing, trying fallback layout");
    refine_cards(fallback(), bound)
}

/// Extract products for `goal` from a fresh search-results navigation.
///
/// Always returns a list; an empty one is a normal terminal outcome (block
/// detected, no cards rendered, nothing valid) rather than a defect, with
/// diagnostics captured for later inspection.
pub fn extract_products(
    session: &BrowserSession,
    goal: &str,
    cfg: &SelectorConfig,
) -> Vec<Product> {
    match run_extraction(session, goal, cfg) {
        Ok(products) => products,
        Err(e) => {
            log::warn!("Extraction error: {}", e);
            capture_diagnostics(session, "debug_exception.png");
            Vec::new()
        }
    }
}

fn run_extraction(
    session: &BrowserSession,
    goal: &str,
    cfg: &SelectorConfig,
) -> Result<Vec<Product>> {
    log::info!("Starting extraction...");

    let (url, bound) = build_search_url(goal);
    log::info!("Navigating to: {}", url);
    session.navigate(&url)?;

    let html = session.content()?;
    if is_blocked(&html, &cfg.block_markers) {
        log::warn!("Anti-bot challenge detected, aborting extraction");
        save_markup(&html);
        save_screenshot(session, "debug_blocked.png");
        return Ok(Vec::new());
    }

    dismiss_overlays(session, cfg);

    session.wait_for(&cfg.results_container, RESULTS_WAIT)?;

    // Scroll to trigger lazy-loaded content
    log::debug!("Scrolling to load products...");
    for _ in 0..SCROLL_CYCLES {
        session.scroll_by(2000)?;
        thread::sleep(Duration::from_secs(1));
    }

    // Let prices render before querying cards
    thread::sleep(Duration::from_secs(3));
    session.wait_for(&cfg.price_ready, PRICE_WAIT)?;

    let mut found = 0;
    for attempt in 1..=CARD_POLLS {
        found = session.count_elements(&cfg.cards_primary)?;
        if found > 0 {
            log::info!("Found {} product containers on attempt {}", found, attempt);
            break;
        }
        log::debug!("Waiting for results... attempt {}", attempt);
        session.scroll_by(2500)?;
        thread::sleep(Duration::from_millis(1500));
    }

    if found == 0 {
        log::warn!("No visible product cards after {} attempts", CARD_POLLS);
        capture_diagnostics(session, "debug_no_cards.png");
        return Ok(Vec::new());
    }

    let primary = collect_cards(session, &cfg.cards_primary, cfg)?;
    let products = refine_with_fallback(
        primary,
        || {
            collect_cards(session, &cfg.cards_fallback, cfg).unwrap_or_else(|e| {
                log::debug!("Fallback card collection failed: {}", e);
                Vec::new()
            })
        },
        &bound,
    );

    if products.is_empty() {
        log::warn!("No valid products extracted after rendering");
        capture_diagnostics(session, "debug_no_products.png");
        return Ok(Vec::new());
    }

    log::info!("Extracted {} products", products.len());
    Ok(products)
}

/// Run the in-page card script against one card selector set
fn collect_cards(
    session: &BrowserSession,
    card_selector: &str,
    cfg: &SelectorConfig,
) -> Result<Vec<RawCard>> {
    let script_cfg = serde_json::json!({
        "cards": card_selector,
        "titles": cfg.card_titles,
        "links": cfg.card_links,
        "prices": cfg.card_prices,
        "whole": cfg.price_whole,
        "fraction": cfg.price_fraction,
        "symbol": cfg.price_symbol,
        "sponsored": cfg.sponsored_markers,
    });

    let script = CARDS_JS.replace("__CONFIG__", &script_cfg.to_string());
    let json = session.eval_string(&script)?;

    serde_json::from_str(&json)
        .map_err(|e| AgentError::ExtractionFailed(format!("Card payload did not parse: {}", e)))
}

/// Close known consent/location overlays. Best-effort, failures ignored.
fn dismiss_overlays(session: &BrowserSession, cfg: &SelectorConfig) {
    for sel in &cfg.overlay_dismissers {
        if session.wait_for(sel, OVERLAY_WAIT).is_ok() && session.click(sel).is_ok() {
            log::debug!("Closed overlay: {}", sel);
        }
    }
}

fn capture_diagnostics(session: &BrowserSession, screenshot_path: &str) {
    if let Ok(html) = session.content() {
        save_markup(&html);
    }
    save_screenshot(session, screenshot_path);
}

fn save_markup(html: &str) {
    if let Err(e) = std::fs::write(DEBUG_MARKUP_PATH, html) {
        log::debug!("Could not write {}: {}", DEBUG_MARKUP_PATH, e);
    }
}

fn save_screenshot(session: &BrowserSession, path: &str) {
    match session.screenshot() {
        Ok(png) => {
            if let Err(e) = std::fs::write(path, png) {
                log::debug!("Could not write {}: {}", path, e);
            }
        }
        Err(e) => log::debug!("Screenshot capture failed: {}", e),
    }
}
