//! # price-scout
//!
//! Product search and price extraction on Amazon via Chrome DevTools
//! Protocol (CDP), driven by an LLM-generated step plan that is revised
//! mid-run when a step fails.
//!
//! ## How a run works
//!
//! A *plan* is an ordered list of typed steps (`goto`, `wait_for`, `fill`,
//! `click`, `scroll`, `extract`). The [`plan::PlanExecutor`] interprets the
//! plan against a live page session, resolving selectors through
//! multi-tier fallback lists and harvesting validated product records. When
//! a step fails, the engine snapshots the page's interactive elements and
//! asks the configured [`plan::Replanner`] for a fresh plan, which replaces
//! the old one wholesale.
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use price_scout::agent;
//! use price_scout::browser::SessionConfig;
//!
//! # fn main() -> price_scout::Result<()> {
//! let config = SessionConfig::new().headless(true);
//!
//! // One-shot search with the deterministic fallback plan
//! let line = agent::search_product_price("wireless mouse", &config)?;
//! println!("{}", line);
//!
//! // Full planned run with LLM replanning (needs OPENAI_API_KEY)
//! let run = agent::run_planned_search("cheapest usb hub under $30", &config)?;
//! if let Some(best) = &run.result.selected {
//!     println!("Best match: ${:.2} - {}", best.price, best.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module overview
//!
//! - [`plan`]: step/plan types and the plan execution engine
//! - [`browser`]: browser session management and configuration
//! - [`price`]: price-constraint parsing and search-URL building
//! - [`selectors`]: selector candidate lists and page markers (pure data)
//! - [`resolve`]: multi-tier selector resolution
//! - [`extract`]: product extraction and validation
//! - [`snapshot`]: page context sampling for the planner
//! - [`planner`]: LLM plan generation with deterministic fallback
//! - [`agent`]: the assembled flows used by the CLI and the HTTP service
//! - [`error`]: error types and result alias

pub mod agent;
pub mod browser;
pub mod error;
pub mod extract;
pub mod plan;
pub mod planner;
pub mod price;
pub mod resolve;
pub mod selectors;
pub mod snapshot;

pub use agent::{PlannedRun, SessionDriver};
pub use browser::{BrowserSession, SessionConfig};
pub use error::{AgentError, Result};
pub use extract::Product;
pub use plan::{ExecutionResult, Plan, PlanExecutor, PlanSource, Replanner, Step, StepDriver};
pub use planner::LlmPlanner;
pub use price::PriceBound;
pub use selectors::SelectorConfig;
pub use snapshot::{ElementSample, PageContext};
