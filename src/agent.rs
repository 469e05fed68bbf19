//! High-level flows
//!
//! [`SessionDriver`] binds the engine's step dispatch to a live browser
//! session, and the two entry points mirror the two ways the agent is
//! used: a planned run with LLM replanning (the service path) and a
//! one-shot fallback-plan search with no replanning (the CLI path).

use crate::browser::{BrowserSession, SessionConfig};
use crate::error::{AgentError, Result};
use crate::extract::{self, Product};
use crate::plan::{ExecutionResult, Plan, PlanExecutor, StepDriver};
use crate::planner::LlmPlanner;
use crate::resolve;
use crate::selectors::SelectorConfig;
use crate::snapshot::{self, PageContext};
use serde::Serialize;
use std::thread;
use std::time::{Duration, Instant};

const WAIT_FOR_TIMEOUT: Duration = Duration::from_secs(30);
const GOTO_SETTLE: Duration = Duration::from_secs(2);
const SCROLL_SETTLE: Duration = Duration::from_secs(2);

/// [`StepDriver`] over an exclusively-owned browser session.
///
/// Dropping the driver drops the session, so the page is released on every
/// exit path of a run.
pub struct SessionDriver {
    session: BrowserSession,
    selectors: SelectorConfig,
}

impl SessionDriver {
    pub fn new(session: BrowserSession, selectors: SelectorConfig) -> Self {
        Self { session, selectors }
    }

    pub fn session(&self) -> &BrowserSession {
        &self.session
    }
}

impl StepDriver for SessionDriver {
    fn goto(&mut self, url: &str) -> Result<()> {
        self.session.navigate(url)?;
        thread::sleep(GOTO_SETTLE);
        Ok(())
    }

    fn wait_for(&mut self, selector: &str) -> Result<()> {
        self.session.wait_for(selector, WAIT_FOR_TIMEOUT)
    }

    fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        if resolve::resolve_fill(&self.session, selector, value, &self.selectors) {
            Ok(())
        } else {
            Err(AgentError::StepFailed {
                action: "fill".to_string(),
                reason: format!("no candidate for '{}' accepted input", selector),
            })
        }
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        if resolve::resolve_click(&self.session, selector, &self.selectors) {
            Ok(())
        } else {
            Err(AgentError::StepFailed {
                action: "click".to_string(),
                reason: format!("no candidate for '{}' was clickable", selector),
            })
        }
    }

    fn scroll(&mut self) -> Result<()> {
        self.session.scroll_by(2000)?;
        thread::sleep(SCROLL_SETTLE);
        Ok(())
    }

    fn extract(&mut self, goal: &str) -> Result<Vec<Product>> {
        Ok(extract::extract_products(&self.session, goal, &self.selectors))
    }

    fn snapshot(&mut self) -> PageContext {
        snapshot::capture(&self.session)
    }
}

/// Wall-clock seconds spent per phase of a planned run
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PhaseTimings {
    pub context_extraction: f64,
    pub plan_generation: f64,
    pub execution: f64,
}

fn elapsed_secs(start: Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 100.0).round() / 100.0
}

/// Outcome of a planned run
#[derive(Debug, Clone, Serialize)]
pub struct PlannedRun {
    pub plan: Plan,
    pub result: ExecutionResult,
    pub timings: PhaseTimings,
}

/// Full agent flow: open the target site, snapshot it, ask the planner for
/// a plan, then execute it with the planner wired in as the replanning
/// callback.
pub fn run_planned_search(goal: &str, config: &SessionConfig) -> Result<PlannedRun> {
    let mut planner = LlmPlanner::from_env();
    let mut timings = PhaseTimings::default();

    let session = BrowserSession::launch(config)?;

    let start = Instant::now();
    session.navigate(extract::BASE_URL)?;
    let context = snapshot::capture(&session);
    timings.context_extraction = elapsed_secs(start);

    let start = Instant::now();
    let plan = planner.plan(goal, &context);
    timings.plan_generation = elapsed_secs(start);
    log::info!("Plan ready: {} steps ({:?})", plan.len(), plan.source);

    let mut driver = SessionDriver::new(session, SelectorConfig::default());
    let start = Instant::now();
    let result = PlanExecutor::new(goal)
        .with_replanner(&mut planner)
        .run(&mut driver, plan.clone());
    timings.execution = elapsed_secs(start);

    Ok(PlannedRun {
        plan,
        result,
        timings,
    })
}

/// One-shot search: run the fixed fallback plan with no replanning and
/// report a human-readable result line.
pub fn search_product_price(product: &str, config: &SessionConfig) -> Result<String> {
    let session = BrowserSession::launch(config)?;
    let mut driver = SessionDriver::new(session, SelectorConfig::default());

    let result = PlanExecutor::new(product).run(&mut driver, Plan::fallback(product));

    match result.selected {
        Some(p) => Ok(format!("Success! Found '{}' for ${:.2}", p.title, p.price)),
        None if result.errors.is_empty() => {
            Ok(format!("No search results found for '{}'.", product))
        }
        None => Ok(format!(
            "No result for '{}': {}",
            product,
            result.errors.join("; ")
        )),
    }
}
