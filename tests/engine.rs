//! Plan engine state-machine tests against scripted stub drivers.
//!
//! The engine's seams ([`StepDriver`], [`Replanner`]) make every failure
//! and recovery path reachable without a browser.

use price_scout::error::{AgentError, Result};
use price_scout::extract::Product;
use price_scout::plan::{Plan, PlanExecutor, PlanSource, Replanner, Step, StepDriver};
use price_scout::snapshot::PageContext;
use std::collections::VecDeque;

fn product(title: &str, price: f64) -> Product {
    Product {
        title: title.to_string(),
        link: "https://www.amazon.com/dp/TEST".to_string(),
        price,
    }
}

fn step_failure(action: &str) -> AgentError {
    AgentError::StepFailed {
        action: action.to_string(),
        reason: "scripted failure".to_string(),
    }
}

/// Driver that fails on configured selectors and serves extraction
/// outcomes from a queue (an empty queue entry models "no products").
#[derive(Default)]
struct ScriptedDriver {
    failing_selectors: Vec<String>,
    extract_outcomes: VecDeque<Vec<Product>>,
    calls: Vec<String>,
    snapshots: usize,
}

impl ScriptedDriver {
    fn failing(selectors: &[&str]) -> Self {
        Self {
            failing_selectors: selectors.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn outcome(&mut self, action: &str, selector: &str) -> Result<()> {
        self.calls.push(format!("{}:{}", action, selector));
        if self.failing_selectors.iter().any(|s| s == selector) {
            Err(step_failure(action))
        } else {
            Ok(())
        }
    }
}

impl StepDriver for ScriptedDriver {
    fn goto(&mut self, url: &str) -> Result<()> {
        self.outcome("goto", url)
    }

    fn wait_for(&mut self, selector: &str) -> Result<()> {
        self.outcome("wait_for", selector)
    }

    fn fill(&mut self, selector: &str, _value: &str) -> Result<()> {
        self.outcome("fill", selector)
    }

    fn click(&mut self, selector: &str) -> Result<()> {
        self.outcome("click", selector)
    }

    fn scroll(&mut self) -> Result<()> {
        self.calls.push("scroll".to_string());
        Ok(())
    }

    fn extract(&mut self, _goal: &str) -> Result<Vec<Product>> {
        self.calls.push("extract".to_string());
        Ok(self.extract_outcomes.pop_front().unwrap_or_default())
    }

    fn snapshot(&mut self) -> PageContext {
        self.snapshots += 1;
        PageContext::default()
    }
}

/// Replanner that hands out queued plans, then empty ones
#[derive(Default)]
struct QueuedReplanner {
    plans: VecDeque<Plan>,
    calls: usize,
}

impl QueuedReplanner {
    fn with(plans: Vec<Plan>) -> Self {
        Self {
            plans: plans.into(),
            calls: 0,
        }
    }
}

impl Replanner for QueuedReplanner {
    fn replan(&mut self, _goal: &str, _context: &PageContext) -> Result<Plan> {
        self.calls += 1;
        Ok(self
            .plans
            .pop_front()
            .unwrap_or_else(|| Plan::new(Vec::new(), PlanSource::Replan)))
    }
}

struct ErroringReplanner;

impl Replanner for ErroringReplanner {
    fn replan(&mut self, _goal: &str, _context: &PageContext) -> Result<Plan> {
        Err(AgentError::PlannerFailed("scripted planner outage".to_string()))
    }
}

fn search_plan() -> Plan {
    Plan::new(
        vec![
            Step::Goto {
                url: "https://www.amazon.com".to_string(),
            },
            Step::WaitFor {
                selector: "#twotabsearchtextbox".to_string(),
            },
            Step::Fill {
                selector: "#twotabsearchtextbox".to_string(),
                value: None,
            },
            Step::Click {
                selector: "#nav-search-submit-button".to_string(),
            },
            Step::Extract,
        ],
        PlanSource::Caller,
    )
}

#[test]
fn failed_extract_recovers_through_replan() {
    let mut driver = ScriptedDriver::default();
    // First extract comes back empty (a step failure), the replanned one succeeds
    driver.extract_outcomes = VecDeque::from(vec![Vec::new(), vec![product("Widget", 12.5)]]);

    let mut replanner =
        QueuedReplanner::with(vec![Plan::new(vec![Step::Extract], PlanSource::Replan)]);

    let result = PlanExecutor::new("widget")
        .with_replanner(&mut replanner)
        .run(&mut driver, search_plan());

    assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    assert_eq!(result.selected.as_ref().map(|p| p.title.as_str()), Some("Widget"));
    assert_eq!(result.data.len(), 1);
    assert_eq!(replanner.calls, 1);
    assert_eq!(driver.snapshots, 1, "one fresh snapshot per replan");
}

#[test]
fn failure_without_replanner_aborts_with_one_error() {
    let mut driver = ScriptedDriver::failing(&["#nav-search-submit-button"]);

    let result = PlanExecutor::new("widget").run(&mut driver, search_plan());

    assert_eq!(result.errors.len(), 1);
    assert!(result.selected.is_none());
    assert!(result.data.is_empty());
    // Execution stopped at the failing click; extract never ran
    assert!(!driver.calls.iter().any(|c| c == "extract"));
}

#[test]
fn unknown_action_is_a_noop() {
    let mut driver = ScriptedDriver::default();
    driver.extract_outcomes = VecDeque::from(vec![vec![product("Widget", 3.0)]]);

    let plan = Plan::new(vec![Step::Unknown, Step::Extract], PlanSource::Caller);
    let result = PlanExecutor::new("widget").run(&mut driver, plan);

    assert!(result.errors.is_empty());
    assert!(result.selected.is_some());
}

#[test]
fn replan_replaces_plan_wholesale_from_step_zero() {
    let mut driver = ScriptedDriver::failing(&["#broken"]);
    driver.extract_outcomes = VecDeque::from(vec![vec![product("Widget", 9.0)]]);

    let failing_plan = Plan::new(
        vec![
            Step::Goto {
                url: "https://www.amazon.com".to_string(),
            },
            Step::Click {
                selector: "#broken".to_string(),
            },
        ],
        PlanSource::Caller,
    );
    let recovery_plan = Plan::new(
        vec![
            Step::Goto {
                url: "https://www.amazon.com/s?k=widget".to_string(),
            },
            Step::Extract,
        ],
        PlanSource::Replan,
    );

    let mut replanner = QueuedReplanner::with(vec![recovery_plan]);
    let result = PlanExecutor::new("widget")
        .with_replanner(&mut replanner)
        .run(&mut driver, failing_plan);

    assert!(result.errors.is_empty());
    // The new plan ran from its own first step, not from the failed index
    assert_eq!(
        driver.calls,
        vec![
            "goto:https://www.amazon.com",
            "click:#broken",
            "goto:https://www.amazon.com/s?k=widget",
            "extract",
        ]
    );
}

#[test]
fn empty_replan_aborts_with_diagnostic() {
    let mut driver = ScriptedDriver::failing(&["#broken"]);
    let plan = Plan::new(
        vec![Step::Click {
            selector: "#broken".to_string(),
        }],
        PlanSource::Caller,
    );

    let mut replanner = QueuedReplanner::default();
    let result = PlanExecutor::new("widget")
        .with_replanner(&mut replanner)
        .run(&mut driver, plan);

    assert_eq!(result.errors, vec!["No steps generated during replan.".to_string()]);
    assert!(result.selected.is_none());
}

#[test]
fn erroring_replanner_aborts() {
    let mut driver = ScriptedDriver::failing(&["#broken"]);
    let plan = Plan::new(
        vec![Step::Click {
            selector: "#broken".to_string(),
        }],
        PlanSource::Caller,
    );

    let result = PlanExecutor::new("widget")
        .with_replanner(&mut ErroringReplanner)
        .run(&mut driver, plan);

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("scripted planner outage"));
}

#[test]
fn replan_limit_bounds_a_planner_that_never_gives_up() {
    let mut driver = ScriptedDriver::failing(&["#broken"]);
    let doomed = Plan::new(
        vec![Step::Click {
            selector: "#broken".to_string(),
        }],
        PlanSource::Caller,
    );

    // Always returns another copy of the same doomed plan
    struct StubbornReplanner {
        calls: usize,
    }
    impl Replanner for StubbornReplanner {
        fn replan(&mut self, _goal: &str, _context: &PageContext) -> Result<Plan> {
            self.calls += 1;
            Ok(Plan::new(
                vec![Step::Click {
                    selector: "#broken".to_string(),
                }],
                PlanSource::Replan,
            ))
        }
    }

    let mut replanner = StubbornReplanner { calls: 0 };
    let result = PlanExecutor::new("widget")
        .with_replanner(&mut replanner)
        .max_replans(3)
        .run(&mut driver, doomed);

    assert_eq!(replanner.calls, 3);
    assert_eq!(result.errors, vec!["replan limit exceeded (3)".to_string()]);
}
