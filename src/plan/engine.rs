//! Plan execution engine
//!
//! Interprets an ordered list of [`Step`]s against a live page, delegating
//! the actual page work to a [`StepDriver`]. Any step failure enters the
//! replanning path: a fresh context snapshot is taken and the configured
//! [`Replanner`] is asked for a new plan, which replaces the current one
//! wholesale (execution restarts at step 0). The engine always returns a
//! structured [`ExecutionResult`]; no fault propagates past its boundary.

use crate::error::{AgentError, Result};
use crate::extract::Product;
use crate::plan::{Plan, PlanSource, Step};
use crate::snapshot::PageContext;
use serde::Serialize;

/// Default cap on mid-run replans. Without a cap a planner that keeps
/// producing plans that fail at step 0 would loop forever.
pub const DEFAULT_MAX_REPLANS: usize = 5;

/// The page operations a plan step can dispatch to.
///
/// The real implementation drives a live browser session; tests use
/// scripted stubs.
pub trait StepDriver {
    /// Navigate to a URL and wait for a DOM-ready condition
    fn goto(&mut self, url: &str) -> Result<()>;

    /// Block until a selector is visible, bounded timeout
    fn wait_for(&mut self, selector: &str) -> Result<()>;

    /// Fill an input, multi-tier selector fallback
    fn fill(&mut self, selector: &str, value: &str) -> Result<()>;

    /// Click an element, multi-tier selector fallback
    fn click(&mut self, selector: &str) -> Result<()>;

    /// One scroll-and-settle cycle
    fn scroll(&mut self) -> Result<()>;

    /// Run the product extractor against the current page.
    /// An empty list is a normal outcome here; the engine turns it into a
    /// step failure.
    fn extract(&mut self, goal: &str) -> Result<Vec<Product>>;

    /// Sample the current page for the replanner. Best-effort; never fails.
    fn snapshot(&mut self) -> PageContext;
}

/// External replanning capability: `(goal, context) -> Plan`.
///
/// Failure and timeout handling belong to the implementor; the engine only
/// distinguishes "non-empty plan" from "no plan".
pub trait Replanner {
    fn replan(&mut self, goal: &str, context: &PageContext) -> Result<Plan>;
}

/// Accumulated outcome of one plan execution
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionResult {
    /// All products recorded by the last successful extract step
    pub data: Vec<Product>,

    /// The cheapest extracted product
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Product>,

    /// Failures that aborted the run; empty on success
    pub errors: Vec<String>,
}

/// Executes a plan step by step against a [`StepDriver`].
pub struct PlanExecutor<'a> {
    goal: String,
    replanner: Option<&'a mut dyn Replanner>,
    max_replans: usize,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            replanner: None,
            max_replans: DEFAULT_MAX_REPLANS,
        }
    }

    /// Builder method: configure the replanning callback
    pub fn with_replanner(mut self, replanner: &'a mut dyn Replanner) -> Self {
        self.replanner = Some(replanner);
        self
    }

    /// Builder method: cap the number of mid-run replans
    pub fn max_replans(mut self, max: usize) -> Self {
        self.max_replans = max;
        self
    }

    /// Run the plan to a terminal state.
    ///
    /// Terminates when the step index reaches the plan length (success), or
    /// when a failure cannot be replanned away (abort, recorded in
    /// `errors`). Never returns an error.
    pub fn run<D: StepDriver>(mut self, driver: &mut D, mut plan: Plan) -> ExecutionResult {
        let mut result = ExecutionResult::default();
        let mut step_idx = 0;
        let mut replans_used = 0;

        while step_idx < plan.steps.len() {
            let step = plan.steps[step_idx].clone();
            log::info!(
                "Step {}/{}: {}",
                step_idx + 1,
                plan.len(),
                step.action_name()
            );

            match self.run_step(driver, &step, &mut result) {
                Ok(()) => {
                    step_idx += 1;
                }
                Err(e) => {
                    log::warn!("Step '{}' failed: {}", step.action_name(), e);

                    let Some(replanner) = self.replanner.as_deref_mut() else {
                        result.errors.push(e.to_string());
                        break;
                    };

                    if replans_used >= self.max_replans {
                        result
                            .errors
                            .push(format!("replan limit exceeded ({})", self.max_replans));
                        break;
                    }
                    replans_used += 1;

                    log::info!("Replanning from updated page context...");
                    let context = driver.snapshot();
                    match replanner.replan(&self.goal, &context) {
                        Ok(new_plan) if !new_plan.is_empty() => {
                            log::info!("New plan received ({} steps)", new_plan.len());
                            plan = Plan::new(new_plan.steps, PlanSource::Replan);
                            step_idx = 0;
                        }
                        Ok(_) => {
                            result
                                .errors
                                .push("No steps generated during replan.".to_string());
                            break;
                        }
                        Err(re) => {
                            result.errors.push(format!("Replanning failed: {}", re));
                            break;
                        }
                    }
                }
            }
        }

        result
    }

    fn run_step<D: StepDriver>(
        &self,
        driver: &mut D,
        step: &Step,
        result: &mut ExecutionResult,
    ) -> Result<()> {
        match step {
            Step::Goto { url } => driver.goto(url),
            Step::WaitFor { selector } => driver.wait_for(selector),
            Step::Fill { selector, value } => {
                driver.fill(selector, value.as_deref().unwrap_or(&self.goal))
            }
            Step::Click { selector } => driver.click(selector),
            Step::Scroll => driver.scroll(),
            Step::Extract => {
                let products = driver.extract(&self.goal)?;
                if products.is_empty() {
                    return Err(AgentError::ExtractionFailed(
                        "no products extracted".to_string(),
                    ));
                }

                let selected = products
                    .iter()
                    .min_by(|a, b| a.price.total_cmp(&b.price))
                    .cloned();
                if let Some(ref best) = selected {
                    log::info!("Best match: ${:.2} - {}", best.price, best.title);
                }

                result.selected = selected;
                result.data = products;
                Ok(())
            }
            Step::Unknown => {
                log::warn!("Unrecognized action, treating as no-op");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Driver that records dispatched actions and never fails
    #[derive(Default)]
    struct RecordingDriver {
        calls: Vec<String>,
    }

    impl StepDriver for RecordingDriver {
        fn goto(&mut self, url: &str) -> Result<()> {
            self.calls.push(format!("goto {}", url));
            Ok(())
        }

        fn wait_for(&mut self, selector: &str) -> Result<()> {
            self.calls.push(format!("wait_for {}", selector));
            Ok(())
        }

        fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
            self.calls.push(format!("fill {} = {}", selector, value));
            Ok(())
        }

        fn click(&mut self, selector: &str) -> Result<()> {
            self.calls.push(format!("click {}", selector));
            Ok(())
        }

        fn scroll(&mut self) -> Result<()> {
            self.calls.push("scroll".to_string());
            Ok(())
        }

        fn extract(&mut self, _goal: &str) -> Result<Vec<Product>> {
            self.calls.push("extract".to_string());
            Ok(vec![Product {
                title: "Widget".to_string(),
                link: "https://www.amazon.com/dp/X".to_string(),
                price: 9.99,
            }])
        }

        fn snapshot(&mut self) -> PageContext {
            PageContext::default()
        }
    }

    #[test]
    fn test_fill_value_defaults_to_goal() {
        let mut driver = RecordingDriver::default();
        let plan = Plan::new(
            vec![Step::Fill {
                selector: "#q".to_string(),
                value: None,
            }],
            PlanSource::Caller,
        );

        let result = PlanExecutor::new("cheap socks").run(&mut driver, plan);

        assert!(result.errors.is_empty());
        assert_eq!(driver.calls, vec!["fill #q = cheap socks"]);
    }

    #[test]
    fn test_steps_run_in_order() {
        let mut driver = RecordingDriver::default();
        let plan = Plan::fallback("hat");

        let result = PlanExecutor::new("hat").run(&mut driver, plan);

        assert!(result.errors.is_empty());
        assert_eq!(driver.calls.len(), 6);
        assert!(driver.calls[0].starts_with("goto "));
        assert_eq!(driver.calls[5], "extract");
        assert_eq!(result.selected.as_ref().map(|p| p.price), Some(9.99));
    }

    #[test]
    fn test_selected_is_cheapest_on_tie() {
        struct TieDriver;
        impl StepDriver for TieDriver {
            fn goto(&mut self, _: &str) -> Result<()> {
                Ok(())
            }
            fn wait_for(&mut self, _: &str) -> Result<()> {
                Ok(())
            }
            fn fill(&mut self, _: &str, _: &str) -> Result<()> {
                Ok(())
            }
            fn click(&mut self, _: &str) -> Result<()> {
                Ok(())
            }
            fn scroll(&mut self) -> Result<()> {
                Ok(())
            }
            fn extract(&mut self, _: &str) -> Result<Vec<Product>> {
                Ok(vec![
                    Product {
                        title: "First".to_string(),
                        link: "https://www.amazon.com/dp/A".to_string(),
                        price: 5.0,
                    },
                    Product {
                        title: "Second".to_string(),
                        link: "https://www.amazon.com/dp/B".to_string(),
                        price: 5.0,
                    },
                ])
            }
            fn snapshot(&mut self) -> PageContext {
                PageContext::default()
            }
        }

        let result = PlanExecutor::new("x").run(
            &mut TieDriver,
            Plan::new(vec![Step::Extract], PlanSource::Caller),
        );

        // First minimal element wins the tie
        assert_eq!(result.selected.unwrap().title, "First");
    }
}
