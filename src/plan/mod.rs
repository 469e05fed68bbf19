//! Plan and step types
//!
//! A plan is an ordered list of typed steps interpreted by the
//! [`engine`](crate::plan::engine). Steps are a closed tagged union rather
//! than open string-keyed records, so dispatch in the engine is exhaustive;
//! actions the planner emits that we do not recognize deserialize to
//! [`Step::Unknown`] and execute as logged no-ops instead of failing the
//! whole plan.

pub mod engine;

pub use engine::{ExecutionResult, PlanExecutor, Replanner, StepDriver};

use serde::{Deserialize, Serialize};

/// A single atomic step of a plan.
///
/// Wire format is internally tagged on `action`, matching the planner's
/// output: `{"action": "fill", "selector": "...", "value": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a URL and wait for the DOM to settle
    Goto { url: String },

    /// Block until a selector is visible, bounded timeout
    WaitFor { selector: String },

    /// Fill an input; `value` defaults to the overall goal when unset
    Fill {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    /// Click an element
    Click { selector: String },

    /// One scroll-and-settle cycle
    Scroll,

    /// Run the product extractor against the current page
    Extract,

    /// Any action we do not recognize; executed as a logged no-op
    #[serde(other)]
    Unknown,
}

impl Step {
    /// Short action name for logs and error messages
    pub fn action_name(&self) -> &'static str {
        match self {
            Step::Goto { .. } => "goto",
            Step::WaitFor { .. } => "wait_for",
            Step::Fill { .. } => "fill",
            Step::Click { .. } => "click",
            Step::Scroll => "scroll",
            Step::Extract => "extract",
            Step::Unknown => "unknown",
        }
    }
}

/// Where a plan came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    /// Supplied directly by the caller
    Caller,
    /// Generated by the LLM planner
    Llm,
    /// The deterministic fallback sequence
    Fallback,
    /// Produced by a mid-run replan
    Replan,
}

/// An ordered sequence of steps plus provenance.
///
/// Plans are immutable once handed to the engine; a replan replaces the
/// plan wholesale, it never patches one in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<Step>,
    pub source: PlanSource,
}

impl Plan {
    pub fn new(steps: Vec<Step>, source: PlanSource) -> Self {
        Self { steps, source }
    }

    /// The fixed default search flow for the target site, used whenever the
    /// planner cannot produce anything better.
    pub fn fallback(goal: &str) -> Self {
        Self::new(
            vec![
                Step::Goto {
                    url: "https://www.amazon.com".to_string(),
                },
                Step::WaitFor {
                    selector: "#twotabsearchtextbox".to_string(),
                },
                Step::Fill {
                    selector: "#twotabsearchtextbox".to_string(),
                    value: Some(goal.to_string()),
                },
                Step::Click {
                    selector: "#nav-search-submit-button".to_string(),
                },
                Step::WaitFor {
                    selector: "div[data-component-type='s-search-result']".to_string(),
                },
                Step::Extract,
            ],
            PlanSource::Fallback,
        )
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
