//! LLM-backed plan generation
//!
//! Turns `(goal, page context)` into a [`Plan`] by prompting an OpenAI
//! chat model for a JSON step array. The model's output is treated as
//! hostile input: markdown fences are stripped, malformed JSON is repaired
//! by slicing the bracketed array, loose keys (`target` vs `selector`) are
//! normalized, and any failure at all (missing API key, HTTP error,
//! unparseable output, empty step list) substitutes the deterministic
//! fallback plan instead of propagating an error.

use crate::error::{AgentError, Result};
use crate::plan::{Plan, PlanSource, Replanner, Step};
use crate::snapshot::PageContext;
use serde::Deserialize;
use serde_json::json;

/// Model used when `OPENAI_MODEL` is unset
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are a web automation planner. \
Given a user's plain English goal and structured webpage context, \
determine the user's intent (search, filter, extract, buy, click, etc.), \
and output ONLY a valid JSON array of step-by-step actions to achieve that goal. \
Each object must include 'action' and 'selector' or 'target'. \
Supported actions: 'goto', 'wait_for', 'fill', 'click', 'scroll', 'extract'. \
If the action is 'fill', include a 'value'. \
Prefer simple, stable CSS selectors that match the context. \
If the goal refers to Amazon, use these selectors where possible: \
#twotabsearchtextbox (search box), #nav-search-submit-button (search button), \
div[data-component-type='s-search-result'] (product container). \
No explanations, markdown, or natural text. Output pure JSON only.";

/// A step as the model emits it, before normalization
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStep {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Normalize raw planner output into typed steps: `target` doubles as
/// `selector`, a `goto` selector is the URL, and a `fill` without a value
/// gets the goal.
pub fn normalize_steps(raw: Vec<RawStep>, goal: &str) -> Vec<Step> {
    raw.into_iter()
        .map(|r| {
            let selector = r.selector.or(r.target).unwrap_or_default();
            match r.action.as_str() {
                "goto" => Step::Goto { url: selector },
                "wait_for" => Step::WaitFor { selector },
                "fill" => Step::Fill {
                    selector,
                    value: r.value.or_else(|| Some(goal.to_string())),
                },
                "click" => Step::Click { selector },
                "scroll" => Step::Scroll,
                "extract" => Step::Extract,
                other => {
                    log::warn!("Planner emitted unknown action '{}'", other);
                    Step::Unknown
                }
            }
        })
        .collect()
}

/// Parse a model response into raw steps, repairing common damage
pub fn parse_plan_payload(text: &str) -> Option<Vec<RawStep>> {
    let mut cleaned = text.trim();
    cleaned = cleaned
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    if let Ok(steps) = serde_json::from_str(cleaned) {
        return Some(steps);
    }

    // Recover the bracketed array from output with prose around it
    let start = cleaned.find('[')?;
    let end = cleaned.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&cleaned[start..=end]).ok()
}

/// Planner backed by the OpenAI chat completions API.
///
/// Works without an API key too: every plan request then resolves to the
/// deterministic fallback plan.
pub struct LlmPlanner {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    model: String,
}

impl LlmPlanner {
    /// Build a planner from `OPENAI_API_KEY` / `OPENAI_MODEL`
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        if api_key.is_none() {
            log::warn!("OPENAI_API_KEY not set; planner will use the fallback plan");
        }

        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Self {
            client: reqwest::blocking::Client::new(),
            api_key,
            model,
        }
    }

    /// Generate a plan for the goal. Never fails; the fallback plan covers
    /// every degraded path.
    pub fn plan(&self, goal: &str, context: &PageContext) -> Plan {
        match self.request_plan(goal, context) {
            Ok(steps) if !steps.is_empty() => Plan::new(steps, PlanSource::Llm),
            Ok(_) => {
                log::warn!("Planner returned no steps, using fallback plan");
                Plan::fallback(goal)
            }
            Err(e) => {
                log::warn!("Planner error ({}), using fallback plan", e);
                Plan::fallback(goal)
            }
        }
    }

    fn request_plan(&self, goal: &str, context: &PageContext) -> Result<Vec<Step>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| AgentError::PlannerFailed("OPENAI_API_KEY not set".to_string()))?;

        let samples = serde_json::to_string_pretty(&context.element_samples)
            .map_err(|e| AgentError::PlannerFailed(format!("Context did not serialize: {}", e)))?;

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": format!(
                    "User Goal: {}\n\nWebpage Context (simplified elements):\n{}\n\n\
                     Output a JSON array of actions using only these keys: action, selector, target, value.",
                    goal, samples
                )},
            ],
            "temperature": 0.3,
        });

        let response = self
            .client
            .post(OPENAI_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|e| AgentError::PlannerFailed(format!("Request failed: {}", e)))?;

        let status = response.status();
        let payload: serde_json::Value = response
            .json()
            .map_err(|e| AgentError::PlannerFailed(format!("Bad response body: {}", e)))?;

        if !status.is_success() {
            let msg = payload["error"]["message"]
                .as_str()
                .unwrap_or("unknown API error");
            return Err(AgentError::PlannerFailed(format!(
                "API error ({}): {}",
                status, msg
            )));
        }

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AgentError::PlannerFailed("No content in response".to_string()))?;
        log::debug!("Raw planner response: {}", content);

        let raw = parse_plan_payload(content).ok_or_else(|| {
            AgentError::PlannerFailed("Could not recover a JSON step array".to_string())
        })?;

        Ok(normalize_steps(raw, goal))
    }
}

impl Replanner for LlmPlanner {
    fn replan(&mut self, goal: &str, context: &PageContext) -> Result<Plan> {
        let mut plan = self.plan(goal, context);
        plan.source = PlanSource::Replan;
        Ok(plan)
    }
}
