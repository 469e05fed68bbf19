//! price-scout HTTP service
//!
//! Exposes the two agent flows over HTTP:
//! - `POST /run-core`: one-shot search with the fallback plan
//! - `POST /run-ai`:   planned run with LLM replanning
//!
//! Every response is structured JSON with a `status` of `completed`,
//! `planned` or `error`; the engine never throws, and a top-level guard
//! converts anything that escapes anyway (including panics in the blocking
//! task) into an `error` response carrying the fault.

use axum::routing::post;
use axum::{Json, Router};
use price_scout::agent::{self, PhaseTimings};
use price_scout::browser::SessionConfig;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
struct RunRequest {
    goal: String,

    #[serde(default = "default_headless")]
    headless: bool,
}

fn default_headless() -> bool {
    true
}

fn error_response(goal: &str, message: &str, traceback: String) -> Json<Value> {
    Json(json!({
        "status": "error",
        "message": message,
        "trace": {
            "goal": goal,
            "errors": [message],
            "traceback": traceback,
        },
    }))
}

async fn run_core(Json(req): Json<RunRequest>) -> Json<Value> {
    let goal = req.goal.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        let config = SessionConfig::new().headless(req.headless);
        agent::search_product_price(&req.goal, &config)
    })
    .await;

    match outcome {
        Ok(Ok(result)) => Json(json!({
            "status": "completed",
            "result": result,
        })),
        Ok(Err(e)) => error_response(&goal, &format!("Fatal error: {}", e), format!("{:?}", e)),
        Err(e) => error_response(&goal, "Run panicked", e.to_string()),
    }
}

async fn run_ai(Json(req): Json<RunRequest>) -> Json<Value> {
    let goal = req.goal.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        let config = SessionConfig::new().headless(req.headless);
        agent::run_planned_search(&req.goal, &config)
    })
    .await;

    let run = match outcome {
        Ok(Ok(run)) => run,
        Ok(Err(e)) => {
            return error_response(&goal, &format!("Fatal error: {}", e), format!("{:?}", e));
        }
        Err(e) => return error_response(&goal, "Run panicked", e.to_string()),
    };

    if run.plan.is_empty() {
        return Json(json!({
            "status": "planned",
            "plan": [],
            "result": "Planner returned no steps.",
        }));
    }

    Json(json!({
        "status": "completed",
        "plan": run.plan,
        "result": run.result,
        "trace": trace(&goal, run.timings, &run.result.errors),
    }))
}

fn trace(goal: &str, timings: PhaseTimings, errors: &[String]) -> Value {
    json!({
        "goal": goal,
        "timestamps": timings,
        "errors": errors,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let app = Router::new()
        .route("/run-core", post(run_core))
        .route("/run-ai", post(run_ai));

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("price-scout service listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
