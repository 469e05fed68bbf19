use thiserror::Error;

/// Errors that can occur during browser automation and plan execution
#[derive(Debug, Error)]
pub enum AgentError {
    /// Failed to launch the browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Navigation to a URL failed or timed out
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// No element matched a selector within its timeout
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// In-page JavaScript evaluation failed
    #[error("Script evaluation failed: {0}")]
    EvalFailed(String),

    /// Product extraction produced no usable results
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// The external planner could not produce a plan
    #[error("Planner failed: {0}")]
    PlannerFailed(String),

    /// A plan step could not be completed
    #[error("Step '{action}' failed: {reason}")]
    StepFailed { action: String, reason: String },
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, AgentError>;
