use std::time::Duration;

/// Controller limits, passed explicitly at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Maximum number of Reason transitions per query. The controller
    /// fails closed when the cap is reached without a final answer.
    pub max_steps: u32,
    /// Timeout for a single model consultation attempt.
    pub model_timeout: Duration,
    /// Timeout for a single operation invocation.
    pub tool_timeout: Duration,
    /// Total time budget for retrying transient model failures.
    pub retry_budget: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_steps: 8,
            model_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(10),
            retry_budget: Duration::from_secs(30),
        }
    }
}
