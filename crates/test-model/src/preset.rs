use abacus_model::{ModelFinishReason, ToolCallRequest};
use serde::{Deserialize, Serialize};

/// The preset response for an assistant step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetTurn {
    /// The assistant text, if any.
    pub content: Option<String>,
    /// Operation requests the turn carries.
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRequest>,
    /// If set, the request will fail in the first `failures` attempts.
    /// `Some(0)` means the request will fail infinitely.
    pub failures: Option<u64>,
}

impl PresetTurn {
    /// Creates a text-only preset turn.
    #[inline]
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: vec![],
            failures: None,
        }
    }

    /// Creates a preset turn that requests the given operations.
    #[inline]
    pub fn calls(tool_calls: impl Into<Vec<ToolCallRequest>>) -> Self {
        Self {
            content: None,
            tool_calls: tool_calls.into(),
            failures: None,
        }
    }

    /// Sets failure times before a successful response. `0` means the
    /// response will always be a failure.
    #[inline]
    pub fn with_failures(mut self, failures: u64) -> Self {
        self.failures = Some(failures);
        self
    }

    pub(crate) fn finish_reason(&self) -> ModelFinishReason {
        if self.tool_calls.is_empty() {
            ModelFinishReason::Stop
        } else {
            ModelFinishReason::ToolCalls
        }
    }
}
