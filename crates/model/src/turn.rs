use serde::{Deserialize, Serialize};

use crate::request::ToolCallRequest;

/// The reason why a model turn has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model needs one or more operations to be invoked.
    ToolCalls,
    /// The model has finished generating text.
    Stop,
}

/// A complete assistant turn from the model provider.
///
/// Providers return whole turns rather than token streams: the
/// controller only ever acts on a finished turn, so there is nothing to
/// gain from exposing deltas at this seam.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelTurn {
    /// The assistant text, if any.
    pub content: Option<String>,
    /// Operation requests, in the order the model emitted them.
    pub tool_calls: Vec<ToolCallRequest>,
    /// Why the turn ended.
    pub finish_reason: ModelFinishReason,
}

impl ModelTurn {
    /// Creates a text-only turn.
    #[inline]
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: vec![],
            finish_reason: ModelFinishReason::Stop,
        }
    }

    /// Creates a turn that requests the given operations.
    #[inline]
    pub fn calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: None,
            tool_calls,
            finish_reason: ModelFinishReason::ToolCalls,
        }
    }
}
