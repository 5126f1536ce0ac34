use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelRequest {
    /// The input messages.
    pub messages: Vec<ModelMessage>,
    /// Operations that are available to the model.
    pub tools: Vec<ModelTool>,
}

/// One turn in the conversation history.
///
/// The history is append-only: turns are never mutated in place, only
/// extended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ModelMessage {
    /// The system instructions.
    System {
        /// The instruction text.
        content: String,
    },
    /// A user input text.
    User {
        /// The input text.
        content: String,
    },
    /// An assistant turn, possibly carrying operation requests.
    Assistant {
        /// The assistant text, if any.
        content: Option<String>,
        /// Operations the assistant wants to invoke, in request order.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallRequest>,
    },
    /// The result of a single operation invocation.
    Tool(ToolCallResult),
}

impl ModelMessage {
    /// Creates a user message.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        ModelMessage::User {
            content: content.into(),
        }
    }

    /// Creates a system message.
    #[inline]
    pub fn system<S: Into<String>>(content: S) -> Self {
        ModelMessage::System {
            content: content.into(),
        }
    }

    /// Returns the operation requests carried by this message.
    ///
    /// Only assistant messages can carry requests; for every other role
    /// this returns an empty slice.
    #[inline]
    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match self {
            ModelMessage::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }
}

/// Describes an operation request from the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// The unique identifier for the request.
    pub id: String,
    /// The name of the operation to invoke.
    pub name: String,
    /// The argument mapping to pass to the operation.
    pub arguments: Value,
}

/// The result of one operation invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// The identifier of the originating request.
    pub id: String,
    /// The rendered result, or a rendered error for failed invocations.
    pub content: String,
}

/// Describes an operation that can be requested by the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTool {
    /// Name of the operation.
    pub name: String,
    /// Description of the operation.
    pub description: String,
    /// Parameters definition of the operation.
    ///
    /// For most model providers, the parameters should typically be
    /// defined by a [JSON schema](https://json-schema.org/).
    pub parameters: Value,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_tool_calls_accessor() {
        let msg = ModelMessage::Assistant {
            content: None,
            tool_calls: vec![ToolCallRequest {
                id: "call:1".to_owned(),
                name: "add".to_owned(),
                arguments: json!({ "a": 3, "b": 5 }),
            }],
        };
        assert_eq!(msg.tool_calls().len(), 1);
        assert!(ModelMessage::user("hi").tool_calls().is_empty());
    }

    #[test]
    fn test_message_roundtrip() {
        let msg = ModelMessage::Tool(ToolCallResult {
            id: "call:1".to_owned(),
            content: "8".to_owned(),
        });
        let encoded = serde_json::to_string(&msg).unwrap();
        let decoded: ModelMessage = serde_json::from_str(&encoded).unwrap();
        assert_eq!(msg, decoded);
    }
}
