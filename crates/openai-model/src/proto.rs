use abacus_model::{
    ModelFinishReason, ModelMessage, ModelRequest, ModelTool, ModelTurn,
    ToolCallRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::OpenAIConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionToolCall {
    pub name: String,
    /// The arguments, JSON-encoded into a string.
    pub arguments: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub r#type: String,
    pub function: FunctionToolCall,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Choice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct Tool {
    r#type: &'static str,
    function: FunctionTool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    stream: bool,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.messages.iter().map(create_message).collect(),
        tools: req.tools.iter().map(create_tool).collect(),
        stream: false,
    }
}

#[inline]
fn create_message(msg: &ModelMessage) -> Message {
    match msg {
        ModelMessage::System { content } => Message::System {
            content: content.clone(),
        },
        ModelMessage::User { content } => Message::User {
            content: content.clone(),
        },
        ModelMessage::Assistant {
            content,
            tool_calls,
        } => Message::Assistant {
            content: content.clone(),
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls.iter().map(create_tool_call).collect())
            },
        },
        ModelMessage::Tool(result) => Message::Tool {
            tool_call_id: result.id.clone(),
            content: result.content.clone(),
        },
    }
}

#[inline]
fn create_tool_call(call: &ToolCallRequest) -> ToolCall {
    ToolCall {
        id: call.id.clone(),
        r#type: "function".to_owned(),
        function: FunctionToolCall {
            name: call.name.clone(),
            arguments: call.arguments.to_string(),
        },
    }
}

#[inline]
fn create_tool(tool: &ModelTool) -> Tool {
    Tool {
        r#type: "function",
        function: FunctionTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

/// Converts a completion response into a model turn.
///
/// Fails with a message if the response has no choices or a tool call
/// carries arguments that are not valid JSON.
pub fn parse_turn(
    response: ChatCompletionResponse,
) -> Result<ModelTurn, String> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Err("the response carried no choices".to_owned());
    };

    let mut tool_calls = Vec::new();
    for call in choice.message.tool_calls.unwrap_or_default() {
        let arguments = serde_json::from_str(&call.function.arguments)
            .map_err(|err| {
                format!(
                    "tool call `{}` carried malformed arguments: {err}",
                    call.function.name
                )
            })?;
        tool_calls.push(ToolCallRequest {
            id: call.id,
            name: call.function.name,
            arguments,
        });
    }

    let finish_reason = if tool_calls.is_empty() {
        ModelFinishReason::Stop
    } else {
        ModelFinishReason::ToolCalls
    };
    Ok(ModelTurn {
        content: choice.message.content,
        tool_calls,
        finish_reason,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::OpenAIConfigBuilder;

    #[test]
    fn test_create_request() {
        let request = ModelRequest {
            messages: vec![
                ModelMessage::system("You are a helpful assistant."),
                ModelMessage::user("What's (3 + 5) x 12?"),
            ],
            tools: vec![ModelTool {
                name: "add".to_owned(),
                description: "Adds two integers.".to_owned(),
                parameters: json!({ "type": "object" }),
            }],
        };
        let config = OpenAIConfigBuilder::with_api_key("xxx")
            .with_model("custom")
            .build();
        let expected = ChatCompletionRequest {
            model: "custom".to_owned(),
            messages: vec![
                Message::System {
                    content: "You are a helpful assistant.".to_owned(),
                },
                Message::User {
                    content: "What's (3 + 5) x 12?".to_owned(),
                },
            ],
            tools: vec![Tool {
                r#type: "function",
                function: FunctionTool {
                    name: "add".to_owned(),
                    description: "Adds two integers.".to_owned(),
                    parameters: json!({ "type": "object" }),
                },
            }],
            stream: false,
        };
        assert_eq!(create_request(&request, &config), expected);
    }

    #[test]
    fn test_parse_tool_call_turn() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_0",
                        "type": "function",
                        "function": {
                            "name": "add",
                            "arguments": "{\"a\": 3, \"b\": 5}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        let turn = parse_turn(response).unwrap();
        assert_eq!(turn.finish_reason, ModelFinishReason::ToolCalls);
        assert_eq!(turn.tool_calls.len(), 1);
        assert_eq!(turn.tool_calls[0].name, "add");
        assert_eq!(turn.tool_calls[0].arguments, json!({ "a": 3, "b": 5 }));
    }

    #[test]
    fn test_parse_text_turn() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{
                "message": { "content": "The answer is 96." },
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        let turn = parse_turn(response).unwrap();
        assert_eq!(turn.finish_reason, ModelFinishReason::Stop);
        assert_eq!(turn.content.as_deref(), Some("The answer is 96."));
        assert!(turn.tool_calls.is_empty());
    }

    #[test]
    fn test_parse_empty_response() {
        let response = ChatCompletionResponse { choices: vec![] };
        assert!(parse_turn(response).is_err());
    }
}
