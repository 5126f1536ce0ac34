//! Implements a minimal fake model against the provider protocol, to
//! make sure the trait surface is actually implementable downstream.

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::future::ready;

use abacus_model::{
    ErrorKind, ModelMessage, ModelProvider, ModelProviderError, ModelRequest,
    ModelTurn, ToolCallRequest,
};
use serde_json::json;

#[derive(Debug)]
struct FakeError;

impl Display for FakeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "fake error")
    }
}

impl StdError for FakeError {}

impl ModelProviderError for FakeError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Requests an `add` invocation for the first user message, then
/// answers with the last tool result it can see.
struct FakeModel;

impl ModelProvider for FakeModel {
    type Error = FakeError;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelTurn, Self::Error>> + Send + 'static
    {
        let turn = match req.messages.last() {
            Some(ModelMessage::User { .. }) => {
                ModelTurn::calls(vec![ToolCallRequest {
                    id: "call:1".to_owned(),
                    name: "add".to_owned(),
                    arguments: json!({ "a": 3, "b": 5 }),
                }])
            }
            Some(ModelMessage::Tool(result)) => {
                ModelTurn::text(format!("The answer is {}", result.content))
            }
            _ => ModelTurn::text("?"),
        };
        ready(Ok(turn))
    }
}

#[tokio::test]
async fn test_fake_model() {
    use abacus_model::{ModelFinishReason, ToolCallResult};

    let model = FakeModel;
    let mut req = ModelRequest {
        messages: vec![ModelMessage::user("What's 3 + 5?")],
        tools: vec![],
    };

    let turn = model.send_request(&req).await.unwrap();
    assert_eq!(turn.finish_reason, ModelFinishReason::ToolCalls);
    assert_eq!(turn.tool_calls[0].name, "add");

    req.messages.push(ModelMessage::Assistant {
        content: turn.content,
        tool_calls: turn.tool_calls,
    });
    req.messages.push(ModelMessage::Tool(ToolCallResult {
        id: "call:1".to_owned(),
        content: "8".to_owned(),
    }));

    let turn = model.send_request(&req).await.unwrap();
    assert_eq!(turn.finish_reason, ModelFinishReason::Stop);
    assert_eq!(turn.content.as_deref(), Some("The answer is 8"));
}
