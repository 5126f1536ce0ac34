use std::time::Duration;

use abacus_model::ModelMessage;
use abacus_test_model::{PresetTurn, TestModelProvider};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::time::sleep;

use super::*;
use crate::tool::{OpDescriptor, ToolProvider};

struct FakeMathProvider;

#[derive(Deserialize)]
struct Pair {
    a: i64,
    b: i64,
}

#[async_trait]
impl ToolProvider for FakeMathProvider {
    fn provider_name(&self) -> &str {
        "fake-math"
    }

    async fn catalog(&self) -> Result<Vec<OpDescriptor>, tool::Error> {
        Ok(["add", "multiply", "hang"]
            .iter()
            .map(|name| OpDescriptor {
                name: (*name).to_owned(),
                description: String::new(),
                parameters: json!({ "type": "object" }),
            })
            .collect())
    }

    async fn invoke(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<Value, tool::Error> {
        match name {
            "add" | "multiply" => {
                let pair: Pair = serde_json::from_value(arguments)
                    .map_err(|err| {
                        tool::Error::invalid_argument()
                            .with_reason(err.to_string())
                    })?;
                if name == "add" {
                    Ok(json!(pair.a + pair.b))
                } else {
                    Ok(json!(pair.a * pair.b))
                }
            }
            "hang" => {
                sleep(Duration::from_secs(3600)).await;
                Ok(Value::Null)
            }
            _ => Err(tool::Error::unknown_operation()),
        }
    }
}

fn call(id: &str, name: &str, arguments: Value) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_owned(),
        name: name.to_owned(),
        arguments,
    }
}

async fn math_registry() -> Registry {
    Registry::connect(vec![Box::new(FakeMathProvider)])
        .await
        .unwrap()
}

fn controller_with(
    provider: TestModelProvider,
    registry: Registry,
    config: ControllerConfig,
) -> Controller {
    ControllerBuilder::with_model_provider(provider)
        .with_registry(registry)
        .with_config(config)
        .build()
}

fn tool_content(msg: &ModelMessage) -> &str {
    match msg {
        ModelMessage::Tool(result) => &result.content,
        other => panic!("expected a tool message, got {other:?}"),
    }
}

#[tokio::test]
async fn test_direct_answer() {
    let mut provider = TestModelProvider::default();
    provider.add_user_turn();
    provider.add_assistant_turn(PresetTurn::text("Hi, what can I do for you?"));

    let controller = controller_with(
        provider,
        math_registry().await,
        ControllerConfig::default(),
    );
    let conversation =
        controller.process_query("Hello", None).await.unwrap();

    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation.steps(), 1);
    assert!(matches!(
        &conversation.messages()[1],
        ModelMessage::Assistant { content: Some(text), .. }
            if text == "Hi, what can I do for you?"
    ));
}

/// The `(3 + 5) × 12` scenario: two Act steps, then a final answer
/// containing 96.
#[tokio::test]
async fn test_two_act_scenario() {
    let mut provider = TestModelProvider::default();
    provider.add_user_turn();
    provider.add_assistant_turn(PresetTurn::calls(vec![call(
        "call:1",
        "add",
        json!({ "a": 3, "b": 5 }),
    )]));
    provider.add_tool_result_turn();
    provider.add_assistant_turn(PresetTurn::calls(vec![call(
        "call:2",
        "multiply",
        json!({ "a": 8, "b": 12 }),
    )]));
    provider.add_tool_result_turn();
    provider.add_assistant_turn(PresetTurn::text("(3 + 5) × 12 = 96"));

    let controller = controller_with(
        provider,
        math_registry().await,
        ControllerConfig::default(),
    );
    let conversation = controller
        .process_query("What's (3 + 5) × 12?", None)
        .await
        .unwrap();

    // user + 2 × (assistant + tool result) + final answer.
    assert_eq!(conversation.len(), 6);
    assert_eq!(conversation.steps(), 3);
    assert_eq!(tool_content(&conversation.messages()[2]), "8");
    assert_eq!(tool_content(&conversation.messages()[4]), "96");
    assert!(matches!(
        &conversation.messages()[5],
        ModelMessage::Assistant { content: Some(text), .. }
            if text.contains("96")
    ));
}

#[tokio::test]
async fn test_results_follow_request_order() {
    let mut provider = TestModelProvider::default();
    provider.add_user_turn();
    provider.add_assistant_turn(PresetTurn::calls(vec![
        call("call:1", "add", json!({ "a": 1, "b": 2 })),
        call("call:2", "multiply", json!({ "a": 2, "b": 3 })),
    ]));
    provider.add_tool_result_turn();
    provider.add_tool_result_turn();
    provider.add_assistant_turn(PresetTurn::text("done"));

    let controller = controller_with(
        provider,
        math_registry().await,
        ControllerConfig::default(),
    );
    let conversation =
        controller.process_query("two at once", None).await.unwrap();

    assert_eq!(conversation.len(), 5);
    let ModelMessage::Tool(first) = &conversation.messages()[2] else {
        panic!("expected a tool message");
    };
    let ModelMessage::Tool(second) = &conversation.messages()[3] else {
        panic!("expected a tool message");
    };
    assert_eq!((first.id.as_str(), first.content.as_str()), ("call:1", "3"));
    assert_eq!((second.id.as_str(), second.content.as_str()), ("call:2", "6"));
}

#[tokio::test]
async fn test_unknown_operation_recovers() {
    let mut provider = TestModelProvider::default();
    provider.add_user_turn();
    provider.add_assistant_turn(PresetTurn::calls(vec![call(
        "call:1",
        "foo",
        json!({}),
    )]));
    provider.add_tool_result_turn();
    provider.add_assistant_turn(PresetTurn::text(
        "I don't have that operation.",
    ));

    let controller = controller_with(
        provider,
        math_registry().await,
        ControllerConfig::default(),
    );
    let conversation =
        controller.process_query("use foo", None).await.unwrap();

    // The failed invocation becomes a tool-error result, and the
    // conversation continues instead of crashing.
    assert_eq!(conversation.len(), 4);
    let content = tool_content(&conversation.messages()[2]);
    assert!(content.contains("unknown operation"));
    assert!(content.contains("foo"));
}

#[tokio::test]
async fn test_step_limit_fails_closed() {
    let mut provider = TestModelProvider::default();
    provider.add_user_turn();
    provider.add_assistant_turn(PresetTurn::calls(vec![call(
        "call:1",
        "add",
        json!({ "a": 1, "b": 1 }),
    )]));
    provider.add_tool_result_turn();
    provider.add_assistant_turn(PresetTurn::calls(vec![call(
        "call:2",
        "add",
        json!({ "a": 2, "b": 2 }),
    )]));
    provider.add_tool_result_turn();
    provider.add_assistant_turn(PresetTurn::text("never reached"));

    let config = ControllerConfig {
        max_steps: 2,
        ..Default::default()
    };
    let controller =
        controller_with(provider, math_registry().await, config);
    let err = controller
        .process_query("keep adding", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StepLimitExceeded);
}

#[tokio::test(start_paused = true)]
async fn test_transient_model_failure_is_retried() {
    let mut provider = TestModelProvider::default();
    provider.add_user_turn();
    provider
        .add_assistant_turn(PresetTurn::text("recovered").with_failures(2));

    let controller = controller_with(
        provider,
        math_registry().await,
        ControllerConfig::default(),
    );
    let conversation =
        controller.process_query("flaky", None).await.unwrap();
    assert!(matches!(
        &conversation.messages()[1],
        ModelMessage::Assistant { content: Some(text), .. }
            if text == "recovered"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_tool_timeout_becomes_error_result() {
    let mut provider = TestModelProvider::default();
    provider.add_user_turn();
    provider.add_assistant_turn(PresetTurn::calls(vec![call(
        "call:1",
        "hang",
        json!({}),
    )]));
    provider.add_tool_result_turn();
    provider.add_assistant_turn(PresetTurn::text("that took too long"));

    let config = ControllerConfig {
        tool_timeout: Duration::from_millis(100),
        ..Default::default()
    };
    let controller =
        controller_with(provider, math_registry().await, config);
    let conversation =
        controller.process_query("hang please", None).await.unwrap();

    assert_eq!(conversation.len(), 4);
    assert!(tool_content(&conversation.messages()[2]).contains("timed out"));
}

#[tokio::test]
async fn test_prior_conversation_is_threaded() {
    let mut provider = TestModelProvider::default();
    provider.add_user_turn();
    provider.add_assistant_turn(PresetTurn::text("8"));
    provider.add_user_turn();
    provider.add_assistant_turn(PresetTurn::calls(vec![call(
        "call:1",
        "multiply",
        json!({ "a": 8, "b": 8 }),
    )]));
    provider.add_tool_result_turn();
    provider.add_assistant_turn(PresetTurn::text("The square is 64."));

    let controller = controller_with(
        provider,
        math_registry().await,
        ControllerConfig::default(),
    );
    let first = controller
        .process_query("What's 3 + 5?", None)
        .await
        .unwrap();
    assert_eq!(first.len(), 2);

    let second = controller
        .process_query("Now square that result", Some(first))
        .await
        .unwrap();
    assert_eq!(second.len(), 6);
    assert_eq!(second.steps(), 2);
    assert_eq!(tool_content(&second.messages()[4]), "64");
}
