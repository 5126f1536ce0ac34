mod builder;
mod config;
mod error;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use abacus_model::{
    ModelMessage, ModelRequest, ModelTurn, ToolCallRequest, ToolCallResult,
};
use backoff::ExponentialBackoff;
use serde_json::Value;
use tokio::time::timeout;

use crate::conversation::Conversation;
use crate::model_client::ModelClient;
use crate::registry::Registry;
use crate::tool;
pub use builder::ControllerBuilder;
pub use config::ControllerConfig;
pub use error::{Error, ErrorKind};

/// Drives the two-state Reason/Act loop for a conversation.
///
/// The loop is strictly sequential: no step begins before the previous
/// step's result has been appended to the history. Operation requests
/// within one Act step run concurrently, but all of them complete
/// before the next Reason transition, and their results are appended in
/// request order.
pub struct Controller {
    model_client: ModelClient,
    registry: Arc<Registry>,
    system_prompt: Option<String>,
    config: ControllerConfig,
}

impl Controller {
    /// Processes a single query, optionally continuing a prior
    /// conversation, and returns the extended conversation.
    ///
    /// Every operation request the model emits is matched by exactly
    /// one tool-result message before the model is consulted again.
    /// Domain errors from providers never abort the conversation; they
    /// are rendered into the matching tool-result message instead.
    pub async fn process_query(
        &self,
        query: &str,
        prior: Option<Conversation>,
    ) -> Result<Conversation, Error> {
        info!("processing query: {query}");

        let mut conversation = prior.unwrap_or_default();
        conversation.begin_query();
        if conversation.is_empty() {
            if let Some(prompt) = &self.system_prompt {
                conversation.push(ModelMessage::system(prompt.clone()));
            }
        }
        conversation.push(ModelMessage::user(query));

        loop {
            if conversation.steps() >= self.config.max_steps {
                return Err(Error::step_limit_exceeded().with_reason(format!(
                    "no final answer after {} model consultations",
                    conversation.steps()
                )));
            }
            conversation.count_step();

            // Reason: consult the model with the full history and the
            // merged operation catalog.
            let turn = self.consult_model(&conversation).await?;
            let requests = turn.tool_calls.clone();
            conversation.push(ModelMessage::Assistant {
                content: turn.content,
                tool_calls: turn.tool_calls,
            });

            if requests.is_empty() {
                debug!("no operation requests, ending the loop");
                break;
            }

            // Act: run the requested operations, then go reason again.
            debug!("continuing with {} operation request(s)", requests.len());
            for result in self.run_requests(requests).await {
                conversation.push(ModelMessage::Tool(result));
            }
        }

        Ok(conversation)
    }

    async fn consult_model(
        &self,
        conversation: &Conversation,
    ) -> Result<ModelTurn, Error> {
        let request = ModelRequest {
            messages: conversation.messages().to_vec(),
            tools: self.registry.definitions(),
        };

        let policy = ExponentialBackoff {
            max_elapsed_time: Some(self.config.retry_budget),
            ..Default::default()
        };
        backoff::future::retry(policy, || {
            let request = request.clone();
            let model_client = self.model_client.clone();
            let model_timeout = self.config.model_timeout;
            async move {
                let turn_or_err =
                    timeout(model_timeout, model_client.send_request(request))
                        .await;
                match turn_or_err {
                    Ok(Ok(turn)) => Ok(turn),
                    Ok(Err(err)) => {
                        let mapped = Error::model_failure()
                            .with_reason(err.to_string());
                        if err.kind().is_transient() {
                            warn!("transient model failure, will retry: {err}");
                            Err(backoff::Error::transient(mapped))
                        } else {
                            Err(backoff::Error::permanent(mapped))
                        }
                    }
                    Err(_) => {
                        warn!("model call timed out, will retry");
                        Err(backoff::Error::transient(
                            Error::model_failure()
                                .with_reason("model call timed out"),
                        ))
                    }
                }
            }
        })
        .await
    }

    /// Invokes each request concurrently and collects the results in
    /// request order.
    async fn run_requests(
        &self,
        requests: Vec<ToolCallRequest>,
    ) -> Vec<ToolCallResult> {
        let handles: Vec<_> = requests
            .into_iter()
            .map(|req| {
                let registry = Arc::clone(&self.registry);
                let tool_timeout = self.config.tool_timeout;
                let id = req.id.clone();
                let task = tokio::spawn(async move {
                    invoke_one(&registry, req, tool_timeout).await
                });
                (id, task)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (id, task) in handles {
            let content = task.await.unwrap_or_else(|err| {
                error!("operation task failed: {err}");
                format!("Error: operation task failed: {err}")
            });
            results.push(ToolCallResult { id, content });
        }
        results
    }
}

async fn invoke_one(
    registry: &Registry,
    req: ToolCallRequest,
    tool_timeout: std::time::Duration,
) -> String {
    let invoke_fut = registry.invoke(&req.name, req.arguments.clone());
    let result = match timeout(tool_timeout, invoke_fut).await {
        Ok(result) => result,
        Err(_) => Err(tool::Error::timeout()
            .with_reason(format!("no response within {tool_timeout:?}"))),
    };
    match result {
        Ok(value) => render_value(&value),
        Err(err) => {
            warn!("operation `{}` failed: {err}", req.name);
            format!(
                "Error invoking `{}` with arguments {}: {err}",
                req.name, req.arguments
            )
        }
    }
}

/// Renders an operation result into tool-message content. Bare strings
/// are inlined; everything else stays JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
