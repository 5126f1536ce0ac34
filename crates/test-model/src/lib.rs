//! A local fake model for testing purpose.

mod preset;

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use abacus_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, ModelTurn,
};
use tokio::time::sleep;

pub use preset::*;

/// The error type returned by [`TestModelProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Clone)]
enum ConversationStep {
    /// A message the caller is expected to have appended (user input,
    /// system prompt, or a tool result). It only occupies an index.
    Context,
    AssistantTurn(PresetTurn),
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to set up the conversation script,
/// which is how the model should respond to a request. The step is
/// selected by the number of history messages in your request: index
/// `k` answers a request carrying `k` messages, so the script must
/// mirror the full expected history shape. If there are not enough
/// steps in the script, an error is returned.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy
/// memory copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Vec<ConversationStep>,
    attempts: Arc<Mutex<HashMap<usize, u64>>>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    /// Appends a step for a user message.
    #[inline]
    pub fn add_user_turn(&mut self) {
        self.script.push(ConversationStep::Context);
    }

    /// Appends a step for a tool-result message.
    #[inline]
    pub fn add_tool_result_turn(&mut self) {
        self.script.push(ConversationStep::Context);
    }

    /// Appends an assistant response step.
    #[inline]
    pub fn add_assistant_turn(&mut self, preset: PresetTurn) {
        self.script.push(ConversationStep::AssistantTurn(preset));
    }

    /// Delays every response by the given duration.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    fn answer(&self, step_idx: usize) -> Result<ModelTurn, Error> {
        let Some(step) = self.script.get(step_idx) else {
            return Err(Error {
                message: format!("script has no step {step_idx}"),
                kind: ErrorKind::Other,
            });
        };
        let preset = match step {
            ConversationStep::Context => {
                return Err(Error {
                    message: format!(
                        "step {step_idx} is not an assistant turn"
                    ),
                    kind: ErrorKind::Other,
                });
            }
            ConversationStep::AssistantTurn(preset) => preset,
        };

        if let Some(failures) = preset.failures {
            let mut attempts = self
                .attempts
                .lock()
                .expect("test provider state is poisoned");
            let seen = attempts.entry(step_idx).or_insert(0);
            if failures == 0 || *seen < failures {
                *seen += 1;
                return Err(Error {
                    message: format!(
                        "scripted failure {seen} at step {step_idx}"
                    ),
                    kind: ErrorKind::Unavailable,
                });
            }
        }

        Ok(ModelTurn {
            content: preset.content.clone(),
            tool_calls: preset.tool_calls.clone(),
            finish_reason: preset.finish_reason(),
        })
    }
}

impl ModelProvider for TestModelProvider {
    type Error = Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelTurn, Self::Error>> + Send + 'static
    {
        let result = self.answer(req.messages.len());
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            result
        }
    }
}
