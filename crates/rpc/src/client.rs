use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use abacus_core::tool::{self, OpDescriptor, ToolProvider};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};

use crate::proto::{Request, Response};

/// How to reach one tool provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Diagnostic label for the provider.
    pub name: String,
    /// The server executable.
    pub command: PathBuf,
    /// Arguments passed to the executable.
    pub args: Vec<String>,
}

/// An error raised while establishing a provider channel.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The provider executable could not be started.
    #[error("failed to spawn provider `{provider}`: {source}")]
    Spawn {
        /// The provider's diagnostic label.
        provider: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The spawned process did not expose the expected channel.
    #[error("provider `{provider}` did not expose {channel}")]
    MissingChannel {
        /// The provider's diagnostic label.
        provider: String,
        /// Which channel was missing.
        channel: &'static str,
    },
}

type PendingMap = Mutex<HashMap<u64, oneshot::Sender<Response>>>;

struct ClientInner {
    name: String,
    writer: AsyncMutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: PendingMap,
    next_id: AtomicU64,
    // Held so the subprocess is killed when the client goes away.
    _child: Option<Child>,
}

/// A connected tool provider subprocess.
///
/// Responses are matched to requests by their correlation id, so
/// several invocations may be in flight on one channel at a time.
#[derive(Clone)]
pub struct ProviderClient {
    inner: Arc<ClientInner>,
}

impl ProviderClient {
    /// Spawns the provider process and connects to it.
    ///
    /// The child is killed when the last clone of this client is
    /// dropped.
    pub fn spawn(config: &ProviderConfig) -> Result<Self, TransportError> {
        info!("spawning provider `{}`: {:?}", config.name, config.command);
        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TransportError::Spawn {
                provider: config.name.clone(),
                source,
            })?;

        let stdin =
            child
                .stdin
                .take()
                .ok_or_else(|| TransportError::MissingChannel {
                    provider: config.name.clone(),
                    channel: "stdin",
                })?;
        let stdout =
            child
                .stdout
                .take()
                .ok_or_else(|| TransportError::MissingChannel {
                    provider: config.name.clone(),
                    channel: "stdout",
                })?;

        Ok(Self::from_io_inner(&config.name, stdout, stdin, Some(child)))
    }

    /// Connects over arbitrary byte streams instead of a subprocess.
    pub fn from_io<R, W>(name: &str, reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::from_io_inner(name, reader, writer, None)
    }

    fn from_io_inner<R, W>(
        name: &str,
        reader: R,
        writer: W,
        child: Option<Child>,
    ) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let inner = Arc::new(ClientInner {
            name: name.to_owned(),
            writer: AsyncMutex::new(Box::new(writer)),
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            _child: child,
        });

        let reader_inner = Arc::downgrade(&inner);
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(err) => {
                        warn!("provider channel read failed: {err}");
                        break;
                    }
                };
                let Some(inner) = reader_inner.upgrade() else {
                    break;
                };
                inner.dispatch(&line);
            }
            // Dropping the remaining senders fails any in-flight
            // request.
            if let Some(inner) = reader_inner.upgrade() {
                debug!("provider `{}` closed the channel", inner.name);
                inner
                    .pending
                    .lock()
                    .expect("pending map lock is poisoned")
                    .clear();
            }
        });

        Self { inner }
    }

    async fn request(
        &self,
        make_request: impl FnOnce(u64) -> Request,
    ) -> Result<Response, tool::Error> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let request = make_request(id);

        let (tx, rx) = oneshot::channel();
        self.inner
            .pending
            .lock()
            .expect("pending map lock is poisoned")
            .insert(id, tx);

        let frame_or_err = serde_json::to_vec(&request);
        let mut frame = match frame_or_err {
            Ok(frame) => frame,
            Err(err) => {
                self.forget(id);
                return Err(tool::Error::execution()
                    .with_reason(format!("failed to encode a frame: {err}")));
            }
        };
        frame.push(b'\n');

        {
            let mut writer = self.inner.writer.lock().await;
            let write_res = async {
                writer.write_all(&frame).await?;
                writer.flush().await
            }
            .await;
            if let Err(err) = write_res {
                self.forget(id);
                return Err(tool::Error::unreachable().with_reason(format!(
                    "failed to write to provider `{}`: {err}",
                    self.inner.name
                )));
            }
        }

        rx.await.map_err(|_| {
            tool::Error::unreachable().with_reason(format!(
                "provider `{}` closed the channel before responding",
                self.inner.name
            ))
        })
    }

    fn forget(&self, id: u64) {
        self.inner
            .pending
            .lock()
            .expect("pending map lock is poisoned")
            .remove(&id);
    }
}

impl ClientInner {
    fn dispatch(&self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        let response = match serde_json::from_str::<Response>(line) {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "provider `{}` sent a malformed frame: {err}",
                    self.name
                );
                return;
            }
        };
        let sender = self
            .pending
            .lock()
            .expect("pending map lock is poisoned")
            .remove(&response.id());
        match sender {
            Some(sender) => {
                sender.send(response).ok();
            }
            None => {
                warn!(
                    "provider `{}` answered an unknown request: {}",
                    self.name,
                    response.id()
                );
            }
        }
    }
}

#[async_trait]
impl ToolProvider for ProviderClient {
    fn provider_name(&self) -> &str {
        &self.inner.name
    }

    async fn catalog(&self) -> Result<Vec<OpDescriptor>, tool::Error> {
        match self.request(|id| Request::ListOps { id }).await? {
            Response::Catalog { ops, .. } => Ok(ops),
            other => Err(tool::Error::unreachable().with_reason(format!(
                "provider `{}` answered a catalog request with {other:?}",
                self.inner.name
            ))),
        }
    }

    async fn invoke(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<Value, tool::Error> {
        let response = self
            .request(|id| Request::Invoke {
                id,
                name: name.to_owned(),
                arguments,
            })
            .await?;
        match response {
            Response::Ok { value, .. } => Ok(value),
            Response::Error { error, .. } => Err(error.into()),
            Response::Catalog { .. } => {
                Err(tool::Error::execution().with_reason(format!(
                    "provider `{}` answered an invocation with a catalog",
                    self.inner.name
                )))
            }
        }
    }
}
