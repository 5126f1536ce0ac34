use std::collections::HashMap;
use std::io;

use abacus_core::tool::OpDescriptor;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader,
    BufWriter,
};

use crate::proto::{Request, Response, WireError};

/// One operation a provider exposes.
///
/// Operations are pure, synchronous functions of their arguments: no
/// internal state, no observable side effect beyond diagnostic traces.
pub trait Operation: Send + Sync + 'static {
    /// The type of input that the operation accepts.
    type Input: DeserializeOwned;

    /// Returns the name of the operation.
    fn name(&self) -> &str;

    /// Returns the description of the operation.
    fn description(&self) -> &str;

    /// Returns the parameter schema of the operation.
    fn parameter_schema(&self) -> &Value;

    /// Evaluates the operation with the given input.
    fn call(&self, input: Self::Input) -> Result<Value, WireError>;
}

trait OpObject: Send + Sync {
    fn descriptor(&self) -> OpDescriptor;

    fn call_raw(&self, arguments: Value) -> Result<Value, WireError>;
}

struct AnyOp<T: Operation>(T);

impl<T: Operation> OpObject for AnyOp<T> {
    fn descriptor(&self) -> OpDescriptor {
        OpDescriptor {
            name: self.0.name().to_owned(),
            description: self.0.description().to_owned(),
            parameters: self.0.parameter_schema().clone(),
        }
    }

    fn call_raw(&self, arguments: Value) -> Result<Value, WireError> {
        let input: T::Input = serde_json::from_value(arguments)
            .map_err(|err| WireError::invalid_argument(err.to_string()))?;
        self.0.call(input)
    }
}

/// The set of operations one provider serves.
#[derive(Default)]
pub struct OpSet {
    ops: HashMap<String, Box<dyn OpObject>>,
}

impl OpSet {
    /// Registers an operation.
    pub fn register<T: Operation>(&mut self, op: T) {
        let name = op.name().to_owned();
        self.ops.insert(name, Box::new(AnyOp(op)));
    }

    /// Returns the descriptors of every registered operation, sorted
    /// by name.
    pub fn descriptors(&self) -> Vec<OpDescriptor> {
        let mut descriptors: Vec<OpDescriptor> =
            self.ops.values().map(|op| op.descriptor()).collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Evaluates the named operation.
    pub fn invoke(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<Value, WireError> {
        let Some(op) = self.ops.get(name) else {
            warn!("operation not found: {name}");
            return Err(WireError::unknown_operation(format!(
                "no operation named `{name}`"
            )));
        };
        trace!("invoking `{name}` with args: {arguments:?}");
        op.call_raw(arguments)
    }
}

/// Serves the operation set over the given byte streams until the
/// reader closes.
///
/// Malformed frames are discarded with a warning; they carry no id to
/// answer to.
pub async fn serve<R, W>(
    opset: &OpSet,
    reader: R,
    writer: W,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut writer = BufWriter::new(writer);

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(Request::ListOps { id }) => Response::Catalog {
                id,
                ops: opset.descriptors(),
            },
            Ok(Request::Invoke {
                id,
                name,
                arguments,
            }) => match opset.invoke(&name, arguments) {
                Ok(value) => Response::Ok { id, value },
                Err(error) => Response::Error { id, error },
            },
            Err(err) => {
                warn!("discarding a malformed frame: {err}");
                continue;
            }
        };

        let mut frame =
            serde_json::to_vec(&response).map_err(io::Error::other)?;
        frame.push(b'\n');
        writer.write_all(&frame).await?;
        writer.flush().await?;
    }
    debug!("channel closed, shutting down");
    Ok(())
}

/// Serves the operation set over this process's stdin and stdout.
///
/// Callers must keep stdout free of anything else; diagnostics belong
/// on stderr.
pub async fn serve_stdio(opset: &OpSet) -> io::Result<()> {
    serve(opset, tokio::io::stdin(), tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct EchoOp {
        schema: Value,
    }

    impl Operation for EchoOp {
        type Input = Value;

        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Returns its input unchanged."
        }

        fn parameter_schema(&self) -> &Value {
            &self.schema
        }

        fn call(&self, input: Value) -> Result<Value, WireError> {
            Ok(input)
        }
    }

    fn echo_set() -> OpSet {
        let mut opset = OpSet::default();
        opset.register(EchoOp {
            schema: json!({ "type": "object" }),
        });
        opset
    }

    #[test]
    fn test_invoke_unknown_operation() {
        let err = echo_set().invoke("nope", json!({})).unwrap_err();
        assert_eq!(err.kind, crate::WireErrorKind::UnknownOperation);
    }

    #[tokio::test]
    async fn test_serve_over_duplex() {
        let opset = echo_set();
        let (client_io, server_io) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server_io);
        let (client_read, client_write) = tokio::io::split(client_io);

        let server = async move {
            serve(&opset, server_read, server_write).await.unwrap();
        };

        let client = async move {
            let mut writer = BufWriter::new(client_write);
            let frame = serde_json::to_string(&Request::Invoke {
                id: 1,
                name: "echo".to_owned(),
                arguments: json!({ "hello": "world" }),
            })
            .unwrap();
            writer.write_all(frame.as_bytes()).await.unwrap();
            writer.write_all(b"\n").await.unwrap();
            writer.flush().await.unwrap();

            let mut lines = BufReader::new(client_read).lines();
            let line = lines.next_line().await.unwrap().unwrap();
            let response: Response = serde_json::from_str(&line).unwrap();
            assert_eq!(
                response,
                Response::Ok {
                    id: 1,
                    value: json!({ "hello": "world" }),
                }
            );
            // Dropping the writer closes the channel and stops the
            // server loop.
        };

        tokio::join!(server, client);
    }
}
