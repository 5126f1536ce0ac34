//! The seam between the control loop and tool providers.

mod error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::{Error, ErrorKind};

/// Describes one operation advertised by a tool provider.
///
/// Descriptors are fetched once when the registry is built and are
/// immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpDescriptor {
    /// Name of the operation, unique within its provider.
    pub name: String,
    /// Human-readable description of the operation.
    pub description: String,
    /// JSON schema of the operation's argument mapping.
    pub parameters: Value,
}

/// A connected tool provider.
///
/// Providers are stateless: every operation they expose is a pure
/// function of its arguments, so implementations don't need any
/// synchronization beyond what their transport requires. Providers
/// never know about each other; merging catalogs is the registry's
/// business.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Returns a label for this provider, used in diagnostics only.
    fn provider_name(&self) -> &str;

    /// Fetches the operations advertised by this provider.
    async fn catalog(&self) -> Result<Vec<OpDescriptor>, Error>;

    /// Invokes the named operation with the given argument mapping.
    async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, Error>;
}
