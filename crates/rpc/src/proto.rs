use abacus_core::tool::{self, OpDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A frame sent from the client to a provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Asks the provider to advertise its catalog.
    ListOps {
        /// Correlation identifier, echoed back in the response.
        id: u64,
    },
    /// Invokes a single operation.
    Invoke {
        /// Correlation identifier, echoed back in the response.
        id: u64,
        /// The operation name.
        name: String,
        /// The argument mapping.
        #[serde(default)]
        arguments: Value,
    },
}

/// A frame sent from a provider back to the client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// The provider's advertised catalog.
    Catalog {
        /// Correlation identifier of the originating request.
        id: u64,
        /// The advertised operations.
        ops: Vec<OpDescriptor>,
    },
    /// A successful invocation result.
    Ok {
        /// Correlation identifier of the originating request.
        id: u64,
        /// The operation result value.
        value: Value,
    },
    /// A failed invocation.
    Error {
        /// Correlation identifier of the originating request.
        id: u64,
        /// What went wrong.
        error: WireError,
    },
}

impl Response {
    /// Returns the correlation identifier of this frame.
    #[inline]
    pub fn id(&self) -> u64 {
        match self {
            Response::Catalog { id, .. }
            | Response::Ok { id, .. }
            | Response::Error { id, .. } => *id,
        }
    }
}

/// The kind of a provider-reported error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireErrorKind {
    /// The operation is not in this provider's catalog.
    UnknownOperation,
    /// The arguments were outside the operation's domain.
    InvalidArgument,
    /// Division with a zero divisor.
    DivisionByZero,
    /// The provider failed internally.
    Internal,
}

/// An error reported by a provider over the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    /// The error kind.
    pub kind: WireErrorKind,
    /// A human-readable message.
    pub message: String,
}

impl WireError {
    /// Creates an `UnknownOperation` error.
    #[inline]
    pub fn unknown_operation<S: Into<String>>(message: S) -> Self {
        Self {
            kind: WireErrorKind::UnknownOperation,
            message: message.into(),
        }
    }

    /// Creates an `InvalidArgument` error.
    #[inline]
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self {
            kind: WireErrorKind::InvalidArgument,
            message: message.into(),
        }
    }

    /// Creates a `DivisionByZero` error.
    #[inline]
    pub fn division_by_zero<S: Into<String>>(message: S) -> Self {
        Self {
            kind: WireErrorKind::DivisionByZero,
            message: message.into(),
        }
    }

    /// Creates an `Internal` error.
    #[inline]
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self {
            kind: WireErrorKind::Internal,
            message: message.into(),
        }
    }
}

impl From<WireError> for tool::Error {
    fn from(err: WireError) -> Self {
        let kind = match err.kind {
            WireErrorKind::UnknownOperation => tool::ErrorKind::UnknownOperation,
            WireErrorKind::InvalidArgument => tool::ErrorKind::InvalidArgument,
            WireErrorKind::DivisionByZero => tool::ErrorKind::DivisionByZero,
            WireErrorKind::Internal => tool::ErrorKind::Execution,
        };
        tool::Error::new(kind).with_reason(err.message)
    }
}
