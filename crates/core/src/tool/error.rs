use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The provider could not be reached.
    Unreachable,
    /// The requested operation is not in the provider's catalog.
    UnknownOperation,
    /// The arguments were outside the operation's domain.
    InvalidArgument,
    /// Division with a zero divisor.
    DivisionByZero,
    /// The invocation did not complete in time.
    Timeout,
    /// Error occurred while executing the operation.
    Execution,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Unreachable => write!(f, "provider unreachable"),
            ErrorKind::UnknownOperation => write!(f, "unknown operation"),
            ErrorKind::InvalidArgument => write!(f, "invalid argument"),
            ErrorKind::DivisionByZero => write!(f, "division by zero"),
            ErrorKind::Timeout => write!(f, "timed out"),
            ErrorKind::Execution => write!(f, "execution error"),
        }
    }
}

/// Describes a tool provider error.
///
/// Every kind except [`ErrorKind::Unreachable`] is recoverable: the
/// controller renders it into a tool-result message and lets the model
/// decide how to proceed. Unreachable providers are fatal at startup.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error {
    kind: ErrorKind,
    reason: Option<String>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, reason: None }
    }

    /// Creates a new error with the `Unreachable` kind.
    #[inline]
    pub fn unreachable() -> Self {
        Self::new(ErrorKind::Unreachable)
    }

    /// Creates a new error with the `UnknownOperation` kind.
    #[inline]
    pub fn unknown_operation() -> Self {
        Self::new(ErrorKind::UnknownOperation)
    }

    /// Creates a new error with the `InvalidArgument` kind.
    #[inline]
    pub fn invalid_argument() -> Self {
        Self::new(ErrorKind::InvalidArgument)
    }

    /// Creates a new error with the `DivisionByZero` kind.
    #[inline]
    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero)
    }

    /// Creates a new error with the `Timeout` kind.
    #[inline]
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    /// Creates a new error with the `Execution` kind.
    #[inline]
    pub fn execution() -> Self {
        Self::new(ErrorKind::Execution)
    }

    /// Attaches a reason to the error.
    #[inline]
    pub fn with_reason<S: Into<String>>(self, reason: S) -> Self {
        Self {
            kind: self.kind,
            reason: Some(reason.into()),
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the reason for the error.
    #[inline]
    pub fn reason(&self) -> Cow<'_, str> {
        match self.reason.as_deref() {
            Some(reason) => Cow::Borrowed(reason),
            None => Cow::Owned(format!("{}", self.kind)),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {}", self.kind, reason),
            None => Display::fmt(&self.kind, f),
        }
    }
}

impl StdError for Error {}
