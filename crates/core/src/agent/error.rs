use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The Reason-transition cap was reached without a final answer.
    StepLimitExceeded,
    /// The model could not be consulted, even after retries.
    ModelFailure,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::StepLimitExceeded => write!(f, "step limit exceeded"),
            ErrorKind::ModelFailure => write!(f, "model failure"),
        }
    }
}

/// Describes a controller error.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error {
    kind: ErrorKind,
    reason: Option<String>,
}

impl Error {
    /// Creates a new error with the `StepLimitExceeded` kind.
    #[inline]
    pub fn step_limit_exceeded() -> Self {
        Self {
            kind: ErrorKind::StepLimitExceeded,
            reason: None,
        }
    }

    /// Creates a new error with the `ModelFailure` kind.
    #[inline]
    pub fn model_failure() -> Self {
        Self {
            kind: ErrorKind::ModelFailure,
            reason: None,
        }
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
