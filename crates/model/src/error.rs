/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The provider could not be reached or the request was dropped
    /// mid-flight.
    Unavailable,
    /// The content is moderated.
    Moderated,
    /// Any other errors.
    Other,
}

impl ErrorKind {
    /// Whether an error of this kind is worth retrying.
    #[inline]
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::RateLimitExceeded | ErrorKind::Unavailable)
    }
}
