//! Error taxonomy shared across the bot crates.

/// Result alias over the bot error taxonomy.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The session is closed or was never opened.
    #[error("transport closed")]
    Closed,

    /// Network-level failure during connect, emit, or receive.
    #[error("network error: {0}")]
    Network(String),

    /// A bounded wait for a direct response expired.
    #[error("response timed out")]
    Timeout,
}

/// Failure from the HTTP fetch collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fetch failed: {0}")]
pub struct FetchError(pub String);

/// Errors surfaced by the bot runtime.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad, missing, or erroring socket configuration. Fatal, never retried.
    #[error("socket config error: {0}")]
    Config(String),

    /// Authentication rejected, or an unparseable guest-throttle message.
    /// Fatal outside the explicit guest-throttle sleep-and-retry path.
    #[error("login error: {0}")]
    Login(String),

    /// Chat action denied (muted, flood-rejected, insufficient rank).
    /// Surfaced to the caller; does not terminate the run loop.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Forcible session termination by the server. Fatal.
    #[error("kicked: {0}")]
    Kicked(String),

    /// Network-level failure. The run loop retries by restarting login
    /// unless restarts are disabled.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Socket-config fetch failure. Fatal like [`Error::Config`].
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Server payload missing a required field or of the wrong shape.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl Error {
    /// Whether the error terminates the run loop regardless of the
    /// restart-on-error flag.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Transport(_))
    }

    /// Error category string for logging.
    pub fn category(&self) -> &str {
        match self {
            Self::Config(_) => "config",
            Self::Login(_) => "login",
            Self::Permission(_) => "permission",
            Self::Kicked(_) => "kicked",
            Self::Transport(_) => "transport",
            Self::Fetch(_) => "fetch",
            Self::InvalidPayload(_) => "invalid_payload",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::Login("invalid channel password".into());
        assert_eq!(err.to_string(), "login error: invalid channel password");
    }

    #[test]
    fn transport_error_display_is_transparent() {
        let err = Error::Transport(TransportError::Network("reset by peer".into()));
        assert_eq!(err.to_string(), "network error: reset by peer");
    }

    #[test]
    fn fetch_error_display_is_transparent() {
        let err = Error::from(FetchError("dns failure".into()));
        assert_eq!(err.to_string(), "fetch failed: dns failure");
    }

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(!Error::Transport(TransportError::Closed).is_fatal());
        assert!(Error::Config("bad".into()).is_fatal());
        assert!(Error::Login("rejected".into()).is_fatal());
        assert!(Error::Kicked("spam".into()).is_fatal());
        assert!(Error::Permission("muted".into()).is_fatal());
        assert!(Error::Fetch(FetchError("io".into())).is_fatal());
        assert!(Error::InvalidPayload("rank".into()).is_fatal());
    }

    #[test]
    fn error_category() {
        assert_eq!(Error::Config("x".into()).category(), "config");
        assert_eq!(Error::Login("x".into()).category(), "login");
        assert_eq!(Error::Kicked("x".into()).category(), "kicked");
        assert_eq!(
            Error::Transport(TransportError::Timeout).category(),
            "transport"
        );
    }
}
