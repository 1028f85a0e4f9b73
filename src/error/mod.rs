//! Error types for voicewire.

use thiserror::Error;

/// Primary error type for all voicewire operations.
#[derive(Error, Debug)]
pub enum VoicewireError {
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Signalling error (status {status}): {message}")]
    Signalling { status: u16, message: String },

    #[error("Microphone error: {0}")]
    Microphone(String),

    #[error("Channel send error: {0}")]
    ChannelSend(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Remote response error: {0}")]
    RemoteResponse(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Classification attached to the UI status line (drives icon/color).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

impl VoicewireError {
    /// Classify this error for the status line.
    ///
    /// `Parse` and `RemoteResponse` are recoverable within a live session
    /// and never force teardown; everything else is terminal for the
    /// current session attempt.
    pub fn status_kind(&self) -> StatusKind {
        match self {
            Self::Parse(_) | Self::RemoteResponse(_) => StatusKind::Warning,
            _ => StatusKind::Error,
        }
    }

    /// Whether this error aborts session startup.
    pub fn is_fatal(&self) -> bool {
        self.status_kind() == StatusKind::Error
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, VoicewireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_response_is_warning_not_fatal() {
        let err = VoicewireError::RemoteResponse("model refused".into());
        assert_eq!(err.status_kind(), StatusKind::Warning);
        assert!(!err.is_fatal());
    }

    #[test]
    fn startup_errors_are_fatal() {
        for err in [
            VoicewireError::Credential("no secret".into()),
            VoicewireError::Signalling {
                status: 401,
                message: "bad token".into(),
            },
            VoicewireError::Microphone("denied".into()),
        ] {
            assert_eq!(err.status_kind(), StatusKind::Error);
            assert!(err.is_fatal());
        }
    }
}
