//! UI-facing session status types.

use crate::error::StatusKind;

/// Lifecycle state of a voice session. Owned exclusively by the
/// controller; mutated only by its sequencing and transport events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    Failed,
    Closed,
}

/// One status line plus a classification driving the UI icon.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub message: String,
    pub kind: StatusKind,
}

impl StatusLine {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: StatusKind::Error,
        }
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::info("Idle")
    }
}

/// Events broadcast to UI subscribers.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The status line changed.
    Status(StatusLine),
    /// The most recent completed transcript (empty string on teardown).
    Transcript(String),
    /// Application-level error from the remote service; session stays open.
    RemoteError(String),
    /// Teardown finished.
    Ended,
}
