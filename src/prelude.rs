//! Convenience re-exports for common use.

pub use crate::channel::{ControlChannel, InboundEvent, OutboundEvent};
pub use crate::config::{DocumentContext, SessionConfig};
pub use crate::error::{Result, StatusKind, VoicewireError};
pub use crate::session::{SessionController, SessionEvent, SessionState, StatusLine};
pub use crate::signalling::{Credential, SignallingClient};
pub use crate::transport::{ConnectionState, MediaTransport, RawControlChannel, TransportEvent};
