//! Media transport seam.
//!
//! The peer connection, microphone tracks, and data channel are platform
//! capabilities with no portable implementation, so the session controller
//! drives them through these traits. Embedders supply an adapter over
//! their WebRTC binding; tests supply scripted fakes.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::VoicewireError;

/// Peer-connection state transitions reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Events a transport delivers to the session controller, in order.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The control channel became writable. Trigger point for one-time
    /// setup messages.
    ChannelOpen,
    /// An inbound message on the control channel. Delivery order matches
    /// arrival order.
    ChannelMessage(String),
    /// The peer connection changed state.
    ConnectionState(ConnectionState),
}

/// Ordered bidirectional message channel over the peer connection.
///
/// Writes are only valid while the channel reports open; callers gate on
/// `is_open` rather than queueing.
#[async_trait]
pub trait RawControlChannel: Send + Sync {
    fn is_open(&self) -> bool;

    async fn send_text(&self, payload: &str) -> Result<(), VoicewireError>;
}

/// Platform media session: a peer connection plus the local microphone.
///
/// Call order is fixed: `open` acquires hardware and creates the
/// connection, `create_control_channel` must precede `create_offer` so the
/// channel is negotiated in the initial offer/answer, and `apply_answer`
/// completes the exchange. `close` is idempotent.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Create the peer connection and acquire the microphone.
    ///
    /// Returns the event stream for this connection attempt. Fails with
    /// `Microphone` when access is denied or no device is available.
    async fn open(&self) -> Result<mpsc::Receiver<TransportEvent>, VoicewireError>;

    /// Negotiate the control channel. Must be called before `create_offer`.
    async fn create_control_channel(&self) -> Result<Arc<dyn RawControlChannel>, VoicewireError>;

    /// Create and set the local session description; returns its SDP text.
    async fn create_offer(&self) -> Result<String, VoicewireError>;

    /// Set the remote session description from the signalling exchange.
    async fn apply_answer(&self, answer_sdp: &str) -> Result<(), VoicewireError>;

    /// Stop local media tracks and close the connection. Safe to call
    /// multiple times and on a never-opened transport.
    async fn close(&self);
}
