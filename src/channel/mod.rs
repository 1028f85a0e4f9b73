//! Control channel: typed JSON control events over the transport's
//! ordered data channel.

pub mod events;

pub use events::{ContentPart, InboundEvent, OutboundEvent};

use std::sync::Arc;

use crate::config::SessionConfig;
use crate::error::VoicewireError;
use crate::transport::RawControlChannel;

/// Typed wrapper over the transport's raw message channel.
pub struct ControlChannel {
    raw: Arc<dyn RawControlChannel>,
}

impl ControlChannel {
    pub fn new(raw: Arc<dyn RawControlChannel>) -> Self {
        Self { raw }
    }

    pub fn is_open(&self) -> bool {
        self.raw.is_open()
    }

    /// Serialize and write one event.
    ///
    /// Writes before the channel reports open are a caller error; they are
    /// rejected, never queued.
    pub async fn send(&self, event: &OutboundEvent) -> Result<(), VoicewireError> {
        if !self.raw.is_open() {
            return Err(VoicewireError::ChannelSend(format!(
                "channel not open; refusing to send {}",
                event.event_type()
            )));
        }
        let payload = serde_json::to_string(event)
            .map_err(|err| VoicewireError::ChannelSend(err.to_string()))?;
        tracing::trace!(event_type = event.event_type(), "sending control event");
        self.raw.send_text(&payload).await
    }

    /// One-time setup on channel open: session configuration, then the
    /// document context as two text parts, then a response trigger.
    ///
    /// All-or-nothing: if the caller did not opt in, the context is absent
    /// or empty, or the channel is not open, nothing is sent and the reason
    /// is logged. Returns whether the sequence ran.
    pub async fn run_initial_setup(
        &self,
        config: &SessionConfig,
    ) -> Result<bool, VoicewireError> {
        if !config.send_context {
            tracing::debug!("context injection not enabled; skipping setup sequence");
            return Ok(false);
        }
        let Some(context) = config.context.as_ref().filter(|c| c.has_content()) else {
            tracing::debug!("no context content supplied; skipping setup sequence");
            return Ok(false);
        };
        if !self.is_open() {
            tracing::debug!("channel not open; skipping setup sequence");
            return Ok(false);
        }

        self.send(&OutboundEvent::session_update(
            config.instructions.clone(),
            config.modalities.clone(),
        ))
        .await?;
        self.send(&OutboundEvent::user_message(vec![
            format!("Document title: {}", context.title),
            context.content.clone(),
        ]))
        .await?;
        self.send(&OutboundEvent::response_create(config.modalities.clone()))
            .await?;

        tracing::debug!(title = %context.title, "context setup sequence sent");
        Ok(true)
    }
}

/// Outcome of dispatching one inbound payload that the controller must
/// act on. `None` covers interim transcripts, informational completions,
/// unknown event types, and malformed payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelUpdate {
    /// A completed utterance; replaces the current transcript.
    Transcript(String),
    /// The remote service reported an application-level error. The session
    /// stays open.
    RemoteError(String),
}

/// Dispatch one raw inbound message by its `type` discriminator.
///
/// Never panics and never fails the session: malformed payloads and
/// forward-incompatible event types are logged and dropped.
pub fn dispatch(raw: &str) -> Option<ChannelUpdate> {
    match InboundEvent::parse(raw) {
        Ok(InboundEvent::TranscriptDone { text }) => Some(ChannelUpdate::Transcript(text)),
        Ok(InboundEvent::TranscriptInterim { .. }) => None,
        Ok(InboundEvent::ResponseDone) => {
            tracing::trace!("response completed");
            None
        }
        Ok(InboundEvent::ResponseError { message }) => Some(ChannelUpdate::RemoteError(message)),
        Ok(InboundEvent::Unknown { event_type }) => {
            tracing::debug!(%event_type, "ignoring unknown control event");
            None
        }
        Err(err) => {
            tracing::warn!(%err, "dropping malformed control message");
            None
        }
    }
}
