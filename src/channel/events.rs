//! Control event wire types.
//!
//! Each event is a self-contained JSON object with a `type` discriminator.
//! The channel is an ordered stream, not a request/response protocol; no
//! event references another.

use serde::Serialize;

use crate::error::VoicewireError;

/// Outbound control events.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum OutboundEvent {
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionUpdate },
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: ConversationItem },
    #[serde(rename = "response.create")]
    ResponseCreate { response: ResponseRequest },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionUpdate {
    pub instructions: String,
    pub modalities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConversationItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub role: String,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "input_text")]
    InputText { text: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponseRequest {
    pub conversation: String,
    pub modalities: Vec<String>,
}

impl OutboundEvent {
    pub fn session_update(instructions: impl Into<String>, modalities: Vec<String>) -> Self {
        Self::SessionUpdate {
            session: SessionUpdate {
                instructions: instructions.into(),
                modalities,
            },
        }
    }

    /// A single user message carrying the given text parts.
    pub fn user_message(parts: Vec<String>) -> Self {
        Self::ConversationItemCreate {
            item: ConversationItem {
                kind: "message".to_string(),
                role: "user".to_string(),
                content: parts
                    .into_iter()
                    .map(|text| ContentPart::InputText { text })
                    .collect(),
            },
        }
    }

    pub fn response_create(modalities: Vec<String>) -> Self {
        Self::ResponseCreate {
            response: ResponseRequest {
                conversation: "auto".to_string(),
                modalities,
            },
        }
    }

    /// Wire-level type discriminator, for logging and tests.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionUpdate { .. } => "session.update",
            Self::ConversationItemCreate { .. } => "conversation.item.create",
            Self::ResponseCreate { .. } => "response.create",
        }
    }
}

/// Inbound control events. Forward-incompatible types parse as `Unknown`
/// so the channel never fails on events it does not understand.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    TranscriptInterim { text: String },
    TranscriptDone { text: String },
    ResponseDone,
    ResponseError { message: String },
    Unknown { event_type: String },
}

impl InboundEvent {
    /// Parse a raw channel payload.
    ///
    /// Anything that is not a JSON object with a string `type` is a
    /// `Parse` error (recovered by the caller); a recognizable envelope
    /// with an unrecognized `type` is `Unknown`.
    pub fn parse(raw: &str) -> Result<Self, VoicewireError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|err| VoicewireError::Parse(format!("malformed control message: {err}")))?;
        let event_type = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                VoicewireError::Parse("control message missing string `type`".to_string())
            })?;

        let event = match event_type {
            "transcript.interim" => Self::TranscriptInterim {
                text: text_field(&value)?,
            },
            "transcript.done" => Self::TranscriptDone {
                text: text_field(&value)?,
            },
            "response.done" => Self::ResponseDone,
            "response.error" => Self::ResponseError {
                message: error_message(&value),
            },
            other => Self::Unknown {
                event_type: other.to_string(),
            },
        };
        Ok(event)
    }
}

fn text_field(value: &serde_json::Value) -> Result<String, VoicewireError> {
    value
        .get("text")
        .and_then(|t| t.as_str())
        .map(ToString::to_string)
        .ok_or_else(|| VoicewireError::Parse("transcript event missing `text`".to_string()))
}

/// Pull a human-readable message out of a `response.error` payload,
/// accepting both nested (`error.message`) and flat (`message`) shapes.
fn error_message(value: &serde_json::Value) -> String {
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .or_else(|| value.get("message").and_then(|m| m.as_str()))
        .unwrap_or("remote error")
        .to_string()
}
