//! Session configuration (code > env).

use std::time::Duration;

use crate::error::VoicewireError;

pub const DEFAULT_REALTIME_URL: &str = "https://api.openai.com/v1/realtime";
pub const DEFAULT_MODEL: &str = "gpt-4o-realtime-preview-2024-12-17";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_INSTRUCTIONS: &str =
    "You are a friendly, patient voice tutor. Keep replies short and conversational.";

/// Document text injected into the conversation when the caller opts in.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentContext {
    pub title: String,
    pub content: String,
}

impl DocumentContext {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Context with no usable content is treated as absent.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Configuration for a realtime voice session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend endpoint that mints the short-lived session credential.
    pub credential_url: String,
    /// Remote realtime endpoint for the SDP exchange.
    pub realtime_url: String,
    /// Model identifier appended as the `model` query parameter.
    pub model: String,
    /// System instructions sent in `session.update`.
    pub instructions: String,
    /// Modalities requested for responses.
    pub modalities: Vec<String>,
    /// Whether the one-time context-injection sequence runs on channel open.
    pub send_context: bool,
    /// Document context for the injection sequence.
    pub context: Option<DocumentContext>,
    /// Per-request timeout for the two signalling HTTP calls.
    pub http_timeout: Duration,
}

impl SessionConfig {
    pub fn new(credential_url: impl Into<String>) -> Self {
        Self {
            credential_url: credential_url.into(),
            realtime_url: DEFAULT_REALTIME_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            modalities: vec!["text".to_string()],
            send_context: false,
            context: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn with_realtime_url(mut self, url: impl Into<String>) -> Self {
        self.realtime_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_modalities(mut self, modalities: Vec<String>) -> Self {
        self.modalities = modalities;
        self
    }

    /// Opt in to the context-injection sequence with the given document.
    pub fn with_context(mut self, context: DocumentContext) -> Self {
        self.send_context = true;
        self.context = Some(context);
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Load from environment variables (`VOICEWIRE_*`), reading `.env` if present.
    pub fn from_env() -> Result<Self, VoicewireError> {
        let _ = dotenvy::dotenv();

        let credential_url = std::env::var("VOICEWIRE_CREDENTIAL_URL").map_err(|_| {
            VoicewireError::Configuration("VOICEWIRE_CREDENTIAL_URL is not set".to_string())
        })?;

        let mut config = Self::new(credential_url);
        if let Ok(url) = std::env::var("VOICEWIRE_REALTIME_URL") {
            config.realtime_url = url;
        }
        if let Ok(model) = std::env::var("VOICEWIRE_MODEL") {
            config.model = model;
        }
        if let Ok(instructions) = std::env::var("VOICEWIRE_INSTRUCTIONS") {
            config.instructions = instructions;
        }
        Ok(config)
    }
}
