//! Voicewire: realtime voice session client.
//!
//! Client-side plumbing for short-lived realtime voice sessions: a
//! signalling client (credential fetch + SDP offer/answer exchange over
//! HTTPS), a typed JSON control channel, and a session controller that
//! sequences startup and guarantees symmetric teardown.
//!
//! The peer connection, microphone, and data channel are platform
//! capabilities, so they sit behind the [`transport::MediaTransport`]
//! trait; embedders plug in a WebRTC binding (or a fake, for tests) and
//! drive the session through [`session::SessionController`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use voicewire::prelude::*;
//!
//! # async fn example(transport: Arc<dyn voicewire::transport::MediaTransport>) -> voicewire::error::Result<()> {
//! let config = SessionConfig::new("https://backend.example/api/voice/key")
//!     .with_instructions("You are a friendly voice tutor.");
//! let controller = SessionController::new(config, transport);
//! controller.start().await?;
//! // ... later
//! controller.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod prelude;
pub mod session;
pub mod signalling;
pub mod transport;
pub mod util;
