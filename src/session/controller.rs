//! Session controller: sequences signalling, media transport, and control
//! channel, and guarantees symmetric teardown.
//!
//! Startup is strictly sequential (credential, microphone/peer
//! connection, control channel, offer, exchange, answer) because each
//! step depends on the previous one's output. Every external call is a
//! single attempt; any failure is terminal for the attempt and requires a
//! manual restart. Silent retries would risk consuming a second session
//! credential.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::channel::{self, ChannelUpdate, ControlChannel};
use crate::config::SessionConfig;
use crate::error::VoicewireError;
use crate::session::status::{SessionEvent, SessionState, StatusLine};
use crate::signalling::SignallingClient;
use crate::transport::{ConnectionState, MediaTransport, TransportEvent};

type TranscriptCallback = Box<dyn Fn(&str) + Send + Sync>;

struct Inner {
    session_id: String,
    state: RwLock<SessionState>,
    status: RwLock<StatusLine>,
    transcript: RwLock<String>,
    /// Bumped on every teardown; in-flight startup steps compare against
    /// the generation they started under and discard stale results.
    generation: AtomicU64,
    events: broadcast::Sender<SessionEvent>,
    shutdown: broadcast::Sender<()>,
    transcript_callback: RwLock<Option<TranscriptCallback>>,
}

impl Inner {
    fn set_state(&self, new_state: SessionState) {
        *self.state.write().unwrap() = new_state;
    }

    fn set_status(&self, line: StatusLine) {
        *self.status.write().unwrap() = line.clone();
        let _ = self.events.send(SessionEvent::Status(line));
    }

    fn set_transcript(&self, text: String) {
        *self.transcript.write().unwrap() = text.clone();
        if let Some(callback) = self.transcript_callback.read().unwrap().as_ref() {
            callback(&text);
        }
        let _ = self.events.send(SessionEvent::Transcript(text));
    }
}

/// Orchestrates one realtime voice session at a time over an injected
/// media transport.
///
/// The transport, its control channel, and the microphone tracks are
/// exclusively owned by one controller instance; `start` while a session
/// is connecting or connected is a no-op.
pub struct SessionController {
    config: SessionConfig,
    signalling: SignallingClient,
    transport: Arc<dyn MediaTransport>,
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(config: SessionConfig, transport: Arc<dyn MediaTransport>) -> Self {
        let signalling = SignallingClient::new(&config);
        let (events, _) = broadcast::channel(64);
        let (shutdown, _) = broadcast::channel(1);
        Self {
            config,
            signalling,
            transport,
            inner: Arc::new(Inner {
                session_id: Uuid::new_v4().to_string(),
                state: RwLock::new(SessionState::Idle),
                status: RwLock::new(StatusLine::default()),
                transcript: RwLock::new(String::new()),
                generation: AtomicU64::new(0),
                events,
                shutdown,
                transcript_callback: RwLock::new(None),
            }),
        }
    }

    /// Register a callback for completed transcripts. Invoked with the
    /// latest utterance on each `transcript.done`, and with the empty
    /// string on teardown.
    pub fn on_transcript(&self, callback: impl Fn(&str) + Send + Sync + 'static) {
        *self.inner.transcript_callback.write().unwrap() = Some(Box::new(callback));
    }

    /// Subscribe to session events (status, transcript, remote errors,
    /// teardown).
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.read().unwrap()
    }

    pub fn status(&self) -> StatusLine {
        self.inner.status.read().unwrap().clone()
    }

    /// The most recent completed utterance; empty when none has arrived
    /// or after teardown.
    pub fn transcript(&self) -> String {
        self.inner.transcript.read().unwrap().clone()
    }

    pub fn connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    pub fn connecting(&self) -> bool {
        self.state() == SessionState::Connecting
    }

    /// Start a session. No-op if one is already connecting or connected.
    ///
    /// On failure the status line carries the error text and
    /// classification, teardown has already run, and the caller may invoke
    /// `start` again.
    pub async fn start(&self) -> Result<(), VoicewireError> {
        {
            let mut state = self.inner.state.write().unwrap();
            if matches!(*state, SessionState::Connecting | SessionState::Connected) {
                tracing::debug!(session_id = %self.inner.session_id, "start ignored: session already active");
                return Ok(());
            }
            *state = SessionState::Connecting;
        }
        self.inner.set_status(StatusLine::info("Connecting..."));
        let generation = self.inner.generation.load(Ordering::SeqCst);

        match self.connect(generation).await {
            Ok(()) => Ok(()),
            Err(err) => {
                if self.is_stale(generation) {
                    // Stopped mid-connect; the failure belongs to a session
                    // the user already abandoned.
                    tracing::debug!(session_id = %self.inner.session_id, %err, "discarding error from cancelled connect");
                    return Ok(());
                }
                tracing::warn!(session_id = %self.inner.session_id, %err, "session start failed");
                Self::teardown(
                    &self.inner,
                    &self.transport,
                    StatusLine {
                        message: err.to_string(),
                        kind: err.status_kind(),
                    },
                    SessionState::Failed,
                )
                .await;
                Err(err)
            }
        }
    }

    async fn connect(&self, generation: u64) -> Result<(), VoicewireError> {
        let credential = self.signalling.get_credential().await?;
        if self.is_stale(generation) {
            return Ok(());
        }

        // Microphone + peer connection. Nothing touches the hardware until
        // a credential is in hand.
        let events = self.transport.open().await?;
        if self.is_stale(generation) {
            self.transport.close().await;
            return Ok(());
        }

        // The control channel must exist before the offer so it is
        // negotiated in the initial offer/answer exchange.
        let raw_channel = self.transport.create_control_channel().await?;
        let control = Arc::new(ControlChannel::new(raw_channel));
        self.spawn_event_reader(events, control, generation);

        let offer = self.transport.create_offer().await?;
        if self.is_stale(generation) {
            self.transport.close().await;
            return Ok(());
        }

        let answer = self
            .signalling
            .exchange_session_description(&offer, &credential)
            .await?;
        if self.is_stale(generation) {
            self.transport.close().await;
            return Ok(());
        }

        self.transport.apply_answer(&answer).await?;
        // Status flips to Connected when the transport reports the channel
        // open; until then the session stays in Connecting.
        Ok(())
    }

    /// Stop the session and release the transport. Idempotent; safe to
    /// call from multiple triggers concurrently.
    pub async fn stop(&self) {
        Self::teardown(
            &self.inner,
            &self.transport,
            StatusLine::info("Disconnected"),
            SessionState::Closed,
        )
        .await;
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) != generation
    }

    fn spawn_event_reader(
        &self,
        mut events: mpsc::Receiver<TransportEvent>,
        control: Arc<ControlChannel>,
        generation: u64,
    ) {
        let inner = Arc::clone(&self.inner);
        let transport = Arc::clone(&self.transport);
        let config = self.config.clone();
        let mut shutdown = self.inner.shutdown.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.recv() => {
                        tracing::debug!(session_id = %inner.session_id, "event reader shutting down");
                        break;
                    }
                    event = events.recv() => {
                        let Some(event) = event else { break };
                        if inner.generation.load(Ordering::SeqCst) != generation {
                            break;
                        }
                        match event {
                            TransportEvent::ChannelOpen => {
                                inner.set_state(SessionState::Connected);
                                match control.run_initial_setup(&config).await {
                                    Ok(sent) => {
                                        tracing::debug!(session_id = %inner.session_id, context_sent = sent, "control channel open");
                                        inner.set_status(StatusLine::success("Connected"));
                                    }
                                    Err(err) => {
                                        tracing::warn!(session_id = %inner.session_id, %err, "initial setup failed");
                                        inner.set_status(StatusLine::warning(err.to_string()));
                                    }
                                }
                            }
                            TransportEvent::ChannelMessage(raw) => match channel::dispatch(&raw) {
                                Some(ChannelUpdate::Transcript(text)) => {
                                    inner.set_transcript(text);
                                }
                                Some(ChannelUpdate::RemoteError(message)) => {
                                    inner.set_status(StatusLine::warning(format!(
                                        "Assistant error: {message}"
                                    )));
                                    let _ = inner.events.send(SessionEvent::RemoteError(message));
                                }
                                None => {}
                            },
                            TransportEvent::ConnectionState(state) => match state {
                                ConnectionState::Failed => {
                                    Self::teardown(
                                        &inner,
                                        &transport,
                                        StatusLine::error("Connection failed"),
                                        SessionState::Failed,
                                    )
                                    .await;
                                    break;
                                }
                                ConnectionState::Disconnected | ConnectionState::Closed => {
                                    Self::teardown(
                                        &inner,
                                        &transport,
                                        StatusLine::info("Disconnected"),
                                        SessionState::Closed,
                                    )
                                    .await;
                                    break;
                                }
                                ConnectionState::Connecting | ConnectionState::Connected => {
                                    tracing::trace!(session_id = %inner.session_id, ?state, "connection state");
                                }
                            },
                        }
                    }
                }
            }
        });
    }

    /// Shared teardown path for explicit stop, connection failure, and
    /// startup errors. Every step is idempotent: the generation bump makes
    /// in-flight startup results stale, the transport's `close` tolerates
    /// repeats, and the transcript/status writes converge on the same end
    /// state.
    async fn teardown(
        inner: &Arc<Inner>,
        transport: &Arc<dyn MediaTransport>,
        status: StatusLine,
        state: SessionState,
    ) {
        inner.generation.fetch_add(1, Ordering::SeqCst);
        let _ = inner.shutdown.send(());

        transport.close().await;

        inner.set_transcript(String::new());
        inner.set_state(state);
        inner.set_status(status);
        let _ = inner.events.send(SessionEvent::Ended);
        tracing::debug!(session_id = %inner.session_id, ?state, "session torn down");
    }
}
