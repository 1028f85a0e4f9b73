//! Shared test fixtures: a scripted media transport that records call
//! order and lets tests drive transport events by hand.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use voicewire::error::VoicewireError;
use voicewire::transport::{MediaTransport, RawControlChannel, TransportEvent};

pub const OFFER_SDP: &str = "v=0\r\no=- 4611731400430051336 2 IN IP4 127.0.0.1\r\ns=-\r\n";
pub const ANSWER_SDP: &str = "v=0\r\no=- 8447919763360361462 2 IN IP4 127.0.0.1\r\ns=-\r\n";

/// Data channel fake: records every payload written while open, rejects
/// writes while closed.
pub struct FakeChannel {
    open: AtomicBool,
    sent: Mutex<Vec<String>>,
}

impl FakeChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            open: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// The `type` discriminator of every payload sent, in order.
    pub fn sent_types(&self) -> Vec<String> {
        self.sent()
            .iter()
            .map(|raw| {
                serde_json::from_str::<serde_json::Value>(raw)
                    .ok()
                    .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(String::from))
                    .unwrap_or_default()
            })
            .collect()
    }
}

#[async_trait]
impl RawControlChannel for FakeChannel {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn send_text(&self, payload: &str) -> Result<(), VoicewireError> {
        if !self.is_open() {
            return Err(VoicewireError::ChannelSend("channel is closed".to_string()));
        }
        self.sent.lock().unwrap().push(payload.to_string());
        Ok(())
    }
}

/// Media transport fake. Each `open` hands out a fresh event stream, as a
/// real adapter would create a fresh peer connection per attempt.
pub struct FakeTransport {
    calls: Mutex<Vec<&'static str>>,
    deny_microphone: AtomicBool,
    channel: Arc<FakeChannel>,
    event_tx: Mutex<Option<mpsc::Sender<TransportEvent>>>,
    close_count: AtomicUsize,
    applied_answers: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            deny_microphone: AtomicBool::new(false),
            channel: FakeChannel::new(),
            event_tx: Mutex::new(None),
            close_count: AtomicUsize::new(0),
            applied_answers: Mutex::new(Vec::new()),
        })
    }

    pub fn deny_microphone(&self) {
        self.deny_microphone.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    pub fn applied_answers(&self) -> Vec<String> {
        self.applied_answers.lock().unwrap().clone()
    }

    pub fn channel(&self) -> Arc<FakeChannel> {
        Arc::clone(&self.channel)
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    /// Push a transport event as the platform would.
    pub async fn emit(&self, event: TransportEvent) {
        let tx = self.event_tx.lock().unwrap().clone();
        if let Some(tx) = tx {
            tx.send(event).await.expect("event receiver dropped");
        }
    }

    /// Mark the control channel writable and announce it.
    pub async fn open_channel(&self) {
        self.channel.set_open(true);
        self.emit(TransportEvent::ChannelOpen).await;
    }
}

#[async_trait]
impl MediaTransport for FakeTransport {
    async fn open(&self) -> Result<mpsc::Receiver<TransportEvent>, VoicewireError> {
        self.record("open");
        if self.deny_microphone.load(Ordering::SeqCst) {
            return Err(VoicewireError::Microphone(
                "Microphone permission denied".to_string(),
            ));
        }
        let (tx, rx) = mpsc::channel(32);
        *self.event_tx.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn create_control_channel(
        &self,
    ) -> Result<Arc<dyn RawControlChannel>, VoicewireError> {
        self.record("create_control_channel");
        self.channel.set_open(false);
        Ok(Arc::clone(&self.channel) as Arc<dyn RawControlChannel>)
    }

    async fn create_offer(&self) -> Result<String, VoicewireError> {
        self.record("create_offer");
        Ok(OFFER_SDP.to_string())
    }

    async fn apply_answer(&self, answer_sdp: &str) -> Result<(), VoicewireError> {
        self.record("apply_answer");
        self.applied_answers
            .lock()
            .unwrap()
            .push(answer_sdp.to_string());
        Ok(())
    }

    async fn close(&self) {
        self.record("close");
        self.close_count.fetch_add(1, Ordering::SeqCst);
        self.channel.set_open(false);
        // Dropping the sender ends the event stream for this attempt.
        self.event_tx.lock().unwrap().take();
    }
}

/// Poll a condition until it holds, panicking after one second.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 1s");
}
