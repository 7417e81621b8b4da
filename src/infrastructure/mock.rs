//! Mock transport and source for unit testing.
//!
//! Allows tests to drive the [`Bridge`](crate::application::bridge::Bridge)
//! through every state transition without a serial device or a live network
//! peer.
//!
//! Both mocks keep their state behind an `Arc<Mutex<…>>` and are `Clone`:
//! the test hands one clone to the bridge and keeps another to inject events
//! and inspect what happened.

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::bridge::BridgeEvent;
use crate::infrastructure::serial::{LineSource, SourceError};
use crate::infrastructure::transport::Connector;

// ── Mock source ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct MockSourceInner {
    /// Present while the source is "open"; used to inject data.
    events: Option<mpsc::Sender<BridgeEvent>>,
    open_count: u32,
    close_count: u32,
    /// When `true`, the next `open()` fails once.
    fail_next_open: bool,
}

/// A mock implementation of [`LineSource`] that lets tests inject chunks.
#[derive(Clone, Default)]
pub struct MockLineSource {
    inner: Arc<Mutex<MockSourceInner>>,
}

impl MockLineSource {
    /// Creates a new, closed mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `open()` call fail with [`SourceError::OpenFailed`].
    pub fn fail_next_open(&self) {
        self.inner.lock().expect("lock poisoned").fail_next_open = true;
    }

    /// Injects a chunk, as if the device had produced it.
    ///
    /// Panics if the source is not open — injecting into a closed source is
    /// always a test bug.
    pub fn inject_data(&self, chunk: &[u8]) {
        let guard = self.inner.lock().expect("lock poisoned");
        let sender = guard
            .events
            .as_ref()
            .expect("MockLineSource::inject_data called while closed");
        sender
            .try_send(BridgeEvent::SourceData(chunk.to_vec()))
            .expect("bridge event channel full or closed");
    }

    /// Injects a source runtime error, as if the device had failed.
    pub fn inject_error(&self, reason: &str) {
        let guard = self.inner.lock().expect("lock poisoned");
        let sender = guard
            .events
            .as_ref()
            .expect("MockLineSource::inject_error called while closed");
        sender
            .try_send(BridgeEvent::SourceError(reason.to_string()))
            .expect("bridge event channel full or closed");
    }

    /// Number of successful `open()` calls so far.
    pub fn open_count(&self) -> u32 {
        self.inner.lock().expect("lock poisoned").open_count
    }

    /// Number of open→closed transitions so far.
    pub fn close_count(&self) -> u32 {
        self.inner.lock().expect("lock poisoned").close_count
    }
}

impl LineSource for MockLineSource {
    fn open(&mut self, events: mpsc::Sender<BridgeEvent>) -> Result<(), SourceError> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        if inner.fail_next_open {
            inner.fail_next_open = false;
            return Err(SourceError::OpenFailed {
                device: "mock".to_string(),
                reason: "forced open failure".to_string(),
            });
        }
        if inner.events.is_some() {
            return Err(SourceError::AlreadyOpen);
        }
        inner.events = Some(events);
        inner.open_count += 1;
        Ok(())
    }

    fn close(&mut self) {
        let mut inner = self.inner.lock().expect("lock poisoned");
        if inner.events.take().is_some() {
            inner.close_count += 1;
        }
    }

    fn is_open(&self) -> bool {
        self.inner.lock().expect("lock poisoned").events.is_some()
    }
}

// ── Mock connector ────────────────────────────────────────────────────────────

#[derive(Default)]
struct MockConnectorInner {
    attempts: u32,
    /// Number of upcoming dial attempts that will be refused.
    refuse_remaining: u32,
    /// Generation and event channel of the most recent successful dial,
    /// kept so tests can emit transport events for that connection.
    current: Option<(u64, mpsc::Sender<BridgeEvent>)>,
}

/// A mock implementation of [`Connector`] whose writer is a plain `Vec<u8>`,
/// so tests can assert on exactly what the bridge wrote.
#[derive(Clone, Default)]
pub struct MockConnector {
    inner: Arc<Mutex<MockConnectorInner>>,
}

impl MockConnector {
    /// Creates a connector that accepts every dial.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses the next `n` dial attempts with `ConnectionRefused`.
    pub fn refuse_next(&self, n: u32) {
        self.inner.lock().expect("lock poisoned").refuse_remaining = n;
    }

    /// Total dial attempts observed, successful or not.
    pub fn attempts(&self) -> u32 {
        self.inner.lock().expect("lock poisoned").attempts
    }

    /// Emits a clean remote close for the most recent connection.
    pub fn emit_remote_close(&self) {
        let guard = self.inner.lock().expect("lock poisoned");
        let (generation, sender) = guard
            .current
            .as_ref()
            .expect("emit_remote_close called before a successful dial");
        sender
            .try_send(BridgeEvent::TransportClosed {
                generation: *generation,
            })
            .expect("bridge event channel full or closed");
    }

    /// Emits a transport error for the most recent connection.
    pub fn emit_transport_error(&self, error: &str) {
        let guard = self.inner.lock().expect("lock poisoned");
        let (generation, sender) = guard
            .current
            .as_ref()
            .expect("emit_transport_error called before a successful dial");
        sender
            .try_send(BridgeEvent::TransportError {
                generation: *generation,
                error: error.to_string(),
            })
            .expect("bridge event channel full or closed");
    }

    /// Emits a transport error tagged with an arbitrary (possibly stale)
    /// generation.  Used to verify the bridge's stale-event filtering.
    pub fn emit_error_for_generation(&self, generation: u64, error: &str) {
        let guard = self.inner.lock().expect("lock poisoned");
        let (_, sender) = guard
            .current
            .as_ref()
            .expect("emit_error_for_generation called before a successful dial");
        sender
            .try_send(BridgeEvent::TransportError {
                generation,
                error: error.to_string(),
            })
            .expect("bridge event channel full or closed");
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Writer = Vec<u8>;

    async fn connect(
        &mut self,
        generation: u64,
        events: mpsc::Sender<BridgeEvent>,
    ) -> io::Result<Vec<u8>> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.attempts += 1;
        if inner.refuse_remaining > 0 {
            inner.refuse_remaining -= 1;
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "mock connector refused the dial",
            ));
        }
        inner.current = Some((generation, events));
        Ok(Vec::new())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
