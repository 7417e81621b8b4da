//! The bridge state machine: connection lifecycle and line forwarding.
//!
//! One [`Bridge`] owns the two external resources — the outbound TCP
//! transport and the serial source — and reacts to readiness events from
//! both.  There is no polling: the run loop sleeps on one mpsc channel (plus
//! a redial timer while waiting out a failure) and every state transition
//! happens in response to an event.
//!
//! # Lifecycle
//!
//! ```text
//!                  dial ok (open source)
//!   Connecting ──────────────────────────→ Connected
//!       ↑  │ dial failed                       │ remote close / transport
//!       │  ↓                                   │ error / source error:
//!       │  ReconnectWait ←─────────────────────┘ close source, drop writer
//!       │       │
//!       └───────┘ fixed delay elapsed (non-blocking timer)
//!
//!   Shutdown event (from any state) → Disconnected → run loop returns
//! ```
//!
//! The bridge is created once per process and never reconstructed; failures
//! are handled by the transitions above.  Retries continue forever with a
//! fixed delay — no backoff growth, no jitter, no cap.
//!
//! # Forwarding contract
//!
//! - The source is open *only* while the state is `Connected`.
//! - Complete `\n`-terminated lines are written verbatim, exactly once, in
//!   arrival order, while the transport is writable.
//! - Empty lines (terminator with no content) are skipped.
//! - If the transport is unavailable when source bytes arrive, that data —
//!   including any buffered partial line — is discarded, never retried.

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::domain::line_buffer::{is_empty_line, LineBuffer};
use crate::domain::{BridgeConfig, TransportState};
use crate::infrastructure::serial::LineSource;
use crate::infrastructure::transport::Connector;

/// Bounded queue between the resource tasks and the run loop.
const EVENT_CHANNEL_CAPACITY: usize = 128;

/// A readiness or error notification delivered to the bridge.
#[derive(Debug)]
pub enum BridgeEvent {
    /// Raw bytes read from the serial source.
    SourceData(Vec<u8>),
    /// The serial source failed at runtime (read error or device EOF).
    SourceError(String),
    /// The remote listener closed the connection cleanly.
    TransportClosed {
        /// Connection generation the watcher was created for.
        generation: u64,
    },
    /// The established connection failed.
    TransportError {
        generation: u64,
        error: String,
    },
    /// Deliberate stop (Ctrl+C).  Ends the run loop.
    Shutdown,
}

/// The sole stateful entity: owns the transport writer, the source handle,
/// and the pending line buffer.
pub struct Bridge<C: Connector, S: LineSource> {
    config: BridgeConfig,
    connector: C,
    source: S,
    state: TransportState,
    /// Present exactly while `state == Connected`.
    writer: Option<C::Writer>,
    lines: LineBuffer,
    /// Incremented on every dial attempt; transport events carrying an older
    /// generation belong to a connection that was already torn down.
    generation: u64,
    events_tx: mpsc::Sender<BridgeEvent>,
}

impl<C: Connector, S: LineSource> Bridge<C, S> {
    /// Creates the bridge and the event channel its resources report into.
    ///
    /// The returned receiver must be passed to [`run`](Bridge::run).  Extra
    /// senders (for the shutdown signal) come from
    /// [`event_sender`](Bridge::event_sender).
    pub fn new(config: BridgeConfig, connector: C, source: S) -> (Self, mpsc::Receiver<BridgeEvent>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let bridge = Self {
            config,
            connector,
            source,
            state: TransportState::Connecting,
            writer: None,
            lines: LineBuffer::new(),
            generation: 0,
            events_tx,
        };
        (bridge, events_rx)
    }

    /// Returns a sender for injecting events (used for the shutdown signal).
    pub fn event_sender(&self) -> mpsc::Sender<BridgeEvent> {
        self.events_tx.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Drives the bridge until shutdown.
    ///
    /// The loop is single-task and cooperative: dial attempts are awaited
    /// inline (so at most one is ever outstanding), and the redial delay is
    /// a timer `select`ed against the event channel, so late notifications
    /// from a dying connection are still serviced during the wait instead of
    /// stalling behind it.
    pub async fn run(mut self, mut events: mpsc::Receiver<BridgeEvent>) {
        info!(
            device = %self.config.device,
            remote = %self.config.remote_addr(),
            "bridge starting"
        );

        loop {
            match self.state {
                TransportState::Connecting => self.dial().await,

                TransportState::Connected => match events.recv().await {
                    Some(event) => self.handle_event(event).await,
                    None => self.shutdown("event channel closed"),
                },

                TransportState::ReconnectWait => {
                    debug!(delay = ?self.config.reconnect_delay, "waiting before redial");
                    let retry = tokio::time::sleep(self.config.reconnect_delay);
                    tokio::pin!(retry);

                    // Keep servicing events for the whole delay window; only
                    // the timer expiry moves the machine back to Connecting.
                    while self.state == TransportState::ReconnectWait {
                        tokio::select! {
                            _ = &mut retry => {
                                self.state = TransportState::Connecting;
                            }
                            maybe_event = events.recv() => match maybe_event {
                                Some(event) => self.handle_event(event).await,
                                None => self.shutdown("event channel closed"),
                            },
                        }
                    }
                }

                TransportState::Disconnected => break,
            }
        }

        info!("bridge stopped");
    }

    /// Makes exactly one dial attempt and applies the outcome.
    async fn dial(&mut self) {
        let addr = self.config.remote_addr();
        self.generation += 1;
        debug!(%addr, generation = self.generation, "dialing remote listener");

        match self
            .connector
            .connect(self.generation, self.events_tx.clone())
            .await
        {
            Ok(writer) => {
                info!(%addr, "transport connected");
                self.writer = Some(writer);
                self.state = TransportState::Connected;

                // The source is opened on entering Connected and nowhere else.
                if let Err(e) = self.source.open(self.events_tx.clone()) {
                    // Known gap carried over from the original relay: the
                    // open is not retried and the transport stays up even
                    // though nothing will be forwarded.
                    error!("failed to open source: {e}");
                }
            }
            Err(e) => {
                warn!(%addr, "connect failed: {e}");
                self.state = TransportState::ReconnectWait;
            }
        }
    }

    /// Applies one event to the state machine.
    async fn handle_event(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::SourceData(chunk) => self.drain(&chunk).await,

            BridgeEvent::SourceError(reason) => self.on_source_error(reason),

            BridgeEvent::TransportClosed { generation } => {
                if self.is_stale(generation) {
                    debug!(generation, "ignoring close from a torn-down connection");
                    return;
                }
                info!("remote closed the connection");
                self.teardown();
                // A clean close is recovered from just like an error; see
                // DESIGN.md for the rationale.
                self.state = TransportState::ReconnectWait;
            }

            BridgeEvent::TransportError { generation, error } => {
                if self.is_stale(generation) {
                    debug!(generation, "ignoring error from a torn-down connection");
                    return;
                }
                warn!("transport error: {error}");
                self.teardown();
                self.state = TransportState::ReconnectWait;
            }

            BridgeEvent::Shutdown => self.shutdown("shutdown requested"),
        }
    }

    /// One readiness pass: forward every complete line currently buffered.
    ///
    /// The drain is bounded by "no more complete lines", not by a single
    /// write.  Unavailability of the transport at any point discards the
    /// pass's data (chunk and pending partial alike) — memory stays bounded
    /// and the next pass after a reconnect starts clean.
    async fn drain(&mut self, chunk: &[u8]) {
        if !self.transport_writable() {
            debug!(
                dropped = chunk.len() + self.lines.len(),
                "transport unavailable; dropping source bytes"
            );
            self.lines.clear();
            return;
        }

        self.lines.extend(chunk);

        while let Some(line) = self.lines.next_line() {
            if !self.transport_writable() {
                self.lines.clear();
                return;
            }
            if is_empty_line(&line) {
                continue;
            }

            let Some(writer) = self.writer.as_mut() else {
                self.lines.clear();
                return;
            };
            // Verbatim: no framing, no terminator normalization.
            let result = writer.write_all(&line).await;
            match result {
                Ok(()) => trace!(bytes = line.len(), "line forwarded"),
                Err(e) => {
                    warn!("write to transport failed: {e}");
                    self.teardown();
                    self.state = TransportState::ReconnectWait;
                    return;
                }
            }
        }
    }

    /// Source runtime failure: close the source and recycle the transport.
    ///
    /// Re-dialing is the only path that reopens the source, so tearing the
    /// (healthy) connection down is what restores service while keeping the
    /// "source open iff connected" invariant intact.
    fn on_source_error(&mut self, reason: String) {
        if !self.state.is_connected() {
            // Late report from a reader that was already told to stop.
            debug!(state = %self.state, "ignoring source error: {reason}");
            return;
        }
        error!("source error: {reason}");
        self.teardown();
        self.state = TransportState::ReconnectWait;
    }

    /// `true` when a transport event does not refer to the connection the
    /// bridge currently cares about.
    fn is_stale(&self, generation: u64) -> bool {
        generation != self.generation || !self.state.is_connected()
    }

    /// `true` while lines may be written.
    fn transport_writable(&self) -> bool {
        self.state.is_connected() && self.writer.is_some()
    }

    /// Releases both resources: closes the source, drops the writer (which
    /// shuts the TCP send direction), and discards any pending partial line.
    fn teardown(&mut self) {
        self.source.close();
        self.writer = None;
        self.lines.clear();
    }

    fn shutdown(&mut self, reason: &str) {
        info!("stopping: {reason}");
        self.teardown();
        self.state = TransportState::Disconnected;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
