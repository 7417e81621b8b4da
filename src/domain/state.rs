//! The transport connection state machine.
//!
//! [`TransportState`] names the four phases of the outbound TCP connection's
//! lifecycle.  The transitions themselves live in
//! [`Bridge`](crate::application::bridge::Bridge); keeping the state an
//! I/O-free enum lets unit tests assert on it directly.

use std::fmt;

/// Connection phase of the outbound transport.
///
/// ```text
///                 dial ok
///   Connecting ────────────→ Connected
///       ↑  │ dial failed        │  remote close / transport error /
///       │  ↓                    │  source runtime error
///       │  ReconnectWait ←──────┘
///       │       │
///       └───────┘ fixed delay elapsed
///
///   Disconnected: deliberate resting state, entered only on shutdown.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// No connection and no intent to make one.  Entered on shutdown.
    Disconnected,
    /// A dial attempt to the remote listener is outstanding.  Initial state.
    Connecting,
    /// The transport is established and writable; the source is open and
    /// forwarding is active.
    Connected,
    /// Waiting out the fixed delay before the next dial attempt.
    ReconnectWait,
}

impl TransportState {
    /// `true` only in [`TransportState::Connected`] — the sole state in
    /// which the serial source may be open and lines may be written.
    pub fn is_connected(self) -> bool {
        matches!(self, TransportState::Connected)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportState::Disconnected => "disconnected",
            TransportState::Connecting => "connecting",
            TransportState::Connected => "connected",
            TransportState::ReconnectWait => "reconnect-wait",
        };
        f.write_str(name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
