//! Outbound TCP transport for the bridge.
//!
//! The transport is write-only from the bridge's perspective: forwarded lines
//! go out, nothing meaningful ever comes back.  The read half of the TCP
//! stream is still kept alive on a watcher task, because reading is the only
//! way to learn that the remote listener closed the connection or that the
//! socket failed.
//!
//! # Connection generations
//!
//! The watcher task outlives the connection it observes: after the bridge
//! tears a transport down and redials, the old watcher may still deliver a
//! late EOF or error for the dead socket.  Every dial attempt is therefore
//! tagged with a monotonically increasing *generation*; the bridge ignores
//! transport events whose generation is not current.

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::debug;

use crate::application::bridge::BridgeEvent;

/// Dials the remote listener on behalf of the bridge.
///
/// The production implementation is [`TcpConnector`]; tests use
/// [`MockConnector`](crate::infrastructure::mock::MockConnector).
#[async_trait]
pub trait Connector: Send {
    /// The write-only handle the bridge forwards lines into.
    type Writer: AsyncWrite + Unpin + Send;

    /// Dials the remote listener once.
    ///
    /// On success the implementation must arrange for a
    /// [`BridgeEvent::TransportClosed`] or [`BridgeEvent::TransportError`]
    /// tagged with `generation` to be sent on `events` when the returned
    /// connection later dies.
    ///
    /// There is deliberately no timeout here: the bridge never has more than
    /// one dial outstanding, and an unbounded attempt matches a relay that
    /// must keep trying forever anyway.
    async fn connect(
        &mut self,
        generation: u64,
        events: mpsc::Sender<BridgeEvent>,
    ) -> io::Result<Self::Writer>;
}

/// [`Connector`] implementation backed by `tokio::net::TcpStream`.
pub struct TcpConnector {
    /// `host:port` of the remote listener.  Kept as a string so DNS names
    /// are re-resolved on every dial.
    addr: String,
}

impl TcpConnector {
    /// Creates a connector that dials `addr` (a `host:port` string).
    pub fn new(addr: String) -> Self {
        Self { addr }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Writer = OwnedWriteHalf;

    async fn connect(
        &mut self,
        generation: u64,
        events: mpsc::Sender<BridgeEvent>,
    ) -> io::Result<OwnedWriteHalf> {
        // `TcpStream::connect` performs the three-way handshake
        // asynchronously; the bridge's run loop awaits it inline, which is
        // what guarantees at most one outstanding attempt.
        let stream = TcpStream::connect(self.addr.as_str()).await?;

        // Split so the write half can be owned by the bridge while the read
        // half watches for the remote going away.
        let (read_half, write_half) = stream.into_split();
        tokio::spawn(watch_remote(read_half, generation, events));

        Ok(write_half)
    }
}

/// Watches the read half of the transport and reports its death.
///
/// The remote listener never sends payload data; any bytes that do arrive are
/// discarded.  `read` returning `Ok(0)` means the remote closed cleanly, an
/// error means the socket failed — both end the watcher.
async fn watch_remote<R>(mut read_half: R, generation: u64, events: mpsc::Sender<BridgeEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 512];
    loop {
        match read_half.read(&mut buf).await {
            Ok(0) => {
                debug!(generation, "remote closed the transport (EOF)");
                let _ = events.send(BridgeEvent::TransportClosed { generation }).await;
                return;
            }
            Ok(n) => {
                // Unidirectional bridge: inbound payload is not part of the
                // protocol.  Drop it.
                debug!(generation, bytes = n, "discarding unexpected inbound data");
            }
            Err(e) => {
                let _ = events
                    .send(BridgeEvent::TransportError {
                        generation,
                        error: e.to_string(),
                    })
                    .await;
                return;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    /// An EOF on the read half must surface as `TransportClosed` with the
    /// watcher's generation.
    #[tokio::test]
    async fn test_watcher_reports_clean_close_as_transport_closed() {
        // Arrange: an empty reader is an immediate EOF.
        let reader = tokio::io::empty();
        let (tx, mut rx) = mpsc::channel(8);

        // Act
        watch_remote(reader, 3, tx).await;

        // Assert
        match rx.recv().await {
            Some(BridgeEvent::TransportClosed { generation }) => assert_eq!(generation, 3),
            other => panic!("expected TransportClosed, got {other:?}"),
        }
    }

    /// Inbound payload bytes are discarded and the watcher keeps running
    /// until the EOF that follows them.
    #[tokio::test]
    async fn test_watcher_discards_inbound_data_before_eof() {
        let (mut remote, local) = tokio::io::duplex(64);
        let (tx, mut rx) = mpsc::channel(8);
        let watcher = tokio::spawn(watch_remote(local, 1, tx));

        // Remote sends junk, then closes.
        remote.write_all(b"unexpected").await.unwrap();
        drop(remote);

        watcher.await.unwrap();
        assert!(matches!(
            rx.recv().await,
            Some(BridgeEvent::TransportClosed { generation: 1 })
        ));
    }

    /// Dialing a port nothing listens on must fail with an I/O error rather
    /// than hang or panic.
    #[tokio::test]
    async fn test_connect_to_closed_port_returns_error() {
        // Port 1 is in the reserved range; nothing listens there in CI.
        let mut connector = TcpConnector::new("127.0.0.1:1".to_string());
        let (tx, _rx) = mpsc::channel(8);

        let result = connector.connect(1, tx).await;
        assert!(result.is_err());
    }

    /// A successful dial hands back a writable half and the remote sees the
    /// written bytes.
    #[tokio::test]
    async fn test_connect_returns_writable_half() {
        use tokio::io::AsyncReadExt;
        use tokio::net::TcpListener;

        // Arrange: a real loopback listener on an ephemeral port.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut connector = TcpConnector::new(addr.to_string());
        let (tx, _rx) = mpsc::channel(8);

        // Act
        let mut writer = connector.connect(1, tx).await.expect("dial must succeed");
        let (mut accepted, _) = listener.accept().await.unwrap();
        writer.write_all(b"$GPGGA\r\n").await.unwrap();

        // Assert
        let mut buf = [0u8; 8];
        accepted.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"$GPGGA\r\n");
    }
}
