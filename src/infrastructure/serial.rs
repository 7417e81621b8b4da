//! Serial source infrastructure.
//!
//! The `serialport` crate exposes a blocking `Read` implementation, so the
//! device is pumped on a dedicated `spawn_blocking` task: short-timeout reads
//! alternate with a cancel-flag check, and every chunk that arrives is handed
//! to the bridge as a [`BridgeEvent::SourceData`].
//!
//! The reader task owns the port handle.  `close()` only raises the cancel
//! flag; the task notices it within one read timeout, returns, and drops the
//! handle — which is what actually releases the device.

use std::io;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serialport::{DataBits, Parity, SerialPort, StopBits};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::application::bridge::BridgeEvent;

/// How long a single blocking read waits before giving the cancel flag a
/// chance to be observed.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Read chunk size.  NMEA sentences are under 82 bytes, so one read usually
/// drains several complete lines.
const READ_BUF_SIZE: usize = 256;

/// Error type for source operations.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The device could not be opened.
    #[error("failed to open serial device {device}: {reason}")]
    OpenFailed { device: String, reason: String },

    /// `open()` was called while the source was already open.
    #[error("source is already open")]
    AlreadyOpen,
}

/// A read-only, line-oriented byte source.
///
/// The production implementation is [`SerialLineSource`]; tests use
/// [`MockLineSource`](crate::infrastructure::mock::MockLineSource).
///
/// Implementations deliver raw chunks as [`BridgeEvent::SourceData`] and
/// runtime failures as [`BridgeEvent::SourceError`] on the channel passed to
/// [`open`](LineSource::open).
pub trait LineSource: Send {
    /// Opens the device and starts delivering events.
    fn open(&mut self, events: mpsc::Sender<BridgeEvent>) -> Result<(), SourceError>;

    /// Stops delivery and releases the device.  Idempotent; in-flight chunks
    /// already queued on the channel may still arrive afterwards.
    fn close(&mut self);

    /// `true` while the device is open.
    fn is_open(&self) -> bool;
}

/// [`LineSource`] implementation backed by the `serialport` crate.
///
/// Fixed 8-N-1 framing at the configured baud rate, matching what GPS
/// receivers speak.
pub struct SerialLineSource {
    device: String,
    baud_rate: u32,
    /// Present while the reader task is running; raising it stops the task.
    cancel: Option<Arc<AtomicBool>>,
}

impl SerialLineSource {
    /// Creates a closed source for `device` at `baud_rate`.
    pub fn new(device: String, baud_rate: u32) -> Self {
        Self {
            device,
            baud_rate,
            cancel: None,
        }
    }
}

impl LineSource for SerialLineSource {
    fn open(&mut self, events: mpsc::Sender<BridgeEvent>) -> Result<(), SourceError> {
        if self.cancel.is_some() {
            return Err(SourceError::AlreadyOpen);
        }

        let port = serialport::new(&self.device, self.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| SourceError::OpenFailed {
                device: self.device.clone(),
                reason: e.to_string(),
            })?;

        info!(device = %self.device, baud = self.baud_rate, "serial source opened");

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Some(Arc::clone(&cancel));

        let device = self.device.clone();
        tokio::task::spawn_blocking(move || read_loop(port, device, cancel, events));

        Ok(())
    }

    fn close(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::Relaxed);
            debug!(device = %self.device, "serial source close requested");
        }
    }

    fn is_open(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for SerialLineSource {
    fn drop(&mut self) {
        self.close();
    }
}

/// Blocking read loop, run on a `spawn_blocking` thread.
///
/// Timeouts are the normal idle case — they exist purely so the cancel flag
/// is polled.  `Ok(0)` (device EOF, e.g. a USB adapter unplugged) and real
/// errors are reported to the bridge as [`BridgeEvent::SourceError`].
fn read_loop(
    mut port: Box<dyn SerialPort>,
    device: String,
    cancel: Arc<AtomicBool>,
    events: mpsc::Sender<BridgeEvent>,
) {
    let mut buf = [0u8; READ_BUF_SIZE];

    while !cancel.load(Ordering::Relaxed) {
        match port.read(&mut buf) {
            Ok(0) => {
                let _ = events.blocking_send(BridgeEvent::SourceError(format!(
                    "{device}: device closed (EOF)"
                )));
                return;
            }
            Ok(n) => {
                // The bridge hanging up is a normal shutdown path.
                if events
                    .blocking_send(BridgeEvent::SourceData(buf[..n].to_vec()))
                    .is_err()
                {
                    return;
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => {
                // Idle tick; loop around and re-check the cancel flag.
            }
            Err(e) => {
                let _ = events.blocking_send(BridgeEvent::SourceError(format!("{device}: {e}")));
                return;
            }
        }
    }

    debug!(device = %device, "serial reader stopped");
    // `port` is dropped here, releasing the device.
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_nonexistent_device_returns_open_failed() {
        // Arrange: a device path that cannot exist.
        let mut source = SerialLineSource::new("/dev/does-not-exist-nmea".to_string(), 115_200);
        let (tx, _rx) = mpsc::channel(8);

        // Act
        let result = source.open(tx);

        // Assert: a typed OpenFailed error naming the device, and the source
        // stays closed.
        match result {
            Err(SourceError::OpenFailed { device, .. }) => {
                assert_eq!(device, "/dev/does-not-exist-nmea");
            }
            other => panic!("expected OpenFailed, got {other:?}"),
        }
        assert!(!source.is_open());
    }

    #[test]
    fn test_new_source_starts_closed() {
        let source = SerialLineSource::new("/dev/ttyUSB0".to_string(), 115_200);
        assert!(!source.is_open());
    }

    #[test]
    fn test_close_on_closed_source_is_a_no_op() {
        let mut source = SerialLineSource::new("/dev/ttyUSB0".to_string(), 115_200);
        source.close();
        source.close();
        assert!(!source.is_open());
    }

    #[test]
    fn test_open_failed_error_message_names_the_device() {
        let err = SourceError::OpenFailed {
            device: "/dev/ttyACM0".to_string(),
            reason: "permission denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/dev/ttyACM0"));
        assert!(msg.contains("permission denied"));
    }
}
