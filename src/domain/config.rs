//! Bridge configuration types.
//!
//! [`BridgeConfig`] is the single source of truth for all runtime settings.
//! It can be constructed from CLI arguments (preferred for production) or
//! from sensible defaults (useful for local development and tests).
//!
//! # Design rationale
//!
//! Keeping configuration as a plain struct (no global state, no environment
//! variable reads inside the domain) makes the bridge easy to embed in tests.
//! The binary entry point is responsible for populating the struct from CLI
//! args or environment variables.

use std::time::Duration;

/// The TCP port mock-GPS provider apps listen on.
pub const DEFAULT_REMOTE_PORT: u16 = 5897;

/// The baud rate of the serial GPS receiver.  Fixed 8-N-1 framing.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// How long to wait after a transport failure before redialing.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// All runtime configuration for the bridge.
///
/// Every field is fixed for the lifetime of the
/// [`Bridge`](crate::application::bridge::Bridge): failures are handled by
/// internal state transitions, never by rebuilding the configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Hostname or IP address of the remote listener.
    pub remote_host: String,

    /// TCP port of the remote listener.
    pub remote_port: u16,

    /// Path or name of the serial device (`/dev/ttyUSB0`, `COM3`, …).
    pub device: String,

    /// Serial baud rate.  The line framing is always 8-N-1.
    pub baud_rate: u32,

    /// Fixed delay between a transport failure and the next dial attempt.
    ///
    /// There is deliberately no exponential growth, no jitter, and no retry
    /// cap: the bridge is a low-traffic point-to-point relay and retries
    /// forever.
    pub reconnect_delay: Duration,
}

impl BridgeConfig {
    /// Creates a config for `remote_host` and `device` with all other fields
    /// at their defaults.
    pub fn new(remote_host: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            remote_host: remote_host.into(),
            remote_port: DEFAULT_REMOTE_PORT,
            device: device.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    /// Returns the `host:port` string passed to the TCP connector.
    ///
    /// Kept as a string (rather than a resolved `SocketAddr`) so that DNS
    /// names are re-resolved on every dial attempt — the remote listener is
    /// often a phone whose address can change between reconnects.
    pub fn remote_addr(&self) -> String {
        format!("{}:{}", self.remote_host, self.remote_port)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_remote_port_5897() {
        // Arrange / Act
        let cfg = BridgeConfig::new("192.168.1.20", "/dev/ttyUSB0");
        // Assert
        assert_eq!(cfg.remote_port, 5897);
    }

    #[test]
    fn test_new_uses_default_baud_115200() {
        let cfg = BridgeConfig::new("192.168.1.20", "/dev/ttyUSB0");
        assert_eq!(cfg.baud_rate, 115_200);
    }

    #[test]
    fn test_new_uses_default_reconnect_delay_of_5s() {
        let cfg = BridgeConfig::new("192.168.1.20", "/dev/ttyUSB0");
        assert_eq!(cfg.reconnect_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_remote_addr_joins_host_and_port() {
        let cfg = BridgeConfig::new("phone.local", "/dev/ttyACM0");
        assert_eq!(cfg.remote_addr(), "phone.local:5897");
    }

    #[test]
    fn test_remote_addr_honours_custom_port() {
        let mut cfg = BridgeConfig::new("10.0.0.7", "/dev/ttyUSB1");
        cfg.remote_port = 9000;
        assert_eq!(cfg.remote_addr(), "10.0.0.7:9000");
    }

    #[test]
    fn test_config_can_be_cloned() {
        // Cloneability is required so the connector can keep its own copy of
        // the dial address while the bridge keeps the config.
        let cfg = BridgeConfig::new("192.168.1.20", "/dev/ttyUSB0");
        let cloned = cfg.clone();
        assert_eq!(cfg.device, cloned.device);
        assert_eq!(cfg.remote_addr(), cloned.remote_addr());
    }
}
