//! nmea-bridge — entry point.
//!
//! This binary relays line-delimited NMEA sentences from a local serial GPS
//! receiver to a remote TCP listener (typically a phone running a
//! mock-location provider app), redialing automatically whenever the
//! connection drops.
//!
//! # Usage
//!
//! ```text
//! nmea-bridge <HOST> <DEVICE> [OPTIONS]
//!
//! Arguments:
//!   <HOST>    Hostname or IP of the remote listener
//!   <DEVICE>  Serial device path (/dev/ttyUSB0, COM3, …)
//!
//! Options:
//!   --port            <PORT>  Remote TCP port        [default: 5897]
//!   --baud            <BAUD>  Serial baud rate       [default: 115200]
//!   --reconnect-delay <SECS>  Delay between redials  [default: 5]
//! ```
//!
//! # Environment variable overrides
//!
//! The CLI defaults can also be overridden with environment variables.
//! CLI args take precedence when both are present.
//!
//! | Variable                      | Default  | Description              |
//! |-------------------------------|----------|--------------------------|
//! | `NMEA_BRIDGE_PORT`            | `5897`   | Remote TCP port          |
//! | `NMEA_BRIDGE_BAUD`            | `115200` | Serial baud rate         |
//! | `NMEA_BRIDGE_RECONNECT_DELAY` | `5`      | Redial delay in seconds  |
//!
//! # Architecture overview
//!
//! ```text
//! Serial GPS receiver (115200 8-N-1)
//!       ↓
//! nmea-bridge  ← this process
//!   domain/          BridgeConfig, TransportState, LineBuffer
//!   application/     the Bridge state machine + drain logic
//!   infrastructure/
//!     serial/        serialport reader task
//!     transport/     tokio TCP dialer + remote-close watcher
//!       ↓
//! Remote listener (TCP, port 5897)
//! ```

use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nmea_bridge::application::{Bridge, BridgeEvent};
use nmea_bridge::domain::BridgeConfig;
use nmea_bridge::infrastructure::{SerialLineSource, TcpConnector};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Serial-to-TCP relay for NMEA GPS receivers.
///
/// Forwards every complete line the receiver produces, verbatim, to the
/// remote listener, and redials the connection with a fixed delay whenever
/// it drops.
#[derive(Debug, Parser)]
#[command(
    name = "nmea-bridge",
    about = "Relay NMEA sentences from a serial GPS receiver to a TCP listener",
    version
)]
struct Cli {
    /// Hostname or IP address of the remote listener.
    host: String,

    /// Serial device path (/dev/ttyUSB0, COM3, …).
    device: String,

    /// TCP port of the remote listener.
    #[arg(long, default_value_t = 5897, env = "NMEA_BRIDGE_PORT")]
    port: u16,

    /// Serial baud rate (framing is always 8-N-1).
    #[arg(long, default_value_t = 115_200, env = "NMEA_BRIDGE_BAUD")]
    baud: u32,

    /// Seconds to wait between redial attempts after a transport failure.
    #[arg(long, default_value_t = 5, env = "NMEA_BRIDGE_RECONNECT_DELAY")]
    reconnect_delay: u64,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`BridgeConfig`].
    fn into_bridge_config(self) -> BridgeConfig {
        BridgeConfig {
            remote_host: self.host,
            remote_port: self.port,
            device: self.device,
            baud_rate: self.baud,
            reconnect_delay: Duration::from_secs(self.reconnect_delay),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `EnvFilter::try_from_default_env()` reads the `RUST_LOG` environment
    // variable.  If it is absent or invalid, we fall back to `info` level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.into_bridge_config();

    info!(
        "nmea-bridge starting — device={}, remote={}",
        config.device,
        config.remote_addr()
    );

    // Wire the production infrastructure into the bridge.
    let connector = TcpConnector::new(config.remote_addr());
    let source = SerialLineSource::new(config.device.clone(), config.baud_rate);
    let (bridge, events) = Bridge::new(config, connector, source);

    // Ctrl+C becomes a Shutdown event on the bridge's own channel, so the
    // run loop winds down through the same path as any other notification.
    let shutdown_tx = bridge.event_sender();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                let _ = shutdown_tx.send(BridgeEvent::Shutdown).await;
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    bridge.run(events).await;

    info!("nmea-bridge stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
