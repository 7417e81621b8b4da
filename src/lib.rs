//! nmea-bridge library crate.
//!
//! This crate relays line-delimited NMEA sentences from a local serial GPS
//! receiver to a remote TCP listener, redialing the connection automatically
//! whenever it drops.  Data flows one way only: serial → network.  The
//! network side is write-only and the serial side is read-only.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Serial GPS receiver (NMEA lines, 115200 8-N-1)
//!         ↓
//! [nmea-bridge]
//!   ├── domain/           Pure types: BridgeConfig, TransportState, LineBuffer
//!   ├── application/      The Bridge state machine and line-drain logic
//!   └── infrastructure/
//!         ├── transport/  Outbound TCP dialing (tokio), remote-close watcher
//!         └── serial/     Serial reader (serialport crate, blocking task)
//!         ↓
//! Remote TCP listener (e.g. a phone's mock-GPS provider, port 5897)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no external dependencies (no I/O, no async, no frameworks).
//! - `application` depends on `domain` plus the infrastructure *traits*
//!   ([`Connector`](infrastructure::transport::Connector),
//!   [`LineSource`](infrastructure::serial::LineSource)).
//! - `infrastructure` depends on everything plus `tokio` and `serialport`.
//!
//! This split keeps the connection/forwarding lifecycle — the only part with
//! real behavioral contracts — testable without a serial device or a live
//! network peer: tests drive the [`Bridge`](application::bridge::Bridge)
//! with mock implementations of both traits.

/// Domain layer: pure business-logic types (no I/O).
pub mod domain;

/// Application layer: the bridge state machine and forwarding logic.
pub mod application;

/// Infrastructure layer: TCP transport and serial source adapters.
pub mod infrastructure;
