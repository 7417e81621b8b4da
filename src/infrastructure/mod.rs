//! Infrastructure layer for nmea-bridge.
//!
//! The infrastructure layer handles all I/O: dialing the outbound TCP
//! connection and reading the serial device.
//!
//! # Responsibilities
//!
//! - Opening TCP connections to the remote listener ([`transport`])
//! - Watching an established connection for remote close / errors
//! - Opening the serial device and pumping raw bytes off it ([`serial`])
//! - Spawning the Tokio tasks that back both of the above
//!
//! # What does NOT belong here?
//!
//! - The connection/forwarding state machine (that is the application layer)
//! - Line splitting and the drain policy (domain + application)
//! - Configuration parsing (that is done in `main.rs`)
//!
//! The [`mock`] module provides in-memory implementations of the
//! [`Connector`](transport::Connector) and [`LineSource`](serial::LineSource)
//! traits so the bridge can be tested without hardware or a live peer.

pub mod mock;
pub mod serial;
pub mod transport;

// Re-export the production implementations so `main.rs` can wire them concisely.
pub use serial::SerialLineSource;
pub use transport::TcpConnector;
