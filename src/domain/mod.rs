//! Domain layer for nmea-bridge.
//!
//! The domain layer contains pure business-logic types that have no
//! dependencies on I/O, networking, or external frameworks.  This makes them
//! easy to test in isolation and portable to any runtime or platform.
//!
//! # What belongs in the domain layer?
//!
//! - Configuration structures ([`BridgeConfig`])
//! - The transport connection state ([`TransportState`])
//! - The line accumulation buffer ([`LineBuffer`])
//!
//! # What does NOT belong here?
//!
//! - Any `tokio`, `TcpStream`, or `serialport` types
//! - File I/O or environment variable reading
//! - Anything that could block or fail due to external state

// Declare the sub-modules that make up the domain layer.
pub mod config;
pub mod line_buffer;
pub mod state;

// Re-export the most commonly needed types at the domain module boundary
// so callers can write `domain::BridgeConfig` instead of the longer path.
pub use config::BridgeConfig;
pub use line_buffer::LineBuffer;
pub use state::TransportState;
