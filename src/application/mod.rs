//! Application layer for nmea-bridge.
//!
//! The application layer orchestrates the business logic: it knows *what* to
//! do, but delegates *how* to do it to the infrastructure layer.
//!
//! # Responsibilities
//!
//! - The connection lifecycle state machine ([`bridge::Bridge`])
//! - The line-drain policy: forward complete lines, retain partials, drop
//!   everything when the transport is unavailable
//! - Deciding when the source is opened and closed
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or serial devices (that is infrastructure)
//! - Line splitting mechanics (that is `domain::LineBuffer`)
//! - Configuration parsing (that is done in `main.rs`)

pub mod bridge;

// Re-export so callers can write `application::Bridge`.
pub use bridge::{Bridge, BridgeEvent};
