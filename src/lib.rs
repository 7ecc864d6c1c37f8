//! natdev - NAT traversal devices
//!
//! This library discovers NAT-PMP gateways on the local network and manages
//! port mappings on them behind a backend-independent [`nat::NatDevice`]
//! interface, so callers can race it against other NAT traversal backends.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod nat;

pub use nat::{NatDevice, NatError};

/// Initialize logging for binaries and examples built on natdev
pub fn init() {
    tracing_subscriber::fmt::init();
}

#[cfg(test)]
mod tests;
