//! NAT traversal through NAT-PMP gateways
//!
//! This module provides:
//! - [`NatDevice`] - the backend-independent contract a NAT dispatcher consumes
//! - [`discover_natpmp`] - cancellable discovery of a NAT-PMP gateway
//! - [`NatPmpDevice`] - a session with one gateway: address queries, port
//!   mapping with collision retry, and lease renewal that keeps the external port
//!
//! Lease renewal is left to the caller: call `add_port_mapping` again with
//! the same internal port before the lease runs out.

// Submodules
pub mod client;
pub mod device;
pub mod discovery;
pub mod gateway;
pub mod interfaces;
pub mod natpmp;
pub mod protocol;
pub mod types;

// Re-export commonly used types
pub use types::{IpProtocol, NatError};

// Re-export main entry points
pub use client::{PmpClient, UdpPmpClient};
pub use device::NatDevice;
pub use discovery::{discover_natpmp, discover_natpmp_with};
pub use gateway::find_default_gateway;
pub use interfaces::{local_networks, select_internal_address, LocalNetwork};
pub use natpmp::{ActiveMapping, NatPmpDevice, NATPMP_DEVICE_TYPE};
pub use protocol::{ExternalAddressResponse, MappingResponse, NatPmpResultCode};
