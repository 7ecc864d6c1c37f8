//! Backend-independent NAT device contract

use super::types::{IpProtocol, NatError};
use std::net::IpAddr;
use std::time::Duration;

/// A gateway that can report addresses and forward ports
///
/// Implemented by every NAT traversal backend so a dispatcher can race
/// backends and hand the winner to the caller as one type. Operations block
/// on network round-trips; none of them can be cancelled once issued.
pub trait NatDevice: Send {
    /// Short name of the backend, e.g. `"NAT-PMP"`
    fn device_type(&self) -> &'static str;

    /// Address of the gateway itself
    fn device_address(&self) -> Result<IpAddr, NatError>;

    /// Local address on the interface that faces the gateway
    fn internal_address(&self) -> Result<IpAddr, NatError>;

    /// Public address of the gateway
    fn external_address(&self) -> Result<IpAddr, NatError>;

    /// Forward an external port to `internal_port` and return the external port
    ///
    /// `timeout` is the requested lease; callers renew by calling again with
    /// the same internal port before it runs out.
    fn add_port_mapping(
        &mut self,
        protocol: IpProtocol,
        internal_port: u16,
        description: &str,
        timeout: Duration,
    ) -> Result<u16, NatError>;

    /// Remove the mapping for `internal_port`
    fn delete_port_mapping(&mut self, protocol: IpProtocol, internal_port: u16) -> Result<(), NatError>;
}
