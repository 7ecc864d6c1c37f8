//! Default gateway lookup

use super::types::NatError;
use std::net::Ipv4Addr;
use tracing::debug;

/// Find the default IPv4 gateway
///
/// Asks the OS routing table through `netdev`.
pub fn find_default_gateway() -> Result<Ipv4Addr, NatError> {
    let device = netdev::get_default_gateway().map_err(|e| {
        debug!("Default gateway lookup failed: {}", e);
        NatError::NoGateway
    })?;

    let gateway = select_gateway(&device.ipv4).ok_or(NatError::NoGateway)?;
    debug!("Found default gateway: {}", gateway);
    Ok(gateway)
}

/// First usable IPv4 address among the gateway's addresses
///
/// An all-zero gateway is an on-link default route, nothing to talk to.
pub(crate) fn select_gateway(candidates: &[Ipv4Addr]) -> Option<Ipv4Addr> {
    candidates.iter().copied().find(|ip| !ip.is_unspecified())
}
