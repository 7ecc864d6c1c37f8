//! Local interface enumeration

use super::types::NatError;
use netdev::ipnet::Ipv4Net;
use std::net::Ipv4Addr;
use tracing::trace;

/// An IPv4 address assigned to a local interface, together with its subnet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNetwork {
    /// Interface name, e.g. `eth0`
    pub interface: String,
    /// Assigned address and prefix length
    pub network: Ipv4Net,
}

impl LocalNetwork {
    /// Address assigned to the interface
    pub fn addr(&self) -> Ipv4Addr {
        self.network.addr()
    }

    /// Whether `ip` lies inside this interface's subnet
    pub fn contains(&self, ip: &Ipv4Addr) -> bool {
        self.network.contains(ip)
    }
}

/// List every IPv4 network configured on a local interface
pub fn local_networks() -> Vec<LocalNetwork> {
    netdev::get_interfaces()
        .into_iter()
        .flat_map(|iface| {
            let name = iface.name;
            iface.ipv4.into_iter().map(move |network| LocalNetwork {
                interface: name.clone(),
                network,
            })
        })
        .collect()
}

/// Pick the first local address whose subnet contains `gateway`
pub fn select_internal_address(
    gateway: Ipv4Addr,
    networks: &[LocalNetwork],
) -> Result<Ipv4Addr, NatError> {
    networks
        .iter()
        .find(|net| net.contains(&gateway))
        .map(|net| {
            trace!("Interface {} ({}) faces gateway {}", net.interface, net.network, gateway);
            net.addr()
        })
        .ok_or(NatError::NoInternalAddress)
}
