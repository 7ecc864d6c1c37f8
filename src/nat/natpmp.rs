//! NAT-PMP (NAT Port Mapping Protocol) device - RFC 6886
//!
//! A [`NatPmpDevice`] is a session bound to one gateway. It remembers the
//! last mapping it created so that renewing a lease for the same internal
//! port keeps the same external port, and it retries a bounded number of
//! random external ports when the gateway refuses one.
//!
//! # Example
//!
//! ```no_run
//! use natdev::config::NatPmpConfig;
//! use natdev::nat::{discover_natpmp, IpProtocol, NatDevice};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = NatPmpConfig::default();
//! let found = discover_natpmp(&config, CancellationToken::new())?;
//! if let Ok(mut device) = found.await {
//!     let port = tokio::task::spawn_blocking(move || {
//!         device.add_port_mapping(IpProtocol::TCP, 8080, "demo", Duration::from_secs(3600))
//!     })
//!     .await??;
//!     println!("Forwarding external port {}", port);
//! }
//! # Ok(())
//! # }
//! ```

use super::client::{PmpClient, UdpPmpClient};
use super::device::NatDevice;
use super::interfaces::{local_networks, select_internal_address};
use super::protocol::MappingResponse;
use super::types::{IpProtocol, NatError};
use crate::config::NatPmpConfig;
use rand::Rng;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Name reported by [`NatDevice::device_type`]
pub const NATPMP_DEVICE_TYPE: &str = "NAT-PMP";

/// Random external ports tried before giving up on a new mapping
pub const MAX_MAPPING_ATTEMPTS: usize = 3;

/// The mapping produced by the last successful `add_port_mapping`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveMapping {
    /// Transport protocol of the mapping
    pub protocol: IpProtocol,
    /// Local port traffic is forwarded to
    pub internal_port: u16,
    /// Port opened on the gateway
    pub external_port: u16,
}

/// Session with a NAT-PMP gateway
#[derive(Debug)]
pub struct NatPmpDevice<C = UdpPmpClient> {
    client: C,
    gateway: Ipv4Addr,
    internal_port: u16,
    mapping: Option<ActiveMapping>,
    pub(crate) port_range: RangeInclusive<u16>,
}

impl<C: PmpClient> NatPmpDevice<C> {
    /// Bind a session to `gateway` using an already working client
    pub fn new(client: C, gateway: Ipv4Addr, config: &NatPmpConfig) -> Self {
        Self {
            client,
            gateway,
            internal_port: 0,
            mapping: None,
            port_range: config.external_port_range(),
        }
    }

    /// Gateway this session talks to
    pub fn gateway(&self) -> Ipv4Addr {
        self.gateway
    }

    /// Internal port of the most recent mapping request, 0 before the first one
    pub fn current_internal_port(&self) -> u16 {
        self.internal_port
    }

    /// External port of the last successful mapping, 0 if there is none
    pub fn current_external_port(&self) -> u16 {
        self.mapping.map_or(0, |m| m.external_port)
    }

    /// Last successful mapping
    pub fn active_mapping(&self) -> Option<ActiveMapping> {
        self.mapping
    }

    /// Create or renew a mapping, returning the external port
    pub fn map_port(
        &mut self,
        protocol: IpProtocol,
        internal_port: u16,
        lease: Duration,
    ) -> Result<u16, NatError> {
        let lifetime_secs = lease_seconds(lease)?;

        // Renewal only applies to the internal port requested last
        let renewable = self.internal_port == internal_port;
        if let Some(current) = self
            .mapping
            .filter(|m| renewable && m.protocol == protocol && m.internal_port == internal_port)
        {
            match self.client.add_port_mapping(
                protocol,
                internal_port,
                current.external_port,
                lifetime_secs,
            ) {
                Ok(response) => {
                    let external_port = self.accept(protocol, internal_port, current.external_port, response);
                    debug!(
                        "Renewed NAT-PMP mapping {} {} -> {} ({}s)",
                        protocol, external_port, internal_port, lifetime_secs
                    );
                    return Ok(external_port);
                }
                Err(e) => debug!(
                    "Gateway refused renewal of external port {}: {}",
                    current.external_port, e
                ),
            }
        }

        self.internal_port = internal_port;
        let mut last_error = None;

        for attempt in 1..=MAX_MAPPING_ATTEMPTS {
            let candidate = rand::thread_rng().gen_range(self.port_range.clone());
            match self
                .client
                .add_port_mapping(protocol, internal_port, candidate, lifetime_secs)
            {
                Ok(response) => {
                    let external_port = self.accept(protocol, internal_port, candidate, response);
                    info!(
                        "NAT-PMP mapping created: {}:{} -> {} ({}s)",
                        protocol, external_port, internal_port, lifetime_secs
                    );
                    return Ok(external_port);
                }
                Err(e) => {
                    debug!(
                        "Gateway refused external port {} (attempt {}/{}): {}",
                        candidate, attempt, MAX_MAPPING_ATTEMPTS, e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| NatError::Internal("No mapping attempts made".to_string())))
    }

    /// Delete the mapping for `internal_port`, reporting gateway errors
    ///
    /// The request targets the last external port this session mapped.
    pub fn remove_port_mapping(
        &mut self,
        protocol: IpProtocol,
        internal_port: u16,
    ) -> Result<(), NatError> {
        let external_port = self.current_external_port();
        self.client
            .add_port_mapping(protocol, internal_port, external_port, 0)?;
        info!(
            "NAT-PMP mapping deleted: {}:{} -> {}",
            protocol, external_port, internal_port
        );
        Ok(())
    }

    /// Record an accepted mapping and return the external port in effect
    fn accept(
        &mut self,
        protocol: IpProtocol,
        internal_port: u16,
        requested: u16,
        response: MappingResponse,
    ) -> u16 {
        let external_port = if response.external_port == 0 {
            requested
        } else {
            response.external_port
        };
        if external_port != requested {
            warn!(
                "Gateway mapped external port {} instead of requested {}",
                external_port, requested
            );
        }
        self.mapping = Some(ActiveMapping {
            protocol,
            internal_port,
            external_port,
        });
        external_port
    }
}

impl<C: PmpClient + Send> NatDevice for NatPmpDevice<C> {
    fn device_type(&self) -> &'static str {
        NATPMP_DEVICE_TYPE
    }

    fn device_address(&self) -> Result<IpAddr, NatError> {
        Ok(IpAddr::V4(self.gateway))
    }

    fn internal_address(&self) -> Result<IpAddr, NatError> {
        select_internal_address(self.gateway, &local_networks()).map(IpAddr::V4)
    }

    fn external_address(&self) -> Result<IpAddr, NatError> {
        let response = self.client.external_address()?;
        Ok(IpAddr::V4(response.external_ip))
    }

    fn add_port_mapping(
        &mut self,
        protocol: IpProtocol,
        internal_port: u16,
        description: &str,
        timeout: Duration,
    ) -> Result<u16, NatError> {
        debug!(
            "Mapping {} port {} for {:?} via {}",
            protocol, internal_port, description, self.gateway
        );
        self.map_port(protocol, internal_port, timeout)
    }

    fn delete_port_mapping(&mut self, protocol: IpProtocol, internal_port: u16) -> Result<(), NatError> {
        // Best effort: errors are logged, never returned
        if let Err(e) = self.remove_port_mapping(protocol, internal_port) {
            warn!(
                "Ignoring failure to delete NAT-PMP mapping for {} port {}: {}",
                protocol, internal_port, e
            );
        }
        Ok(())
    }
}

/// Convert a lease to whole seconds for the wire
pub(crate) fn lease_seconds(lease: Duration) -> Result<u32, NatError> {
    match u32::try_from(lease.as_secs()).unwrap_or(u32::MAX) {
        0 => Err(NatError::InvalidLifetime),
        secs => Ok(secs),
    }
}
