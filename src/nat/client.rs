//! NAT-PMP protocol client
//!
//! [`PmpClient`] is the request/response capability a NAT-PMP session is
//! built on. [`UdpPmpClient`] implements it over blocking UDP sockets with
//! the retransmission schedule from RFC 6886 §3.1: the first request waits
//! 250ms for a reply and every retry doubles the wait.
//!
//! Calls block the current thread and cannot be interrupted once issued.

use super::protocol::{
    build_external_address_request, build_natpmp_map_request, parse_external_address_response,
    parse_natpmp_map_response, ExternalAddressResponse, MappingResponse,
    EXTERNAL_ADDRESS_RESPONSE_LEN, MAP_RESPONSE_LEN, NATPMP_SERVER_PORT,
};
use super::types::{IpProtocol, NatError};
use crate::config::NatPmpConfig;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;
use tracing::{debug, trace};

/// Request/response operations against a single NAT-PMP gateway
pub trait PmpClient {
    /// Ask the gateway for its public IPv4 address
    fn external_address(&self) -> Result<ExternalAddressResponse, NatError>;

    /// Request a mapping from `external_port` to `internal_port`
    ///
    /// A `lifetime_secs` of zero deletes the mapping.
    fn add_port_mapping(
        &self,
        protocol: IpProtocol,
        internal_port: u16,
        external_port: u16,
        lifetime_secs: u32,
    ) -> Result<MappingResponse, NatError>;
}

/// NAT-PMP client speaking UDP to a gateway
#[derive(Debug, Clone)]
pub struct UdpPmpClient {
    server: SocketAddr,
    initial_retransmit: Duration,
    max_tries: u32,
}

impl UdpPmpClient {
    /// Create a client for `gateway` using the standard NAT-PMP port
    pub fn new(gateway: Ipv4Addr, config: &NatPmpConfig) -> Self {
        Self::with_server_addr(SocketAddr::from((gateway, NATPMP_SERVER_PORT)), config)
    }

    /// Create a client talking to an explicit server address
    pub fn with_server_addr(server: SocketAddr, config: &NatPmpConfig) -> Self {
        Self {
            server,
            initial_retransmit: Duration::from_millis(config.initial_retransmit_ms),
            max_tries: config.max_tries,
        }
    }

    /// Address requests are sent to
    pub fn server_addr(&self) -> SocketAddr {
        self.server
    }

    /// Send `request` and wait for a reply, retransmitting on timeout
    fn call(&self, request: &[u8], response_len: usize) -> Result<Vec<u8>, NatError> {
        let bind_addr: SocketAddr = match self.server {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (std::net::Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(bind_addr)?;
        // Connected sockets drop datagrams that do not come from the gateway
        socket.connect(self.server)?;

        let mut wait = self.initial_retransmit;
        let mut buf = [0u8; MAP_RESPONSE_LEN];

        for attempt in 1..=self.max_tries {
            socket.set_read_timeout(Some(wait))?;
            socket.send(request)?;
            trace!("Sent NAT-PMP request to {} (attempt {})", self.server, attempt);

            match socket.recv(&mut buf) {
                Ok(n) if n >= response_len => return Ok(buf[..n].to_vec()),
                Ok(n) => {
                    return Err(NatError::InvalidResponse(format!(
                        "Response too short: {} bytes (expected {})",
                        n, response_len
                    )));
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    debug!(
                        "No NAT-PMP reply from {} within {:?} (attempt {}/{})",
                        self.server, wait, attempt, self.max_tries
                    );
                    wait = wait.saturating_mul(2);
                }
                Err(e) => return Err(NatError::Io(e)),
            }
        }

        Err(NatError::Timeout)
    }
}

impl PmpClient for UdpPmpClient {
    fn external_address(&self) -> Result<ExternalAddressResponse, NatError> {
        let response = self.call(
            &build_external_address_request(),
            EXTERNAL_ADDRESS_RESPONSE_LEN,
        )?;
        parse_external_address_response(&response)
    }

    fn add_port_mapping(
        &self,
        protocol: IpProtocol,
        internal_port: u16,
        external_port: u16,
        lifetime_secs: u32,
    ) -> Result<MappingResponse, NatError> {
        let request = build_natpmp_map_request(internal_port, external_port, lifetime_secs, protocol);
        let response = self.call(&request, MAP_RESPONSE_LEN)?;
        parse_natpmp_map_response(&response, protocol)
    }
}
