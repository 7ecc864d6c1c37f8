//! NAT-PMP wire format - RFC 6886
//!
//! All multi-byte fields are big-endian. Responses echo the request opcode
//! with the high bit set (`128 + opcode`).
//!
//! ```text
//! external address request:  version(1) | opcode(1)
//! external address response: version(1) | opcode(1) | result(2) | epoch(4) | ip(4)
//! map request:               version(1) | opcode(1) | reserved(2) | internal(2) | external(2) | lifetime(4)
//! map response:              version(1) | opcode(1) | result(2) | epoch(4) | internal(2) | external(2) | lifetime(4)
//! ```

use super::types::{IpProtocol, NatError};
use std::net::Ipv4Addr;

/// NAT-PMP server port (IANA assigned)
pub const NATPMP_SERVER_PORT: u16 = 5351;

/// NAT-PMP protocol version
pub(crate) const NATPMP_VERSION: u8 = 0;

/// Offset added to the request opcode in responses
pub(crate) const RESPONSE_OPCODE_OFFSET: u8 = 128;

pub(crate) const EXTERNAL_ADDRESS_RESPONSE_LEN: usize = 12;
pub(crate) const MAP_REQUEST_LEN: usize = 12;
pub(crate) const MAP_RESPONSE_LEN: usize = 16;

/// NAT-PMP opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum NatPmpOpcode {
    /// External address request
    ExternalAddress = 0,
    /// UDP port mapping
    MapUdp = 1,
    /// TCP port mapping
    MapTcp = 2,
}

impl NatPmpOpcode {
    pub(crate) fn for_protocol(protocol: IpProtocol) -> Self {
        match protocol {
            IpProtocol::UDP => Self::MapUdp,
            IpProtocol::TCP => Self::MapTcp,
        }
    }

    pub(crate) fn response_opcode(self) -> u8 {
        RESPONSE_OPCODE_OFFSET + self as u8
    }
}

/// NAT-PMP result codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum NatPmpResultCode {
    /// Request accepted
    Success = 0,
    /// Gateway speaks a different protocol version
    UnsupportedVersion = 1,
    /// Gateway supports NAT-PMP but the feature is disabled
    NotAuthorized = 2,
    /// Gateway has no external address (e.g. DHCP not done yet)
    NetworkFailure = 3,
    /// Gateway cannot create more mappings
    OutOfResources = 4,
    /// Opcode not understood
    UnsupportedOpcode = 5,
}

impl NatPmpResultCode {
    pub(crate) fn from_u16(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::UnsupportedVersion),
            2 => Some(Self::NotAuthorized),
            3 => Some(Self::NetworkFailure),
            4 => Some(Self::OutOfResources),
            5 => Some(Self::UnsupportedOpcode),
            _ => None,
        }
    }

    pub(crate) fn to_error_message(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::UnsupportedVersion => "Unsupported NAT-PMP version",
            Self::NotAuthorized => "Not authorized/refused",
            Self::NetworkFailure => "Network failure",
            Self::OutOfResources => "Out of resources",
            Self::UnsupportedOpcode => "Unsupported opcode",
        }
    }
}

/// Reply to an external address request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalAddressResponse {
    /// Seconds since the gateway's mapping table was (re)initialized
    pub epoch_secs: u32,
    /// Public IPv4 address of the gateway
    pub external_ip: Ipv4Addr,
}

/// Reply to a map request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingResponse {
    /// Seconds since the gateway's mapping table was (re)initialized
    pub epoch_secs: u32,
    /// Internal port the mapping forwards to
    pub internal_port: u16,
    /// External port the gateway actually mapped
    pub external_port: u16,
    /// Lease granted by the gateway, in seconds
    pub lifetime_secs: u32,
}

/// Build an external address request packet
pub(crate) fn build_external_address_request() -> Vec<u8> {
    vec![NATPMP_VERSION, NatPmpOpcode::ExternalAddress as u8]
}

/// Build a NAT-PMP MAP request packet
pub(crate) fn build_natpmp_map_request(
    internal_port: u16,
    suggested_external_port: u16,
    lifetime_secs: u32,
    protocol: IpProtocol,
) -> Vec<u8> {
    let mut request = Vec::with_capacity(MAP_REQUEST_LEN);

    request.push(NATPMP_VERSION);
    request.push(NatPmpOpcode::for_protocol(protocol) as u8);
    // Reserved, must be zero
    request.extend_from_slice(&[0u8; 2]);
    request.extend_from_slice(&internal_port.to_be_bytes());
    request.extend_from_slice(&suggested_external_port.to_be_bytes());
    request.extend_from_slice(&lifetime_secs.to_be_bytes());

    request
}

/// Check the common response header and return the epoch field
fn parse_header(response: &[u8], expected_len: usize, opcode: NatPmpOpcode) -> Result<u32, NatError> {
    if response.len() < expected_len {
        return Err(NatError::InvalidResponse(format!(
            "Response too short: {} bytes (expected {})",
            response.len(),
            expected_len
        )));
    }

    let version = response[0];
    if version != NATPMP_VERSION {
        return Err(NatError::InvalidResponse(format!(
            "Invalid version: {} (expected {})",
            version, NATPMP_VERSION
        )));
    }

    if response[1] != opcode.response_opcode() {
        return Err(NatError::InvalidResponse(format!(
            "Unexpected opcode: {} (expected {})",
            response[1],
            opcode.response_opcode()
        )));
    }

    let result_code = u16::from_be_bytes([response[2], response[3]]);
    let result = NatPmpResultCode::from_u16(result_code).ok_or_else(|| {
        NatError::InvalidResponse(format!("Unknown result code: {}", result_code))
    })?;
    if result != NatPmpResultCode::Success {
        return Err(NatError::GatewayRejected(result));
    }

    Ok(u32::from_be_bytes([response[4], response[5], response[6], response[7]]))
}

/// Parse a NAT-PMP external address response packet
pub(crate) fn parse_external_address_response(
    response: &[u8],
) -> Result<ExternalAddressResponse, NatError> {
    let epoch_secs = parse_header(
        response,
        EXTERNAL_ADDRESS_RESPONSE_LEN,
        NatPmpOpcode::ExternalAddress,
    )?;

    let external_ip = Ipv4Addr::new(response[8], response[9], response[10], response[11]);

    Ok(ExternalAddressResponse {
        epoch_secs,
        external_ip,
    })
}

/// Parse a NAT-PMP MAP response packet
pub(crate) fn parse_natpmp_map_response(
    response: &[u8],
    protocol: IpProtocol,
) -> Result<MappingResponse, NatError> {
    let epoch_secs = parse_header(
        response,
        MAP_RESPONSE_LEN,
        NatPmpOpcode::for_protocol(protocol),
    )?;

    Ok(MappingResponse {
        epoch_secs,
        internal_port: u16::from_be_bytes([response[8], response[9]]),
        external_port: u16::from_be_bytes([response[10], response[11]]),
        lifetime_secs: u32::from_be_bytes([response[12], response[13], response[14], response[15]]),
    })
}
