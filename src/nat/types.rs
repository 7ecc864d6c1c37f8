//! Common types for the NAT module

use super::protocol::NatPmpResultCode;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while talking to a NAT device
#[derive(Debug, Error)]
pub enum NatError {
    /// Network timeout waiting for response
    #[error("NAT-PMP request timed out")]
    Timeout,

    /// Invalid response from gateway
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Gateway answered with a non-zero result code
    #[error("Gateway rejected request: {}", .0.to_error_message())]
    GatewayRejected(NatPmpResultCode),

    /// No default gateway found on the network
    #[error("No gateway found")]
    NoGateway,

    /// No local interface is on the same subnet as the gateway
    #[error("No internal address faces the gateway")]
    NoInternalAddress,

    /// Requested lease rounds down to zero seconds, which NAT-PMP treats as a deletion
    #[error("Lease duration must be at least one second")]
    InvalidLifetime,

    /// IO error during communication
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol name other than `tcp` or `udp`
    #[error("Invalid protocol: {0}")]
    InvalidProtocol(String),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Transport protocol of a port mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IpProtocol {
    /// TCP protocol
    TCP = 6,
    /// UDP protocol
    UDP = 17,
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TCP => f.write_str("tcp"),
            Self::UDP => f.write_str("udp"),
        }
    }
}

impl FromStr for IpProtocol {
    type Err = NatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("tcp") {
            Ok(Self::TCP)
        } else if s.eq_ignore_ascii_case("udp") {
            Ok(Self::UDP)
        } else {
            Err(NatError::InvalidProtocol(s.to_string()))
        }
    }
}
