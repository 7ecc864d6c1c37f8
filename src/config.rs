//! NAT-PMP configuration

use crate::nat::NatError;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;

/// Tunables for discovery, the protocol client and the mapping algorithm
///
/// Stored as JSON. Missing fields take their default value.
///
/// # Example
/// ```rust,no_run
/// use natdev::config::NatPmpConfig;
///
/// // Load config (returns default if file doesn't exist)
/// let mut config = NatPmpConfig::load("natpmp.json").expect("Failed to load");
///
/// config.max_tries = 4;
/// config.save("natpmp.json").expect("Failed to save");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NatPmpConfig {
    /// Gateway to use instead of the routing table's default gateway
    pub gateway: Option<Ipv4Addr>,
    /// Wait for the first reply before retransmitting, in milliseconds
    pub initial_retransmit_ms: u64,
    /// Sends per request; the wait doubles after every unanswered send
    pub max_tries: u32,
    /// Lowest external port picked for a new mapping
    pub external_port_min: u16,
    /// Highest external port picked for a new mapping
    pub external_port_max: u16,
}

impl NatPmpConfig {
    /// Load config from a JSON file
    ///
    /// Returns the default config if the file doesn't exist or is empty.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, NatError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .map_err(|e| NatError::Config(format!("Failed to read config: {}", e)))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_json::from_str(&data)
            .map_err(|e| NatError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;

        Ok(config)
    }

    /// Save config to a JSON file, creating parent directories
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), NatError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| NatError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| NatError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, json)
            .map_err(|e| NatError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Reject values the client or mapping algorithm cannot work with
    pub fn validate(&self) -> Result<(), NatError> {
        if self.max_tries == 0 {
            return Err(NatError::Config("max_tries must be at least 1".to_string()));
        }
        if self.initial_retransmit_ms == 0 {
            return Err(NatError::Config(
                "initial_retransmit_ms must be at least 1".to_string(),
            ));
        }
        if self.external_port_min == 0 {
            return Err(NatError::Config("external_port_min must not be 0".to_string()));
        }
        if self.external_port_min > self.external_port_max {
            return Err(NatError::Config(format!(
                "Empty external port range {}-{}",
                self.external_port_min, self.external_port_max
            )));
        }
        Ok(())
    }

    /// Range random external ports are drawn from, never empty
    pub fn external_port_range(&self) -> RangeInclusive<u16> {
        let min = self.external_port_min.max(1);
        let max = self.external_port_max.max(min);
        min..=max
    }
}

impl Default for NatPmpConfig {
    fn default() -> Self {
        Self {
            gateway: None,
            initial_retransmit_ms: 250, // RFC 6886 §3.1
            max_tries: 9,
            external_port_min: 10_000,
            external_port_max: 65_534,
        }
    }
}
