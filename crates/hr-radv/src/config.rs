//! JSON-backed RA configuration, applied through the validated setters.

use std::path::Path;

use anyhow::{Context, Result};
use ipnet::Ipv6Net;
use serde::{Deserialize, Serialize};

use crate::error::{RadvError, RadvResult};
use crate::flags::Preference;
use crate::prefix::{DEFAULT_PREFERRED_LIFETIME, DEFAULT_VALID_LIFETIME, Prefix};
use crate::radv::Radv;

/// Declarative RA configuration, as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadvConfig {
    #[serde(default = "default_ifindex")]
    pub interface_index: i32,
    /// `aa:bb:cc:dd:ee:ff`, empty for none.
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub mtu: Option<u32>,
    #[serde(default = "default_hop_limit")]
    pub hop_limit: u8,
    #[serde(default = "default_router_lifetime")]
    pub router_lifetime_secs: u16,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub other_config: bool,
    #[serde(default)]
    pub preference: Preference,
    #[serde(default)]
    pub prefixes: Vec<PrefixConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefixConfig {
    /// CIDR notation, e.g. `2001:db8:1::/64`.
    pub prefix: String,
    #[serde(default = "default_true")]
    pub onlink: bool,
    #[serde(default = "default_true")]
    pub autoconf: bool,
    #[serde(default = "default_valid_lifetime")]
    pub valid_lifetime_secs: u32,
    #[serde(default = "default_preferred_lifetime")]
    pub preferred_lifetime_secs: u32,
}

fn default_ifindex() -> i32 { -1 }
fn default_hop_limit() -> u8 { 64 }
fn default_router_lifetime() -> u16 { 1800 }
fn default_true() -> bool { true }
fn default_valid_lifetime() -> u32 { DEFAULT_VALID_LIFETIME }
fn default_preferred_lifetime() -> u32 { DEFAULT_PREFERRED_LIFETIME }

impl Default for RadvConfig {
    fn default() -> Self {
        serde_json::from_str("{}").unwrap()
    }
}

impl RadvConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read RA config from {}", path.display()))?;
        let config: RadvConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse RA config from {}", path.display()))?;
        Ok(config)
    }

    /// Create an idle instance with every field applied through the
    /// validated setters. The event loop is left for the caller to attach.
    pub fn build(&self) -> RadvResult<Radv> {
        let ra = Radv::new();

        ra.set_ifindex(self.interface_index)?;
        ra.set_mac(parse_mac(&self.mac)?)?;
        if let Some(mtu) = self.mtu {
            ra.set_mtu(mtu)?;
        }
        ra.set_hop_limit(self.hop_limit)?;
        ra.set_managed_information(self.managed)?;
        ra.set_other_information(self.other_config)?;

        ra.set_preference(self.preference)?;
        ra.set_router_lifetime(self.router_lifetime_secs)?;

        for pfx in &self.prefixes {
            ra.add_prefix(&pfx.build()?)?;
        }

        Ok(ra)
    }
}

impl PrefixConfig {
    pub fn build(&self) -> RadvResult<Prefix> {
        let net: Ipv6Net = self.prefix.parse().map_err(|_| {
            RadvError::InvalidArgument(format!("invalid IPv6 prefix '{}'", self.prefix))
        })?;

        let prefix = Prefix::new();
        prefix.set_prefix(net.addr(), net.prefix_len())?;
        prefix.set_onlink(self.onlink);
        prefix.set_address_autoconfiguration(self.autoconf);
        prefix.set_valid_lifetime(self.valid_lifetime_secs);
        prefix.set_preferred_lifetime(self.preferred_lifetime_secs);
        Ok(prefix)
    }
}

fn parse_mac(s: &str) -> RadvResult<Option<[u8; 6]>> {
    if s.is_empty() {
        return Ok(None);
    }

    let invalid = || RadvError::InvalidArgument(format!("invalid MAC address '{}'", s));
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 6 {
        return Err(invalid());
    }

    let mut mac = [0u8; 6];
    for (byte, part) in mac.iter_mut().zip(&parts) {
        if part.len() != 2 {
            return Err(invalid());
        }
        *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
    }
    Ok(Some(mac))
}
