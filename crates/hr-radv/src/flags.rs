//! Router Advertisement flags byte (RFC 4861 §4.2, RFC 4191 §2.2).
//!
//! ```text
//!  7   6   5   4   3   2   1   0
//! +---+---+---+---+---+---+---+---+
//! | M | O | H |  Prf  |  Reserved |
//! +---+---+---+---+---+---+---+---+
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{RadvError, RadvResult};

const FLAG_MANAGED: u8 = 0x80;
const FLAG_OTHER: u8 = 0x40;
const PREFERENCE_SHIFT: u8 = 3;

/// Default router preference (RFC 4191 §2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Low,
    #[default]
    Medium,
    High,
}

impl Preference {
    /// Two-bit wire value.
    pub fn bits(self) -> u8 {
        match self {
            Self::Medium => 0b00,
            Self::High => 0b01,
            Self::Low => 0b11,
        }
    }
}

impl TryFrom<u8> for Preference {
    type Error = RadvError;

    /// `0b10` is reserved and rejected along with anything wider than two bits.
    fn try_from(value: u8) -> RadvResult<Self> {
        match value {
            0b00 => Ok(Self::Medium),
            0b01 => Ok(Self::High),
            0b11 => Ok(Self::Low),
            other => Err(RadvError::InvalidArgument(format!(
                "invalid router preference {:#04b}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Preference {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Low => f.write_str("low"),
            Self::Medium => f.write_str("medium"),
            Self::High => f.write_str("high"),
        }
    }
}

/// Managed/Other flags plus router preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouterFlags {
    pub managed: bool,
    pub other_config: bool,
    pub preference: Preference,
}

impl RouterFlags {
    /// Packed byte as it goes on the wire.
    pub fn bits(&self) -> u8 {
        let mut bits = self.preference.bits() << PREFERENCE_SHIFT;
        if self.managed {
            bits |= FLAG_MANAGED;
        }
        if self.other_config {
            bits |= FLAG_OTHER;
        }
        bits
    }
}
