//! IPv6 Router Advertisement configuration engine (RFC 4861, RFC 4191).
//!
//! Keeps the parameters and prefixes a router advertises, and refuses any
//! change that would put an inconsistent RA on the wire. Packet I/O and
//! retransmission timing live elsewhere and read from a started [`Radv`].

pub mod config;
pub mod error;
pub mod flags;
pub mod prefix;
pub mod prefix_list;
pub mod radv;
pub mod scheduler;

pub use config::{PrefixConfig, RadvConfig};
pub use error::{RadvError, RadvResult};
pub use flags::{Preference, RouterFlags};
pub use prefix::Prefix;
pub use prefix_list::PrefixList;
pub use radv::{Radv, RadvState};
pub use scheduler::{CurrentRuntime, NoDefault, SchedulerProvider};
