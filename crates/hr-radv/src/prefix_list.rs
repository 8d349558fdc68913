use tracing::{debug, warn};

use crate::error::{RadvError, RadvResult};
use crate::prefix::Prefix;

/// Prefixes in configuration order, which is also the order they are
/// advertised in. No two entries cover overlapping address space.
#[derive(Debug, Default)]
pub struct PrefixList {
    entries: Vec<Prefix>,
}

impl PrefixList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clone of `prefix`. On overlap nothing is stored and the
    /// caller's handle count is left alone.
    pub fn insert(&mut self, prefix: &Prefix) -> RadvResult<()> {
        if let Some(cur) = self.entries.iter().find(|cur| cur.overlaps(prefix)) {
            let (existing, candidate) = (cur.to_string(), prefix.to_string());
            warn!(
                "IPv6 prefix {} already configured, ignoring {}",
                existing, candidate
            );
            return Err(RadvError::AlreadyExists {
                existing,
                candidate,
            });
        }

        self.entries.push(prefix.retain());
        debug!("Added prefix {}", prefix);
        Ok(())
    }

    /// Drop the entry sharing `prefix`'s identity, if any.
    pub fn remove(&mut self, prefix: &Prefix) -> bool {
        match self.entries.iter().position(|cur| cur.ptr_eq(prefix)) {
            Some(idx) => {
                let removed = self.entries.remove(idx);
                debug!("Removed prefix {}", removed);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prefix> {
        self.entries.iter()
    }

    /// Handles in advertisement order.
    pub fn to_vec(&self) -> Vec<Prefix> {
        self.entries.clone()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
