//! Router Advertisement instance.
//!
//! Holds everything a sender puts into an RA: interface, link-layer address,
//! MTU, hop limit, router lifetime, flags and the prefix list. Parameters can
//! only be changed while the instance is idle; once started it is read-only
//! until stopped again.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockWriteGuard};
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::error::{RadvError, RadvResult};
use crate::flags::{Preference, RouterFlags};
use crate::prefix::Prefix;
use crate::prefix_list::PrefixList;
use crate::scheduler::{CurrentRuntime, SchedulerBinding, SchedulerProvider};

/// IPv6 minimum link MTU (RFC 8200 §5).
pub const MIN_MTU: u32 = 1280;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RadvState {
    #[default]
    Idle,
    Advertising,
}

struct RadvInner {
    ifindex: i32,
    mac_addr: [u8; 6],
    mtu: u32,
    hop_limit: u8,
    lifetime: u16,
    flags: RouterFlags,
    state: RadvState,
    prefixes: PrefixList,
    event: SchedulerBinding,
    provider: Arc<dyn SchedulerProvider>,
}

impl Drop for RadvInner {
    fn drop(&mut self) {
        self.prefixes.clear();
        if self.event.unbind().is_some() {
            debug!("Detached event loop from RA instance");
        }
    }
}

impl fmt::Debug for RadvInner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RadvInner")
            .field("ifindex", &self.ifindex)
            .field("mac_addr", &self.mac_addr)
            .field("mtu", &self.mtu)
            .field("hop_limit", &self.hop_limit)
            .field("lifetime", &self.lifetime)
            .field("flags", &self.flags)
            .field("state", &self.state)
            .field("prefixes", &self.prefixes)
            .field("event", &self.event)
            .finish()
    }
}

/// Shared handle on an RA instance. Clones refer to the same instance; the
/// last one dropped detaches the event loop and releases every prefix.
#[derive(Debug, Clone)]
pub struct Radv {
    inner: Arc<RwLock<RadvInner>>,
}

impl Radv {
    pub fn new() -> Self {
        Self::with_provider(Arc::new(CurrentRuntime))
    }

    /// Like [`Radv::new`], with `provider` consulted when
    /// [`Radv::attach_event`] gets no scheduler.
    pub fn with_provider(provider: Arc<dyn SchedulerProvider>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RadvInner {
                ifindex: 0,
                mac_addr: [0; 6],
                mtu: 0,
                hop_limit: 0,
                lifetime: 0,
                flags: RouterFlags::default(),
                state: RadvState::Idle,
                prefixes: PrefixList::new(),
                event: SchedulerBinding::default(),
                provider,
            })),
        }
    }

    pub fn retain(&self) -> Self {
        self.clone()
    }

    pub fn release(self) {}

    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Write access, refused while advertising.
    fn idle_mut(&self) -> RadvResult<RwLockWriteGuard<'_, RadvInner>> {
        let inner = self.inner.write();
        if inner.state != RadvState::Idle {
            return Err(RadvError::Busy);
        }
        Ok(inner)
    }

    // ── Event loop ──────────────────────────────────────────────────────────

    /// Attach to `event`, or to the provider's default when `None`. Not
    /// finding a default is not an error; check [`Radv::event`] before
    /// starting.
    pub fn attach_event(&self, event: Option<Handle>, priority: i64) -> RadvResult<()> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        if inner.event.is_bound() {
            return Err(RadvError::AlreadyBound);
        }

        if !inner.event.bind(event, priority, inner.provider.as_ref()) {
            debug!("No default event loop available, RA instance left unattached");
        }

        Ok(())
    }

    pub fn detach_event(&self) {
        self.inner.write().event.unbind();
    }

    pub fn event(&self) -> Option<Handle> {
        self.inner.read().event.handle()
    }

    pub fn event_priority(&self) -> i64 {
        self.inner.read().event.priority()
    }

    // ── State machine ───────────────────────────────────────────────────────

    pub fn start(&self) -> RadvResult<()> {
        let mut inner = self.inner.write();

        if !inner.event.is_bound() {
            return Err(RadvError::NotBound);
        }
        if inner.ifindex <= 0 {
            return Err(RadvError::InvalidConfig(format!(
                "interface index {} is not set",
                inner.ifindex
            )));
        }

        if inner.state != RadvState::Idle {
            return Ok(());
        }

        inner.state = RadvState::Advertising;
        info!("Started IPv6 Router Advertisement daemon");
        Ok(())
    }

    pub fn stop(&self) {
        info!("Stopping IPv6 Router Advertisement daemon");
        self.inner.write().state = RadvState::Idle;
    }

    pub fn state(&self) -> RadvState {
        self.inner.read().state
    }

    pub fn is_advertising(&self) -> bool {
        self.state() == RadvState::Advertising
    }

    // ── Parameters ──────────────────────────────────────────────────────────

    /// `-1` clears the interface.
    pub fn set_ifindex(&self, ifindex: i32) -> RadvResult<()> {
        if ifindex < -1 {
            return Err(RadvError::InvalidArgument(format!(
                "invalid interface index {}",
                ifindex
            )));
        }
        self.idle_mut()?.ifindex = ifindex;
        Ok(())
    }

    /// `None` zeroes the address.
    pub fn set_mac(&self, mac_addr: Option<[u8; 6]>) -> RadvResult<()> {
        self.idle_mut()?.mac_addr = mac_addr.unwrap_or_default();
        Ok(())
    }

    pub fn set_mtu(&self, mtu: u32) -> RadvResult<()> {
        if mtu < MIN_MTU {
            return Err(RadvError::InvalidArgument(format!(
                "MTU {} below IPv6 minimum {}",
                mtu, MIN_MTU
            )));
        }
        self.idle_mut()?.mtu = mtu;
        Ok(())
    }

    pub fn set_hop_limit(&self, hop_limit: u8) -> RadvResult<()> {
        self.idle_mut()?.hop_limit = hop_limit;
        Ok(())
    }

    /// RFC 4191 §2.2: "If the Router Lifetime is zero, the preference value
    /// MUST be set to (00) by the sender". Checked in every state.
    pub fn set_router_lifetime(&self, secs: u16) -> RadvResult<()> {
        let mut inner = self.inner.write();

        if secs == 0 && inner.flags.preference != Preference::Medium {
            return Err(RadvError::PreferenceConflict);
        }
        if inner.state != RadvState::Idle {
            return Err(RadvError::Busy);
        }

        inner.lifetime = secs;
        Ok(())
    }

    pub fn set_managed_information(&self, managed: bool) -> RadvResult<()> {
        self.idle_mut()?.flags.managed = managed;
        Ok(())
    }

    pub fn set_other_information(&self, other: bool) -> RadvResult<()> {
        self.idle_mut()?.flags.other_config = other;
        Ok(())
    }

    /// Allowed while advertising. The zero-lifetime coupling is enforced by
    /// [`Radv::set_router_lifetime`].
    pub fn set_preference(&self, preference: Preference) -> RadvResult<()> {
        self.inner.write().flags.preference = preference;
        Ok(())
    }

    pub fn ifindex(&self) -> i32 {
        self.inner.read().ifindex
    }

    pub fn mac(&self) -> [u8; 6] {
        self.inner.read().mac_addr
    }

    pub fn mtu(&self) -> u32 {
        self.inner.read().mtu
    }

    pub fn hop_limit(&self) -> u8 {
        self.inner.read().hop_limit
    }

    pub fn router_lifetime(&self) -> u16 {
        self.inner.read().lifetime
    }

    pub fn flags(&self) -> RouterFlags {
        self.inner.read().flags
    }

    pub fn preference(&self) -> Preference {
        self.inner.read().flags.preference
    }

    // ── Prefixes ────────────────────────────────────────────────────────────

    /// Append `prefix` unless it overlaps one already configured. On success
    /// the instance holds its own handle.
    pub fn add_prefix(&self, prefix: &Prefix) -> RadvResult<()> {
        self.inner.write().prefixes.insert(prefix)
    }

    pub fn remove_prefix(&self, prefix: &Prefix) -> bool {
        self.inner.write().prefixes.remove(prefix)
    }

    /// Configured prefixes in advertisement order.
    pub fn prefixes(&self) -> Vec<Prefix> {
        self.inner.read().prefixes.to_vec()
    }

    pub fn n_prefixes(&self) -> usize {
        self.inner.read().prefixes.len()
    }
}

impl Default for Radv {
    fn default() -> Self {
        Self::new()
    }
}
