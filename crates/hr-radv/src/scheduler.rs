//! Event loop attachment.
//!
//! The engine only keeps the runtime handle and a priority for whoever drives
//! retransmissions; it never spawns anything on it.

use std::fmt;

use tokio::runtime::Handle;

/// Supplies a scheduler when the caller attaches without one.
pub trait SchedulerProvider: Send + Sync {
    fn default_scheduler(&self) -> Option<Handle>;
}

/// Falls back to the tokio runtime the caller is running inside, if any.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentRuntime;

impl SchedulerProvider for CurrentRuntime {
    fn default_scheduler(&self) -> Option<Handle> {
        Handle::try_current().ok()
    }
}

/// Never has a default scheduler to offer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDefault;

impl SchedulerProvider for NoDefault {
    fn default_scheduler(&self) -> Option<Handle> {
        None
    }
}

/// Scheduler handle plus priority as stored on an instance.
#[derive(Default)]
pub struct SchedulerBinding {
    handle: Option<Handle>,
    priority: i64,
}

impl SchedulerBinding {
    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<Handle> {
        self.handle.clone()
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    /// Store `handle`, or whatever `provider` offers when `handle` is `None`.
    /// Returns whether a scheduler ended up bound. The priority is stored
    /// either way.
    pub fn bind(
        &mut self,
        handle: Option<Handle>,
        priority: i64,
        provider: &dyn SchedulerProvider,
    ) -> bool {
        self.handle = handle.or_else(|| provider.default_scheduler());
        self.priority = priority;
        self.handle.is_some()
    }

    pub fn unbind(&mut self) -> Option<Handle> {
        self.handle.take()
    }
}

impl fmt::Debug for SchedulerBinding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SchedulerBinding")
            .field("bound", &self.is_bound())
            .field("priority", &self.priority)
            .finish()
    }
}
