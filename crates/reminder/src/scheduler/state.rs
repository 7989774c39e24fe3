use std::sync::atomic::{AtomicBool, Ordering};

/// Whether a cycle is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next tick.
    Idle,
    /// Iterating nodes and dispatching reminders.
    Scanning,
}

/// Holds the Scanning flag for the lifetime of one cycle.
///
/// The flag is cleared on drop, so every exit path (including errors)
/// returns the scheduler to Idle.
pub(super) struct ScanGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ScanGuard<'a> {
    /// Enter Scanning, or `None` if a cycle is already running.
    pub(super) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
