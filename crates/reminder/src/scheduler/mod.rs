//! The reminder cycle: scan nodes, attribute manual disconnects, notify.
//!
//! A [`ReminderScheduler`] runs one cycle per [`execute`](ReminderScheduler::execute)
//! call. It is registered once and driven by a host timer (see
//! [`run_periodic`](crate::runner::run_periodic)); nothing is carried over
//! between cycles.

mod core;
mod report;
mod state;


pub use self::core::{ReminderScheduler, RECURRENCE_PERIOD};
pub use self::report::CycleReport;
pub use self::state::SchedulerState;
