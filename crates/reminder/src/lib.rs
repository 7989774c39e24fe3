//! Periodic reminders for manually disconnected cluster nodes.
//!
//! Each cycle lists the cluster's nodes, keeps the ones an operator took
//! offline by hand, looks that operator up in the user directory and mails
//! them a reminder. Cycles keep no state between runs, so an operator is
//! reminded every cycle for as long as the node stays offline.

pub mod cluster;
pub mod directory;
pub mod error;
pub mod http;
pub mod runner;
pub mod scheduler;

pub use cluster::{NodeLister, UserDirectory};
pub use directory::FileDirectory;
pub use error::{ClusterError, ReminderError};
pub use http::ClusterApiClient;
pub use runner::{run_cycle, run_periodic};
pub use scheduler::{CycleReport, ReminderScheduler, SchedulerState, RECURRENCE_PERIOD};
