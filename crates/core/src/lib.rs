//! Shared data model for the TypeFast client crates.
//!
//! Scripts, schedules and routines mirror the JSON resources served by
//! the routine runner backend.

pub mod types;

pub use types::{QueueName, Routine, RoutineList, RoutineStatus, Schedule, Script, Timestamp};
