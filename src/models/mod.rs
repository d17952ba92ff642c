//! Scheduling domain models.
//!
//! Core data types of the monthly production plan: the machine fleet,
//! the mold library, component demands, and the emitted schedule.
//! Entities are immutable within a single scheduling request.

mod component;
mod machine;
mod mold;
mod schedule;

pub use component::Component;
pub use machine::{Machine, MachineGroup};
pub use mold::Mold;
pub use schedule::{Assignment, Schedule, TaskType, NO_PRIOR};
