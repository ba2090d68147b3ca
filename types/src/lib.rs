//! Shared data types for mitplan.
//!
//! Everything here is plain serde data: the scheduled skill uses owned by the
//! application, the derived cooldown intervals handed back by the engine, and
//! the job/owner identifiers both sides key off.

pub mod formatting;

mod event;
mod job;

pub use event::{CooldownInterval, CooldownKind, OwnerScope, ScheduledEvent};
pub use job::{Job, ParseJobError, Role};
