//! Cooldown engine
//!
//! Turns a list of scheduled skill uses into the spans during which each
//! skill cannot be placed, and answers placement queries while dragging.
//!
//! # Pipeline
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │            [ScheduledEvent]  +  SkillCatalog                   │
//! └───────────────────────────────────────────────────────────────┘
//!                              │  build_stack_events
//!                              ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  consume @ t / recover @ t+cd   per skill and per group        │
//! │  sorted by time, recover before consume                        │
//! └───────────────────────────────────────────────────────────────┘
//!                              │  sweep_boundaries (charge counters)
//!                              ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  SkillKey ─► [UnusedStart | UnusedEnd | CooldownStart | ...]   │
//! │  group changes fanned out to every member skill                │
//! └───────────────────────────────────────────────────────────────┘
//!                              │  materialize_all
//!                              ▼
//!                     [CooldownInterval]
//! ```
//!
//! `can_use_skill_at` works directly on the event list and never consults
//! the interval output, so the unusable lead-in (a display policy) cannot
//! influence what is legal.

mod materialize;
mod stack_event;
mod sweep;
mod validator;


use mitplan_types::{CooldownInterval, ScheduledEvent};
use thiserror::Error;

use crate::catalog::SkillCatalog;
use crate::resource::ResourceKey;

pub use materialize::{SweepFault, materialize_all, materialize_skill};
pub use stack_event::{StackEvent, StackEventKind, build_stack_events, sort_stack_events};
pub use sweep::{Boundary, BoundaryKind, BoundaryMap, sweep_boundaries};
pub use validator::{can_shift_events, can_use_skill_at};

/// Rendering policy for materialized intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Mark the span before an exhausting use as `unusable`
    pub unusable_lead_in: bool,
    /// Drop everything before the encounter start (t = 0)
    pub clip_to_origin: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            unusable_lead_in: true,
            clip_to_origin: true,
        }
    }
}

/// Why a schedule has no valid interval set
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("{resource} is over-committed at {t_ms}ms")]
    OverCommitted { resource: ResourceKey, t_ms: i64 },
}

/// Build cooldown intervals with the default rendering policy.
pub fn build_cooldown_intervals(
    catalog: &SkillCatalog,
    events: &[ScheduledEvent],
) -> Result<Vec<CooldownInterval>, BuildError> {
    build_with_options(catalog, events, &BuildOptions::default())
}

/// Run the full pipeline. Pure: the same events always give the same
/// intervals in the same order, whatever order the events are listed in.
pub fn build_with_options(
    catalog: &SkillCatalog,
    events: &[ScheduledEvent],
    options: &BuildOptions,
) -> Result<Vec<CooldownInterval>, BuildError> {
    let mut stack_events = build_stack_events(catalog, events);
    sort_stack_events(&mut stack_events);

    let boundaries = sweep_boundaries(catalog, &stack_events, options)?;
    let intervals = materialize_all(&boundaries, options);

    tracing::debug!(
        events = events.len(),
        intervals = intervals.len(),
        "Built cooldown intervals"
    );
    Ok(intervals)
}
