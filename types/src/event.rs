//! Scheduled skill uses and the cooldown intervals derived from them

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Job;

// ═══════════════════════════════════════════════════════════════════════════
// Owner Scope
// ═══════════════════════════════════════════════════════════════════════════

/// Which player (or job slot) a skill use belongs to.
///
/// Two uses of the same skill under different scopes draw from independent
/// cooldowns. An explicit player id wins over a job when both are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerScope {
    Player(i64),
    Job(Job),
}

impl OwnerScope {
    /// Resolve the scope for an owner id / job pair. `None` means the use is
    /// not attributed to anyone and shares the unscoped resource.
    pub fn resolve(owner_id: Option<i64>, owner_job: Option<Job>) -> Option<Self> {
        match (owner_id, owner_job) {
            (Some(id), _) => Some(OwnerScope::Player(id)),
            (None, Some(job)) => Some(OwnerScope::Job(job)),
            (None, None) => None,
        }
    }
}

impl fmt::Display for OwnerScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerScope::Player(id) => write!(f, "id:{id}"),
            OwnerScope::Job(job) => write!(f, "job:{job}"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Scheduled Event
// ═══════════════════════════════════════════════════════════════════════════

/// One planned use of a skill on the encounter timeline.
///
/// Field names serialize in camelCase so saved plans stay readable by the
/// web frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEvent {
    /// Unique identifier within a schedule
    pub id: String,

    /// Skill id, possibly carrying an owner suffix (`role-rampart@WAR`)
    pub skill_id: String,

    /// Use time, milliseconds from encounter start
    pub t_start_ms: i64,

    /// Effect duration taken from the skill definition
    pub duration_ms: i64,

    /// Always `t_start_ms + duration_ms`
    pub t_end_ms: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_job: Option<Job>,
}

impl ScheduledEvent {
    pub fn new(
        id: impl Into<String>,
        skill_id: impl Into<String>,
        t_start_ms: i64,
        duration_ms: i64,
    ) -> Self {
        Self {
            id: id.into(),
            skill_id: skill_id.into(),
            t_start_ms,
            duration_ms,
            t_end_ms: t_start_ms.saturating_add(duration_ms),
            owner_id: None,
            owner_job: None,
        }
    }

    pub fn with_owner(mut self, owner_id: Option<i64>, owner_job: Option<Job>) -> Self {
        self.owner_id = owner_id;
        self.owner_job = owner_job;
        self
    }

    pub fn owner_scope(&self) -> Option<OwnerScope> {
        OwnerScope::resolve(self.owner_id, self.owner_job)
    }

    /// Move the event to a new start time, keeping its duration.
    pub fn set_start(&mut self, t_start_ms: i64) {
        self.t_start_ms = t_start_ms;
        self.t_end_ms = t_start_ms.saturating_add(self.duration_ms);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Cooldown Interval
// ═══════════════════════════════════════════════════════════════════════════

/// Why a skill cannot be placed during an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownKind {
    /// The skill (or its last shared charge) is recharging
    Cooldown,
    /// Stock is still available, but a use here would starve a later
    /// scheduled use (rendered as a lead-in before the cooldown)
    Unusable,
}

/// A closed span during which a skill is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownInterval {
    pub kind: CooldownKind,

    /// Base skill id (owner suffix stripped)
    pub skill_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerScope>,

    pub t_start_ms: i64,
    pub t_end_ms: i64,

    /// Always `t_end_ms - t_start_ms`
    pub duration_ms: i64,
}

impl CooldownInterval {
    pub fn new(
        kind: CooldownKind,
        skill_id: impl Into<String>,
        owner: Option<OwnerScope>,
        t_start_ms: i64,
        t_end_ms: i64,
    ) -> Self {
        Self {
            kind,
            skill_id: skill_id.into(),
            owner,
            t_start_ms,
            t_end_ms,
            duration_ms: t_end_ms.saturating_sub(t_start_ms),
        }
    }

    /// True if both intervals belong to the same skill and owner and share
    /// more than a boundary instant.
    pub fn overlaps(&self, other: &CooldownInterval) -> bool {
        self.skill_id == other.skill_id
            && self.owner == other.owner
            && self.t_start_ms < other.t_end_ms
            && other.t_start_ms < self.t_end_ms
    }

    pub fn contains(&self, t_ms: i64) -> bool {
        t_ms >= self.t_start_ms && t_ms < self.t_end_ms
    }
}
