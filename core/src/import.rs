//! Cast-log import
//!
//! Converts cast records fetched from a combat-log service into scheduled
//! events for one player. Only abilities the catalog knows, and that the
//! selected job can slot, are kept.

use mitplan_types::formatting::round_to_tenth;
use mitplan_types::{Job, ScheduledEvent};
use serde::{Deserialize, Serialize};

use crate::catalog::SkillCatalog;

/// Kind of log record. Everything except casts is ignored on import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastKind {
    Cast,
    BeginCast,
    #[serde(other)]
    Other,
}

/// One raw record as handed over by the log client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastRecord {
    /// Absolute log timestamp in milliseconds
    pub timestamp_ms: i64,
    pub ability_id: u64,
    pub source_id: i64,
    #[serde(rename = "type")]
    pub kind: CastKind,
}

/// Player whose casts are being imported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTarget {
    pub job: Job,
    /// Only records from this source are kept, when set
    pub owner_id: Option<i64>,
    /// Absolute timestamp of the pull; event times are relative to it
    pub fight_start_ms: i64,
}

/// Build scheduled events from cast records, ordered by start time.
///
/// Times are rebased to the fight start and snapped to 0.1s. Records
/// before the pull are dropped. The resulting list is not validated;
/// callers hand it to `Schedule::replace_all`, which reports conflicts.
pub fn import_casts(
    catalog: &SkillCatalog,
    records: &[CastRecord],
    target: &ImportTarget,
) -> Vec<ScheduledEvent> {
    let mut events = Vec::new();
    let mut skipped = 0usize;

    for record in records {
        if !matches!(record.kind, CastKind::Cast | CastKind::BeginCast) {
            continue;
        }
        if target.owner_id.is_some_and(|id| id != record.source_id) {
            continue;
        }

        let Some(skill) = catalog
            .skill_by_action(record.ability_id)
            .filter(|skill| skill.available_to(target.job))
        else {
            skipped += 1;
            continue;
        };

        let t_start_ms = round_to_tenth(record.timestamp_ms.saturating_sub(target.fight_start_ms));
        if t_start_ms < 0 {
            tracing::debug!(ability_id = record.ability_id, t_start_ms, "Cast before pull, skipping");
            continue;
        }

        events.push(
            ScheduledEvent::new(
                String::new(),
                catalog.owner_skill_id(&skill.id, Some(target.job)),
                t_start_ms,
                skill.duration_ms(),
            )
            .with_owner(target.owner_id, Some(target.job)),
        );
    }

    events.sort_by_key(|e| e.t_start_ms);
    for (n, event) in events.iter_mut().enumerate() {
        event.id = format!("mit-{}", n + 1);
    }

    tracing::info!(
        imported = events.len(),
        skipped,
        job = %target.job,
        "Imported casts"
    );
    events
}
