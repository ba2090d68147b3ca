//! Placement validator
//!
//! Answers "can this skill be used here?" straight from the event list,
//! without running the full interval pipeline. Used on every drag frame, so
//! it only looks at events sharing the candidate's skill or group.

use mitplan_types::{Job, ScheduledEvent};

use super::stack_event::StackEventKind;
use crate::catalog::{SkillCatalog, SkillDefinition, normalize_skill_id};

/// Check whether `skill_id` can be used at `proposed_start_ms` given the
/// committed `events`, ignoring any event whose id is in `exclude_ids`.
///
/// Unknown skills and starts before the pull are rejected. A use exactly
/// when a previous cooldown ends is legal.
pub fn can_use_skill_at(
    catalog: &SkillCatalog,
    skill_id: &str,
    proposed_start_ms: i64,
    events: &[ScheduledEvent],
    exclude_ids: &[String],
    owner_id: Option<i64>,
    owner_job: Option<Job>,
) -> bool {
    if proposed_start_ms < 0 {
        return false;
    }

    let base_skill_id = normalize_skill_id(skill_id);
    let Some(skill) = catalog.skill(base_skill_id) else {
        tracing::error!(skill_id = %base_skill_id, "Placement check for unknown skill");
        return false;
    };

    let candidates: Vec<&ScheduledEvent> = events
        .iter()
        .filter(|e| !exclude_ids.contains(&e.id))
        .filter(|e| skill.global || matches_owner(owner_id, owner_job, e))
        .collect();

    if !skill_level_free(skill, base_skill_id, proposed_start_ms, &candidates) {
        return false;
    }

    let Some(group_id) = skill.cooldown_group.as_deref() else {
        return true;
    };
    let Some(group) = catalog.group(group_id) else {
        tracing::warn!(skill_id = %base_skill_id, group_id, "Cooldown group missing, skipping group check");
        return true;
    };

    let group_cooldown_ms = group.cooldown_ms();
    if group_cooldown_ms <= 0 {
        return true;
    }
    let members = catalog.group_members(group_id);

    let mut checkpoints: Vec<(i64, StackEventKind)> = candidates
        .iter()
        .filter(|e| members.iter().any(|m| m == normalize_skill_id(&e.skill_id)))
        .map(|e| e.t_start_ms)
        .chain(std::iter::once(proposed_start_ms))
        .flat_map(|t| {
            [
                (t, StackEventKind::Consume),
                (t.saturating_add(group_cooldown_ms), StackEventKind::Recover),
            ]
        })
        .collect();
    checkpoints.sort();

    let max = i64::from(group.stack);
    let mut charges = max;
    for (t_ms, kind) in checkpoints {
        charges = (charges + kind.delta()).min(max);
        if charges < 0 {
            tracing::debug!(skill_id = %base_skill_id, group_id, t_ms, "Placement would overdraw group charges");
            return false;
        }
    }

    true
}

/// A player id narrows to that player's uses, a bare job to every use by
/// that job, and an unscoped query conflicts with everything.
fn matches_owner(owner_id: Option<i64>, owner_job: Option<Job>, event: &ScheduledEvent) -> bool {
    match (owner_id, owner_job) {
        (Some(id), _) => event.owner_id == Some(id),
        (None, Some(job)) => event.owner_job == Some(job),
        (None, None) => true,
    }
}

/// Symmetric recast check against earlier and later uses of the same skill
fn skill_level_free(
    skill: &SkillDefinition,
    base_skill_id: &str,
    proposed_start_ms: i64,
    candidates: &[&ScheduledEvent],
) -> bool {
    let cooldown_ms = skill.cooldown_ms();
    if cooldown_ms <= 0 {
        return true;
    }

    !candidates
        .iter()
        .filter(|e| normalize_skill_id(&e.skill_id) == base_skill_id)
        .any(|e| {
            let existing = e.t_start_ms;
            (existing <= proposed_start_ms && proposed_start_ms < existing.saturating_add(cooldown_ms))
                || (proposed_start_ms <= existing && existing < proposed_start_ms.saturating_add(cooldown_ms))
        })
}

/// Check a drag of several events at once.
///
/// Every moved event must land at or after the encounter start and be legal
/// against the committed events plus the other moved events at their new
/// positions.
pub fn can_shift_events(
    catalog: &SkillCatalog,
    events: &[ScheduledEvent],
    moving_ids: &[String],
    delta_ms: i64,
) -> bool {
    let shifted: Vec<ScheduledEvent> = events
        .iter()
        .map(|event| {
            let mut event = event.clone();
            if moving_ids.contains(&event.id) {
                event.set_start(event.t_start_ms.saturating_add(delta_ms));
            }
            event
        })
        .collect();

    shifted
        .iter()
        .filter(|event| moving_ids.contains(&event.id))
        .all(|event| {
            can_use_skill_at(
                catalog,
                &event.skill_id,
                event.t_start_ms,
                &shifted,
                std::slice::from_ref(&event.id),
                event.owner_id,
                event.owner_job,
            )
        })
}
