//! Expansion of scheduled skill uses into resource consume/recover events

use std::cmp::Ordering;

use mitplan_types::{OwnerScope, ScheduledEvent};

use crate::catalog::{SkillCatalog, normalize_skill_id};
use crate::resource::ResourceKey;

/// Direction of a stack change.
///
/// Variant order is the tie-break at equal timestamps: a charge recovering
/// at `t` is available to a use at the same `t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StackEventKind {
    Recover,
    Consume,
}

impl StackEventKind {
    pub fn delta(self) -> i64 {
        match self {
            StackEventKind::Recover => 1,
            StackEventKind::Consume => -1,
        }
    }
}

/// One change to a resource counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEvent {
    pub resource: ResourceKey,
    /// Base id of the skill whose use produced this event
    pub skill_id: String,
    pub kind: StackEventKind,
    /// Recharge time of the resource (skill or group cooldown)
    pub cooldown_ms: i64,
    pub t_ms: i64,
}

impl StackEvent {
    pub fn owner(&self) -> Option<OwnerScope> {
        self.resource.owner
    }

    pub fn is_group(&self) -> bool {
        self.resource.is_group()
    }
}

/// Expand each scheduled use into a consume/recover pair for the skill's own
/// cooldown, plus another pair for its shared group when it has one.
///
/// Events naming a skill missing from the catalog are logged and skipped.
/// Zero-length cooldowns never block anything and produce no pair.
pub fn build_stack_events(catalog: &SkillCatalog, events: &[ScheduledEvent]) -> Vec<StackEvent> {
    let mut stack_events = Vec::with_capacity(events.len() * 2);

    for event in events {
        let base_skill_id = normalize_skill_id(&event.skill_id);
        let Some(skill) = catalog.skill(base_skill_id) else {
            tracing::error!(
                event_id = %event.id,
                skill_id = %base_skill_id,
                "Scheduled event references an unknown skill, skipping"
            );
            continue;
        };

        let owner = catalog.scope_for(skill, event.owner_scope());
        push_pair(
            &mut stack_events,
            ResourceKey::skill(base_skill_id, owner),
            base_skill_id,
            event.t_start_ms,
            skill.cooldown_ms(),
        );

        let Some(group_id) = skill.cooldown_group.as_deref() else {
            continue;
        };
        let Some(group) = catalog.group(group_id) else {
            tracing::error!(skill_id = %base_skill_id, group_id, "Unknown cooldown group");
            continue;
        };
        push_pair(
            &mut stack_events,
            ResourceKey::group(group_id, owner),
            base_skill_id,
            event.t_start_ms,
            group.cooldown_ms(),
        );
    }

    stack_events
}

fn push_pair(
    stack_events: &mut Vec<StackEvent>,
    resource: ResourceKey,
    skill_id: &str,
    t_start_ms: i64,
    cooldown_ms: i64,
) {
    if cooldown_ms <= 0 {
        return;
    }

    stack_events.push(StackEvent {
        resource: resource.clone(),
        skill_id: skill_id.to_string(),
        kind: StackEventKind::Consume,
        cooldown_ms,
        t_ms: t_start_ms,
    });
    stack_events.push(StackEvent {
        resource,
        skill_id: skill_id.to_string(),
        kind: StackEventKind::Recover,
        cooldown_ms,
        t_ms: t_start_ms.saturating_add(cooldown_ms),
    });
}

/// Chronological order, recover before consume at the same instant.
///
/// Remaining ties are broken by resource and skill so the order never
/// depends on how the input list happened to be arranged.
pub fn compare_stack_events(a: &StackEvent, b: &StackEvent) -> Ordering {
    a.t_ms
        .cmp(&b.t_ms)
        .then(a.kind.cmp(&b.kind))
        .then_with(|| a.resource.cmp(&b.resource))
        .then_with(|| a.skill_id.cmp(&b.skill_id))
}

pub fn sort_stack_events(stack_events: &mut [StackEvent]) {
    stack_events.sort_by(compare_stack_events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogConfig;
    use mitplan_types::Job;

    fn catalog() -> SkillCatalog {
        let config: CatalogConfig = toml::from_str(
            r#"
[[skill]]
id = "a"
name = "A"
cooldown_secs = 30.0
duration_secs = 10.0

[[skill]]
id = "g1"
name = "G1"
cooldown_secs = 5.0
duration_secs = 8.0
cooldown_group = "grp"

[[skill]]
id = "free"
name = "Free"
cooldown_secs = 0.0
duration_secs = 5.0

[[skill]]
id = "raid"
name = "Raid"
cooldown_secs = 120.0
duration_secs = 20.0
global = true

[[group]]
id = "grp"
cooldown_secs = 60.0
stack = 2
"#,
        )
        .unwrap();
        SkillCatalog::new(config).unwrap()
    }

    #[test]
    fn test_plain_skill_emits_one_pair() {
        let events = vec![ScheduledEvent::new("e1", "a", 1_000, 10_000)];
        let stack_events = build_stack_events(&catalog(), &events);

        assert_eq!(stack_events.len(), 2);
        assert_eq!(stack_events[0].kind, StackEventKind::Consume);
        assert_eq!(stack_events[0].t_ms, 1_000);
        assert_eq!(stack_events[1].kind, StackEventKind::Recover);
        assert_eq!(stack_events[1].t_ms, 31_000);
        assert!(!stack_events[0].is_group());
    }

    #[test]
    fn test_group_member_emits_skill_and_group_pairs() {
        let events = vec![
            ScheduledEvent::new("e1", "g1", 0, 8_000).with_owner(Some(9), Some(Job::Pld)),
        ];
        let stack_events = build_stack_events(&catalog(), &events);

        assert_eq!(stack_events.len(), 4);
        let group: Vec<_> = stack_events.iter().filter(|e| e.is_group()).collect();
        assert_eq!(group.len(), 2);
        assert_eq!(group[1].t_ms, 60_000);
        assert_eq!(group[0].owner(), Some(OwnerScope::Player(9)));
        assert_eq!(group[0].resource.to_string(), "grp:grp:id:9");
    }

    #[test]
    fn test_unknown_skill_is_skipped_not_fatal() {
        let events = vec![
            ScheduledEvent::new("bad", "does-not-exist", 0, 0),
            ScheduledEvent::new("ok", "a", 0, 10_000),
        ];
        let stack_events = build_stack_events(&catalog(), &events);
        assert_eq!(stack_events.len(), 2);
        assert!(stack_events.iter().all(|e| e.skill_id == "a"));
    }

    #[test]
    fn test_zero_cooldown_emits_nothing() {
        let events = vec![ScheduledEvent::new("e", "free", 0, 5_000)];
        assert!(build_stack_events(&catalog(), &events).is_empty());
    }

    #[test]
    fn test_global_skill_ignores_owner() {
        let events = vec![ScheduledEvent::new("e", "raid", 0, 20_000).with_owner(Some(1), None)];
        let stack_events = build_stack_events(&catalog(), &events);
        assert_eq!(stack_events[0].owner(), None);
    }

    #[test]
    fn test_owner_suffix_is_stripped() {
        let events = vec![ScheduledEvent::new("e", "a@WAR", 0, 10_000)];
        let stack_events = build_stack_events(&catalog(), &events);
        assert_eq!(stack_events[0].skill_id, "a");
        assert_eq!(stack_events[0].resource, ResourceKey::skill("a", None));
    }

    #[test]
    fn test_sort_puts_recover_before_consume() {
        let events = vec![
            ScheduledEvent::new("second", "a", 30_000, 10_000),
            ScheduledEvent::new("first", "a", 0, 10_000),
        ];
        let mut stack_events = build_stack_events(&catalog(), &events);
        sort_stack_events(&mut stack_events);

        let order: Vec<_> = stack_events.iter().map(|e| (e.t_ms, e.kind)).collect();
        assert_eq!(
            order,
            [
                (0, StackEventKind::Consume),
                (30_000, StackEventKind::Recover),
                (30_000, StackEventKind::Consume),
                (60_000, StackEventKind::Recover),
            ]
        );
    }
}
