//! Boundary sweep: stack counters to per-skill interval markers

use std::collections::BTreeMap;

use hashbrown::HashMap;

use super::stack_event::{StackEvent, StackEventKind};
use super::{BuildError, BuildOptions};
use crate::catalog::SkillCatalog;
use crate::resource::{ResourceBase, ResourceKey, SkillKey};

/// Edge of an unavailable span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    UnusedStart,
    UnusedEnd,
    CooldownStart,
    CooldownEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub kind: BoundaryKind,
    pub t_ms: i64,
}

impl Boundary {
    fn new(kind: BoundaryKind, t_ms: i64) -> Self {
        Self { kind, t_ms }
    }
}

/// Chronological boundary markers per skill lane
pub type BoundaryMap = BTreeMap<SkillKey, Vec<Boundary>>;

/// Replay sorted stack events against per-resource charge counters.
///
/// Exhausting a resource opens a cooldown (preceded by a retroactive
/// unusable lead-in when enabled); recovering its first charge closes it.
/// Group transitions are broadcast to every member skill. A counter going
/// negative means the schedule uses more charges than exist and aborts the
/// whole build.
pub fn sweep_boundaries(
    catalog: &SkillCatalog,
    stack_events: &[StackEvent],
    options: &BuildOptions,
) -> Result<BoundaryMap, BuildError> {
    let mut stacks: HashMap<ResourceKey, i64> = HashMap::new();
    let mut boundaries = BoundaryMap::new();

    for event in stack_events {
        let max = max_stack(catalog, &event.resource);
        let count = stacks.entry(event.resource.clone()).or_insert(max);
        let before = *count;
        *count += event.kind.delta();
        let after = *count;

        if after < 0 {
            tracing::error!(
                resource = %event.resource,
                skill_id = %event.skill_id,
                t_ms = event.t_ms,
                "Resource over-committed, cannot build cooldowns"
            );
            return Err(BuildError::OverCommitted {
                resource: event.resource.clone(),
                t_ms: event.t_ms,
            });
        }

        let markers = match (event.kind, after) {
            (StackEventKind::Consume, 0) if options.unusable_lead_in => vec![
                Boundary::new(BoundaryKind::UnusedStart, event.t_ms.saturating_sub(event.cooldown_ms)),
                Boundary::new(BoundaryKind::UnusedEnd, event.t_ms),
                Boundary::new(BoundaryKind::CooldownStart, event.t_ms),
            ],
            (StackEventKind::Consume, 0) => {
                vec![Boundary::new(BoundaryKind::CooldownStart, event.t_ms)]
            }
            (StackEventKind::Recover, 1) if before == 0 => {
                vec![Boundary::new(BoundaryKind::CooldownEnd, event.t_ms)]
            }
            _ => continue,
        };

        for skill_key in affected_skills(catalog, event) {
            boundaries
                .entry(skill_key)
                .or_default()
                .extend(markers.iter().copied());
        }
    }

    // Stable: markers at the same instant keep their emission order
    for markers in boundaries.values_mut() {
        markers.sort_by_key(|b| b.t_ms);
    }

    tracing::debug!(
        stack_events = stack_events.len(),
        lanes = boundaries.len(),
        "Swept cooldown boundaries"
    );
    Ok(boundaries)
}

fn max_stack(catalog: &SkillCatalog, resource: &ResourceKey) -> i64 {
    match &resource.base {
        ResourceBase::Skill(_) => 1,
        ResourceBase::Group(group_id) => catalog
            .group(group_id)
            .map_or(1, |group| i64::from(group.stack)),
    }
}

/// Skill lanes a resource change shows up on
fn affected_skills(catalog: &SkillCatalog, event: &StackEvent) -> Vec<SkillKey> {
    match &event.resource.base {
        ResourceBase::Skill(skill_id) => vec![SkillKey::new(skill_id.as_str(), event.owner())],
        ResourceBase::Group(group_id) => catalog
            .group_members(group_id)
            .iter()
            .map(|member| SkillKey::new(member.as_str(), event.owner()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogConfig;
    use crate::cooldown::stack_event::{build_stack_events, sort_stack_events};
    use mitplan_types::ScheduledEvent;

    use super::BoundaryKind::*;

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
cooldown_secs = 0.0
duration_secs = 8.0
cooldown_group = "grp"

[[skill]]
id = "g2"
name = "G2"
cooldown_secs = 0.0
duration_secs = 8.0
cooldown_group = "grp"

[[group]]
id = "grp"
cooldown_secs = 60.0
stack = 2
"#,
        )
        .unwrap();
        SkillCatalog::new(config).unwrap()
    }

    fn sweep(events: &[ScheduledEvent], options: BuildOptions) -> Result<BoundaryMap, BuildError> {
        let catalog = catalog();
        let mut stack_events = build_stack_events(&catalog, events);
        sort_stack_events(&mut stack_events);
        sweep_boundaries(&catalog, &stack_events, &options)
    }

    fn kinds(markers: &[Boundary]) -> Vec<(BoundaryKind, i64)> {
        markers.iter().map(|b| (b.kind, b.t_ms)).collect()
    }

    #[test]
    fn test_single_use_emits_lead_in_and_cooldown() {
        let map = sweep(&[ScheduledEvent::new("e", "a", 0, 10_000)], BuildOptions::default()).unwrap();
        let markers = &map[&SkillKey::new("a", None)];
        assert_eq!(
            kinds(markers),
            [
                (UnusedStart, -30_000),
                (UnusedEnd, 0),
                (CooldownStart, 0),
                (CooldownEnd, 30_000),
            ]
        );
    }

    #[test]
    fn test_without_lead_in_only_cooldown_markers() {
        let options = BuildOptions {
            unusable_lead_in: false,
            ..BuildOptions::default()
        };
        let map = sweep(&[ScheduledEvent::new("e", "a", 0, 10_000)], options).unwrap();
        assert_eq!(
            kinds(&map[&SkillKey::new("a", None)]),
            [(CooldownStart, 0), (CooldownEnd, 30_000)]
        );
    }

    #[test]
    fn test_group_markers_broadcast_to_all_members() {
        let events = vec![
            ScheduledEvent::new("e1", "g1", 0, 8_000),
            ScheduledEvent::new("e2", "g1", 10_000, 8_000),
        ];
        let map = sweep(&events, BuildOptions::default()).unwrap();

        let g1 = kinds(&map[&SkillKey::new("g1", None)]);
        let g2 = kinds(&map[&SkillKey::new("g2", None)]);
        assert_eq!(g1, g2, "g2 was never used but shares the pool");
        // Pool only empties on the second charge and refills its first at 60s
        assert_eq!(
            g1,
            [
                (UnusedStart, -50_000),
                (UnusedEnd, 10_000),
                (CooldownStart, 10_000),
                (CooldownEnd, 60_000),
            ]
        );
    }

    #[test]
    fn test_partial_group_use_emits_nothing() {
        let map = sweep(&[ScheduledEvent::new("e1", "g2", 0, 8_000)], BuildOptions::default()).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_overcommit_aborts() {
        let events = vec![
            ScheduledEvent::new("e1", "g1", 0, 8_000),
            ScheduledEvent::new("e2", "g2", 0, 8_000),
            ScheduledEvent::new("e3", "g1", 0, 8_000),
        ];
        let err = sweep(&events, BuildOptions::default()).unwrap_err();
        assert_eq!(
            err,
            BuildError::OverCommitted {
                resource: ResourceKey::group("grp", None),
                t_ms: 0,
            }
        );
    }

    #[test]
    fn test_owners_have_separate_counters() {
        let events = vec![
            ScheduledEvent::new("e1", "a", 0, 10_000).with_owner(Some(1), None),
            ScheduledEvent::new("e2", "a", 0, 10_000).with_owner(Some(2), None),
        ];
        let map = sweep(&events, BuildOptions::default()).unwrap();
        assert_eq!(map.len(), 2);
    }
}
