//! Application-side plan state
//!
//! `Schedule` owns the committed event list and the interval set derived
//! from it. Every structural change reruns the whole cooldown pipeline; if
//! the new list is over-committed, the last good intervals are kept and the
//! schedule reports itself invalid until the conflict is fixed.

mod persist;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mitplan_types::{CooldownInterval, Job, ScheduledEvent};
use thiserror::Error;

use crate::catalog::SkillCatalog;
use crate::cooldown::{
    BuildError, BuildOptions, build_with_options, can_shift_events, can_use_skill_at,
};

pub use persist::{SCHEDULE_FORMAT_VERSION, ScheduleFile, load_events, save_events};

/// Prefix for generated event ids
const EVENT_ID_PREFIX: &str = "mit-";

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("no event with id {0:?}")]
    UnknownEvent(String),

    #[error("unknown skill {0:?}")]
    UnknownSkill(String),

    #[error("event {id:?} would start before the encounter ({t_ms}ms)")]
    NegativeStart { id: String, t_ms: i64 },

    #[error("{skill_id} cannot be used at {t_ms}ms")]
    PlacementRejected { skill_id: String, t_ms: i64 },

    #[error("moving {count} event(s) by {delta_ms}ms would conflict")]
    MoveRejected { count: usize, delta_ms: i64 },

    #[error("IO error for {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported plan format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Committed events plus their last successfully built intervals
#[derive(Debug, Clone)]
pub struct Schedule {
    catalog: Arc<SkillCatalog>,
    options: BuildOptions,
    events: Vec<ScheduledEvent>,

    // ─── Derived ─────────────────────────────────────────────────────────────
    intervals: Vec<CooldownInterval>,
    last_error: Option<BuildError>,
    next_id: u64,
}

impl Schedule {
    pub fn new(catalog: Arc<SkillCatalog>) -> Self {
        Self::with_options(catalog, BuildOptions::default())
    }

    pub fn with_options(catalog: Arc<SkillCatalog>, options: BuildOptions) -> Self {
        Self {
            catalog,
            options,
            events: Vec::new(),
            intervals: Vec::new(),
            last_error: None,
            next_id: 1,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    pub fn event(&self, id: &str) -> Option<&ScheduledEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Intervals from the most recent successful build
    pub fn intervals(&self) -> &[CooldownInterval] {
        &self.intervals
    }

    /// False while the committed events over-commit some resource
    pub fn is_valid(&self) -> bool {
        self.last_error.is_none()
    }

    pub fn last_error(&self) -> Option<&BuildError> {
        self.last_error.as_ref()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════

    /// Placement check against the committed events
    pub fn can_use_skill_at(
        &self,
        skill_id: &str,
        t_start_ms: i64,
        exclude_ids: &[String],
        owner_id: Option<i64>,
        owner_job: Option<Job>,
    ) -> bool {
        can_use_skill_at(
            &self.catalog,
            skill_id,
            t_start_ms,
            &self.events,
            exclude_ids,
            owner_id,
            owner_job,
        )
    }

    pub fn can_shift_events(&self, ids: &[String], delta_ms: i64) -> bool {
        can_shift_events(&self.catalog, &self.events, ids, delta_ms)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Mutations
    // ═══════════════════════════════════════════════════════════════════════

    /// Place a new use of `skill_id`. Returns the generated event id.
    pub fn add_skill(
        &mut self,
        skill_id: &str,
        t_start_ms: i64,
        owner_id: Option<i64>,
        owner_job: Option<Job>,
    ) -> Result<String, ScheduleError> {
        let skill = self
            .catalog
            .skill(skill_id)
            .ok_or_else(|| ScheduleError::UnknownSkill(skill_id.to_string()))?;
        let duration_ms = skill.duration_ms();

        if !self.can_use_skill_at(skill_id, t_start_ms, &[], owner_id, owner_job) {
            return Err(ScheduleError::PlacementRejected {
                skill_id: skill_id.to_string(),
                t_ms: t_start_ms,
            });
        }

        let id = self.generate_id();
        let stored_skill_id = self.catalog.owner_skill_id(skill_id, owner_job);
        self.events.push(
            ScheduledEvent::new(id.clone(), stored_skill_id, t_start_ms, duration_ms)
                .with_owner(owner_id, owner_job),
        );
        self.rebuild();

        tracing::debug!(event_id = %id, skill_id, t_start_ms, "Added event");
        Ok(id)
    }

    /// Shift several events together by `delta_ms`
    pub fn move_events(&mut self, ids: &[String], delta_ms: i64) -> Result<(), ScheduleError> {
        for id in ids {
            let event = self
                .event(id)
                .ok_or_else(|| ScheduleError::UnknownEvent(id.clone()))?;
            let new_start = event.t_start_ms.saturating_add(delta_ms);
            if new_start < 0 {
                return Err(ScheduleError::NegativeStart {
                    id: id.clone(),
                    t_ms: new_start,
                });
            }
        }

        if !self.can_shift_events(ids, delta_ms) {
            return Err(ScheduleError::MoveRejected {
                count: ids.len(),
                delta_ms,
            });
        }

        for event in self.events.iter_mut().filter(|e| ids.contains(&e.id)) {
            event.set_start(event.t_start_ms.saturating_add(delta_ms));
        }
        self.rebuild();
        Ok(())
    }

    /// Remove events by id. Returns how many were removed.
    pub fn remove_events(&mut self, ids: &[String]) -> usize {
        let before = self.events.len();
        self.events.retain(|e| !ids.contains(&e.id));
        let removed = before - self.events.len();

        if removed > 0 {
            self.rebuild();
        }
        removed
    }

    /// Replace the whole event list (import, undo). Not validated: the new
    /// list may leave the schedule invalid.
    pub fn replace_all(&mut self, events: Vec<ScheduledEvent>) {
        self.events = events;
        self.next_id = 1;
        self.rebuild();
    }

    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Persistence
    // ═══════════════════════════════════════════════════════════════════════

    pub fn save_json(&self, path: &Path) -> Result<(), ScheduleError> {
        save_events(path, &self.events)
    }

    pub fn load_json(catalog: Arc<SkillCatalog>, path: &Path) -> Result<Self, ScheduleError> {
        let mut schedule = Self::new(catalog);
        schedule.replace_all(load_events(path)?);
        Ok(schedule)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Internals
    // ═══════════════════════════════════════════════════════════════════════

    fn rebuild(&mut self) {
        match build_with_options(&self.catalog, &self.events, &self.options) {
            Ok(intervals) => {
                self.intervals = intervals;
                self.last_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Schedule is over-committed, keeping previous intervals");
                self.last_error = Some(e);
            }
        }
    }

    fn generate_id(&mut self) -> String {
        loop {
            let id = format!("{EVENT_ID_PREFIX}{}", self.next_id);
            self.next_id += 1;
            if self.event(&id).is_none() {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogConfig;
    use mitplan_types::CooldownKind;

    fn catalog() -> Arc<SkillCatalog> {
        let config: CatalogConfig = toml::from_str(
            r#"
[[skill]]
id = "a"
name = "A"
cooldown_secs = 30.0
duration_secs = 10.0

[[skill]]
id = "rampart"
name = "Rampart"
cooldown_secs = 90.0
duration_secs = 20.0
role = "tank"
role_shared = true
"#,
        )
        .unwrap();
        Arc::new(SkillCatalog::new(config).unwrap())
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_add_skill_commits_and_rebuilds() {
        let mut schedule = Schedule::new(catalog());
        let id = schedule.add_skill("a", 0, None, None).unwrap();

        assert_eq!(id, "mit-1");
        assert_eq!(schedule.event(&id).unwrap().t_end_ms, 10_000);
        assert_eq!(schedule.intervals().len(), 1);
        assert_eq!(schedule.intervals()[0].kind, CooldownKind::Cooldown);
        assert!(schedule.is_valid());
    }

    #[test]
    fn test_add_skill_rejects_conflicts_and_unknowns() {
        let mut schedule = Schedule::new(catalog());
        schedule.add_skill("a", 0, None, None).unwrap();

        assert!(matches!(
            schedule.add_skill("a", 10_000, None, None),
            Err(ScheduleError::PlacementRejected { t_ms: 10_000, .. })
        ));
        assert!(matches!(
            schedule.add_skill("nope", 0, None, None),
            Err(ScheduleError::UnknownSkill(_))
        ));
        assert!(schedule.add_skill("a", -5, None, None).is_err());
        assert_eq!(schedule.events().len(), 1);
    }

    #[test]
    fn test_role_shared_skill_gets_job_suffix() {
        let mut schedule = Schedule::new(catalog());
        let id = schedule.add_skill("rampart", 0, None, Some(Job::Gnb)).unwrap();
        assert_eq!(schedule.event(&id).unwrap().skill_id, "rampart@GNB");

        // Another tank's rampart is independent
        assert!(schedule.add_skill("rampart", 0, None, Some(Job::Drk)).is_ok());
    }

    #[test]
    fn test_move_events() {
        let mut schedule = Schedule::new(catalog());
        let first = schedule.add_skill("a", 0, None, None).unwrap();
        let second = schedule.add_skill("a", 40_000, None, None).unwrap();

        assert!(matches!(
            schedule.move_events(&ids(&[second.as_str()]), -20_000),
            Err(ScheduleError::MoveRejected { .. })
        ));
        assert!(matches!(
            schedule.move_events(&ids(&[first.as_str()]), -1),
            Err(ScheduleError::NegativeStart { .. })
        ));
        assert!(matches!(
            schedule.move_events(&ids(&["ghost"]), 0),
            Err(ScheduleError::UnknownEvent(_))
        ));

        schedule.move_events(&ids(&[first.as_str(), second.as_str()]), 5_000).unwrap();
        assert_eq!(schedule.event(&first).unwrap().t_start_ms, 5_000);
        assert_eq!(schedule.event(&second).unwrap().t_end_ms, 55_000);
        let first_cooldown = schedule
            .intervals()
            .iter()
            .find(|i| i.kind == CooldownKind::Cooldown)
            .unwrap();
        assert_eq!(first_cooldown.t_start_ms, 5_000);
    }

    #[test]
    fn test_invalid_replace_keeps_last_good_intervals() {
        let mut schedule = Schedule::new(catalog());
        schedule.add_skill("a", 0, None, None).unwrap();
        let good = schedule.intervals().to_vec();

        schedule.replace_all(vec![
            ScheduledEvent::new("x1", "a", 0, 10_000),
            ScheduledEvent::new("x2", "a", 5_000, 10_000),
        ]);
        assert!(!schedule.is_valid());
        assert!(matches!(schedule.last_error(), Some(BuildError::OverCommitted { .. })));
        assert_eq!(schedule.intervals(), good.as_slice());

        // Fixing the conflict makes it valid again
        assert_eq!(schedule.remove_events(&ids(&["x2"])), 1);
        assert!(schedule.is_valid());
    }

    #[test]
    fn test_generated_ids_skip_existing() {
        let mut schedule = Schedule::new(catalog());
        schedule.replace_all(vec![ScheduledEvent::new("mit-1", "a", 0, 10_000)]);
        let id = schedule.add_skill("a", 30_000, None, None).unwrap();
        assert_eq!(id, "mit-2");
    }

    #[test]
    fn test_save_and_load_rebuilds_intervals() {
        let path = std::env::temp_dir()
            .join(format!("mitplan-schedule-{}", std::process::id()))
            .join("plan.json");

        let mut schedule = Schedule::new(catalog());
        schedule.add_skill("a", 0, Some(3), None).unwrap();
        schedule.add_skill("a", 30_000, Some(3), None).unwrap();
        schedule.save_json(&path).unwrap();

        let loaded = Schedule::load_json(catalog(), &path).unwrap();
        assert_eq!(loaded.events(), schedule.events());
        assert_eq!(loaded.intervals(), schedule.intervals());

        let _ = std::fs::remove_file(&path);
    }
}
