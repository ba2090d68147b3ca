//! Materializer: boundary markers to closed cooldown intervals

use mitplan_types::{CooldownInterval, CooldownKind};
use thiserror::Error;

use super::BuildOptions;
use super::sweep::{Boundary, BoundaryKind, BoundaryMap};
use crate::resource::SkillKey;

/// Internal-consistency faults in a skill's marker sequence
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SweepFault {
    #[error("{kind:?} at {t_ms}ms closes an interval that was never opened")]
    Unopened { kind: BoundaryKind, t_ms: i64 },

    #[error("interval opened at {t_ms}ms is never closed")]
    Unclosed { t_ms: i64 },
}

/// Materialize every lane. A lane with inconsistent markers is logged and
/// dropped; the rest are still returned.
///
/// Output is ordered by start time, then skill, then owner.
pub fn materialize_all(boundaries: &BoundaryMap, options: &BuildOptions) -> Vec<CooldownInterval> {
    let mut intervals = Vec::new();

    for (skill_key, markers) in boundaries {
        match materialize_skill(skill_key, markers, options) {
            Ok(lane) => intervals.extend(lane),
            Err(fault) => {
                tracing::error!(
                    skill = %skill_key,
                    error = %fault,
                    "Malformed cooldown boundaries, dropping skill intervals"
                );
            }
        }
    }

    intervals.sort_by(|a, b| {
        a.t_start_ms
            .cmp(&b.t_start_ms)
            .then_with(|| a.skill_id.cmp(&b.skill_id))
            .then_with(|| a.owner.cmp(&b.owner))
    });
    intervals
}

/// Sweep one lane's markers (already sorted by time) into intervals.
///
/// Cooldown and unusable spans may nest; counters track how many of each
/// are open so a lane is covered back to back while anything is open.
pub fn materialize_skill(
    skill_key: &SkillKey,
    markers: &[Boundary],
    options: &BuildOptions,
) -> Result<Vec<CooldownInterval>, SweepFault> {
    let mut lane = Lane::new(skill_key, options);

    for marker in markers {
        let t_ms = marker.t_ms;
        match marker.kind {
            BoundaryKind::UnusedStart => {
                if lane.unusable_open == 0 && lane.cooldown_open == 0 {
                    lane.open(CooldownKind::Unusable, t_ms);
                }
                lane.unusable_open += 1;
            }
            BoundaryKind::UnusedEnd => {
                if lane.unusable_open == 0 {
                    return Err(SweepFault::Unopened { kind: marker.kind, t_ms });
                }
                lane.unusable_open -= 1;
                if lane.unusable_open == 0 && lane.cooldown_open == 0 {
                    lane.close(marker.kind, t_ms)?;
                }
            }
            BoundaryKind::CooldownStart => {
                if !lane.is_open(CooldownKind::Cooldown) {
                    if lane.is_open(CooldownKind::Unusable) {
                        lane.close(marker.kind, t_ms)?;
                    }
                    lane.open(CooldownKind::Cooldown, t_ms);
                }
                lane.cooldown_open += 1;
            }
            BoundaryKind::CooldownEnd => {
                if lane.cooldown_open == 0 {
                    return Err(SweepFault::Unopened { kind: marker.kind, t_ms });
                }
                lane.cooldown_open -= 1;
                if lane.cooldown_open == 0 {
                    lane.close(marker.kind, t_ms)?;
                    if lane.unusable_open > 0 {
                        lane.open(CooldownKind::Unusable, t_ms);
                    }
                }
            }
        }
    }

    if let Some((_, t_ms)) = lane.current {
        return Err(SweepFault::Unclosed { t_ms });
    }
    Ok(lane.intervals)
}

/// Running state of one lane's sweep
struct Lane<'a> {
    key: &'a SkillKey,
    options: &'a BuildOptions,
    unusable_open: u32,
    cooldown_open: u32,
    /// Kind and start of the interval currently open
    current: Option<(CooldownKind, i64)>,
    intervals: Vec<CooldownInterval>,
}

impl<'a> Lane<'a> {
    fn new(key: &'a SkillKey, options: &'a BuildOptions) -> Self {
        Self {
            key,
            options,
            unusable_open: 0,
            cooldown_open: 0,
            current: None,
            intervals: Vec::new(),
        }
    }

    fn is_open(&self, kind: CooldownKind) -> bool {
        matches!(self.current, Some((open, _)) if open == kind)
    }

    fn open(&mut self, kind: CooldownKind, t_ms: i64) {
        self.current = Some((kind, t_ms));
    }

    fn close(&mut self, kind: BoundaryKind, t_end_ms: i64) -> Result<(), SweepFault> {
        let Some((open_kind, t_start_ms)) = self.current.take() else {
            return Err(SweepFault::Unopened { kind, t_ms: t_end_ms });
        };

        let t_start_ms = if self.options.clip_to_origin {
            t_start_ms.max(0)
        } else {
            t_start_ms
        };
        // Clipped away or instantly reopened
        if t_end_ms <= t_start_ms {
            return Ok(());
        }

        self.intervals.push(CooldownInterval::new(
            open_kind,
            self.key.skill_id.as_str(),
            self.key.owner,
            t_start_ms,
            t_end_ms,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::BoundaryKind::*;

    fn markers(list: &[(BoundaryKind, i64)]) -> Vec<Boundary> {
        list.iter().map(|&(kind, t_ms)| Boundary { kind, t_ms }).collect()
    }

    fn spans(intervals: &[CooldownInterval]) -> Vec<(CooldownKind, i64, i64)> {
        intervals
            .iter()
            .map(|i| (i.kind, i.t_start_ms, i.t_end_ms))
            .collect()
    }

    fn unclipped() -> BuildOptions {
        BuildOptions {
            clip_to_origin: false,
            ..BuildOptions::default()
        }
    }

    #[test]
    fn test_lead_in_then_cooldown() {
        let key = SkillKey::new("a", None);
        let list = markers(&[
            (UnusedStart, 10_000),
            (UnusedEnd, 40_000),
            (CooldownStart, 40_000),
            (CooldownEnd, 70_000),
        ]);
        let intervals = materialize_skill(&key, &list, &unclipped()).unwrap();
        assert_eq!(
            spans(&intervals),
            [
                (CooldownKind::Unusable, 10_000, 40_000),
                (CooldownKind::Cooldown, 40_000, 70_000),
            ]
        );
        assert_eq!(intervals[1].duration_ms, 30_000);
    }

    #[test]
    fn test_unusable_reopens_when_cooldown_ends_early() {
        // Second use's lead-in starts while the first cooldown is running
        let key = SkillKey::new("a", None);
        let list = markers(&[
            (UnusedStart, -30_000),
            (UnusedEnd, 0),
            (CooldownStart, 0),
            (UnusedStart, 10_000),
            (CooldownEnd, 30_000),
            (UnusedEnd, 40_000),
            (CooldownStart, 40_000),
            (CooldownEnd, 70_000),
        ]);
        let intervals = materialize_skill(&key, &list, &BuildOptions::default()).unwrap();
        assert_eq!(
            spans(&intervals),
            [
                (CooldownKind::Cooldown, 0, 30_000),
                (CooldownKind::Unusable, 30_000, 40_000),
                (CooldownKind::Cooldown, 40_000, 70_000),
            ]
        );
    }

    #[test]
    fn test_nested_cooldowns_merge() {
        // Skill and group both exhausted at 5s; group recharges last
        let key = SkillKey::new("g1", None);
        let list = markers(&[
            (CooldownStart, 5_000),
            (CooldownStart, 5_000),
            (CooldownEnd, 9_000),
            (CooldownEnd, 30_000),
        ]);
        let intervals = materialize_skill(&key, &list, &BuildOptions::default()).unwrap();
        assert_eq!(spans(&intervals), [(CooldownKind::Cooldown, 5_000, 30_000)]);
    }

    #[test]
    fn test_clipping_drops_pre_origin_lead_in() {
        let key = SkillKey::new("a", None);
        let list = markers(&[
            (UnusedStart, -30_000),
            (UnusedEnd, 0),
            (CooldownStart, 0),
            (CooldownEnd, 30_000),
        ]);
        let intervals = materialize_skill(&key, &list, &BuildOptions::default()).unwrap();
        assert_eq!(spans(&intervals), [(CooldownKind::Cooldown, 0, 30_000)]);

        let intervals = materialize_skill(&key, &list, &unclipped()).unwrap();
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].t_start_ms, -30_000);
    }

    #[test]
    fn test_unopened_end_is_a_fault() {
        let key = SkillKey::new("a", None);
        let list = markers(&[(CooldownEnd, 30_000)]);
        assert_eq!(
            materialize_skill(&key, &list, &BuildOptions::default()).unwrap_err(),
            SweepFault::Unopened {
                kind: CooldownEnd,
                t_ms: 30_000
            }
        );
    }

    #[test]
    fn test_unclosed_interval_is_a_fault() {
        let key = SkillKey::new("a", None);
        let list = markers(&[(CooldownStart, 0)]);
        assert!(matches!(
            materialize_skill(&key, &list, &BuildOptions::default()),
            Err(SweepFault::Unclosed { t_ms: 0 })
        ));
    }

    #[test]
    fn test_faulty_lane_is_dropped_others_kept() {
        let mut map = BoundaryMap::new();
        map.insert(SkillKey::new("bad", None), markers(&[(UnusedEnd, 5)]));
        map.insert(
            SkillKey::new("good", None),
            markers(&[(CooldownStart, 0), (CooldownEnd, 10)]),
        );

        let intervals = materialize_all(&map, &BuildOptions::default());
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].skill_id, "good");
    }
}
