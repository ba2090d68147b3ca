//! Skill and cooldown group definition types
//!
//! Definitions are loaded from TOML catalog files and describe every skill
//! that can be placed on the timeline, plus the shared charge pools some of
//! them draw from.

use mitplan_types::formatting::secs_to_ms;
use mitplan_types::{Job, Role};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// Skill Definitions
// ═══════════════════════════════════════════════════════════════════════════

/// Definition of a placeable skill (loaded from config)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    /// Unique identifier (e.g., "war-thrill"). Must not contain `@`.
    pub id: String,

    /// Display name
    pub name: String,

    // ─── Timing ─────────────────────────────────────────────────────────────
    /// Recast time in seconds
    pub cooldown_secs: f64,

    /// Effect duration in seconds (may exceed the cooldown)
    pub duration_secs: f64,

    /// Shared charge pool this skill draws from
    pub cooldown_group: Option<String>,

    // ─── Ownership ──────────────────────────────────────────────────────────
    /// Job that owns this skill (None = role action)
    pub job: Option<Job>,

    /// Role a role action belongs to (None with no job = every job)
    pub role: Option<Role>,

    /// Role action slotted by several jobs; ids get a `@JOB` suffix so each
    /// job's copy is tracked separately
    #[serde(default)]
    pub role_shared: bool,

    /// Ignore owner scoping: every use, whoever owns it, shares one cooldown
    #[serde(default)]
    pub global: bool,

    // ─── Log matching / display ─────────────────────────────────────────────
    /// Ability id as it appears in combat logs
    pub action_id: Option<u64>,

    /// Display color hint for frontends
    pub color: Option<String>,
}

impl SkillDefinition {
    pub fn cooldown_ms(&self) -> i64 {
        secs_to_ms(self.cooldown_secs)
    }

    pub fn duration_ms(&self) -> i64 {
        secs_to_ms(self.duration_secs)
    }

    /// Check whether a job can slot this skill
    pub fn available_to(&self, job: Job) -> bool {
        match (self.job, self.role) {
            (Some(owner), _) => owner == job,
            (None, Some(role)) => role == job.role(),
            (None, None) => true,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Cooldown Groups
// ═══════════════════════════════════════════════════════════════════════════

/// Shared charge pool (e.g. Holy Sheltron and Intervention)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooldownGroup {
    /// Unique identifier referenced by `SkillDefinition::cooldown_group`
    pub id: String,

    /// Recharge time per charge, in seconds
    pub cooldown_secs: f64,

    /// Maximum charges held at once
    #[serde(default = "default_stack")]
    pub stack: u32,
}

impl CooldownGroup {
    pub fn cooldown_ms(&self) -> i64 {
        secs_to_ms(self.cooldown_secs)
    }
}

fn default_stack() -> u32 {
    1
}

// ═══════════════════════════════════════════════════════════════════════════
// Config File Structure
// ═══════════════════════════════════════════════════════════════════════════

/// Root structure for catalog files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Skill definitions in this file
    #[serde(default, rename = "skill")]
    pub skills: Vec<SkillDefinition>,

    /// Cooldown groups in this file
    #[serde(default, rename = "group")]
    pub groups: Vec<CooldownGroup>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(job: Option<Job>, role: Option<Role>) -> SkillDefinition {
        SkillDefinition {
            id: "s".to_string(),
            name: "S".to_string(),
            cooldown_secs: 0.5,
            duration_secs: 18.0,
            cooldown_group: None,
            job,
            role,
            role_shared: false,
            global: false,
            action_id: None,
            color: None,
        }
    }

    #[test]
    fn test_fractional_seconds_convert_to_ms() {
        let def = skill(None, None);
        assert_eq!(def.cooldown_ms(), 500);
        assert_eq!(def.duration_ms(), 18_000);
    }

    #[test]
    fn test_available_to() {
        assert!(skill(Some(Job::Gnb), None).available_to(Job::Gnb));
        assert!(!skill(Some(Job::Gnb), None).available_to(Job::War));

        let rampart = skill(None, Some(Role::Tank));
        assert!(rampart.available_to(Job::Pld));
        assert!(!rampart.available_to(Job::Whm));

        assert!(skill(None, None).available_to(Job::Pct));
    }

    #[test]
    fn test_group_stack_defaults_to_one() {
        let toml = r#"
[[group]]
id = "grp"
cooldown_secs = 25.0
"#;
        let config: CatalogConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.groups[0].stack, 1);
        assert_eq!(config.groups[0].cooldown_ms(), 25_000);
    }
}
