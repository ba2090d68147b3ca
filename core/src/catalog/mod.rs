//! Skill catalog
//!
//! Immutable lookup tables for everything the cooldown engine needs to know
//! about a skill:
//! - **Definitions**: cooldown, effect duration, owning job, log ability id
//! - **Groups**: shared charge pools and which skills draw from them
//! - **Config loading**: builtin TOML catalog layered with user files
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                 CatalogConfig (TOML [[skill]] / [[group]])     │
//! └───────────────────────────────────────────────────────────────┘
//!                              │  CatalogSet::add_config (custom overrides builtin)
//!                              ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        SkillCatalog                            │
//! │  skill id ─► definition      group id ─► [member skill ids]    │
//! │  skill id ─► group           action id ─► skill                │
//! └───────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                Stack-event builder / sweep / validator
//! ```
//!
//! The catalog is validated once when built and never mutated afterwards.

mod config;
mod definitions;

use std::collections::HashMap;

use mitplan_types::{Job, OwnerScope};
use thiserror::Error;

pub use config::{
    CatalogSet, ConfigError, builtin_config, default_custom_dir, load_catalog, load_file,
    save_file,
};
pub use definitions::{CatalogConfig, CooldownGroup, SkillDefinition};

/// Separates a base skill id from its owner-job suffix (`role-rampart@WAR`)
pub const SKILL_OWNER_SEPARATOR: char = '@';

/// Strip any owner suffix from a skill id.
pub fn normalize_skill_id(skill_id: &str) -> &str {
    skill_id
        .split_once(SKILL_OWNER_SEPARATOR)
        .map_or(skill_id, |(base, _)| base)
}

/// Errors found while assembling a catalog
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate skill id {0:?}")]
    DuplicateSkill(String),

    #[error("duplicate cooldown group id {0:?}")]
    DuplicateGroup(String),

    #[error("skill id {0:?} must not contain '@'")]
    InvalidSkillId(String),

    #[error("skill {skill:?} references unknown cooldown group {group:?}")]
    UnknownGroup { skill: String, group: String },

    #[error("cooldown group {0:?} must hold at least one charge")]
    EmptyGroup(String),

    #[error("{id:?} has an invalid {field} (must be a finite, non-negative number of seconds)")]
    InvalidTiming { id: String, field: &'static str },
}

/// Validated, indexed skill and cooldown group definitions
#[derive(Debug, Clone, Default)]
pub struct SkillCatalog {
    /// Definitions in catalog order
    skills: Vec<SkillDefinition>,

    // ─── Indexes ─────────────────────────────────────────────────────────────
    /// Skill id -> position in `skills`
    skill_index: HashMap<String, usize>,
    /// Log ability id -> position in `skills`
    action_index: HashMap<u64, usize>,
    /// Group id -> definition
    groups: HashMap<String, CooldownGroup>,
    /// Group id -> member skill ids, in catalog order
    group_members: HashMap<String, Vec<String>>,
}

impl SkillCatalog {
    /// Validate a config and build the lookup tables.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let mut groups = HashMap::new();
        for group in config.groups {
            check_timing(&group.id, "cooldown", group.cooldown_secs)?;
            if group.stack == 0 {
                return Err(CatalogError::EmptyGroup(group.id));
            }
            if groups.contains_key(&group.id) {
                return Err(CatalogError::DuplicateGroup(group.id));
            }
            groups.insert(group.id.clone(), group);
        }

        let mut skill_index = HashMap::new();
        let mut action_index = HashMap::new();
        let mut group_members: HashMap<String, Vec<String>> = HashMap::new();

        for (idx, skill) in config.skills.iter().enumerate() {
            if skill.id.contains(SKILL_OWNER_SEPARATOR) {
                return Err(CatalogError::InvalidSkillId(skill.id.clone()));
            }
            check_timing(&skill.id, "cooldown", skill.cooldown_secs)?;
            check_timing(&skill.id, "duration", skill.duration_secs)?;

            if skill_index.insert(skill.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateSkill(skill.id.clone()));
            }
            if let Some(action_id) = skill.action_id {
                action_index.entry(action_id).or_insert(idx);
            }
            if let Some(group) = &skill.cooldown_group {
                if !groups.contains_key(group) {
                    return Err(CatalogError::UnknownGroup {
                        skill: skill.id.clone(),
                        group: group.clone(),
                    });
                }
                group_members
                    .entry(group.clone())
                    .or_default()
                    .push(skill.id.clone());
            }
        }

        Ok(Self {
            skills: config.skills,
            skill_index,
            action_index,
            groups,
            group_members,
        })
    }

    /// The catalog shipped with the application
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(Self::new(builtin_config()?)?)
    }

    /// Look up a skill; owner suffixes are ignored.
    pub fn skill(&self, skill_id: &str) -> Option<&SkillDefinition> {
        self.skill_index
            .get(normalize_skill_id(skill_id))
            .map(|&idx| &self.skills[idx])
    }

    /// Look up a skill by the ability id combat logs report.
    pub fn skill_by_action(&self, action_id: u64) -> Option<&SkillDefinition> {
        self.action_index.get(&action_id).map(|&idx| &self.skills[idx])
    }

    pub fn group(&self, group_id: &str) -> Option<&CooldownGroup> {
        self.groups.get(group_id)
    }

    /// Group a skill draws charges from, if any
    pub fn group_of(&self, skill: &SkillDefinition) -> Option<&CooldownGroup> {
        skill.cooldown_group.as_deref().and_then(|id| self.group(id))
    }

    /// Every skill sharing the given group's charges
    pub fn group_members(&self, group_id: &str) -> &[String] {
        self.group_members
            .get(group_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.iter()
    }

    /// Skills a job can slot: its own plus its role actions
    pub fn skills_for_job(&self, job: Job) -> impl Iterator<Item = &SkillDefinition> {
        self.skills.iter().filter(move |skill| skill.available_to(job))
    }

    pub fn groups(&self) -> impl Iterator<Item = &CooldownGroup> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Skill id to store on an event owned by `owner_job`.
    ///
    /// Role-shared skills get a `@JOB` suffix so two jobs slotting the same
    /// role action stay distinguishable; everything else keeps its base id.
    pub fn owner_skill_id(&self, skill_id: &str, owner_job: Option<Job>) -> String {
        let base = normalize_skill_id(skill_id);
        match (self.skill(base), owner_job) {
            (Some(skill), Some(job)) if skill.role_shared => {
                format!("{base}{SKILL_OWNER_SEPARATOR}{job}")
            }
            _ => base.to_string(),
        }
    }

    /// Owner scope a skill's cooldown resources are keyed by. Global skills
    /// are never partitioned.
    pub fn scope_for(&self, skill: &SkillDefinition, owner: Option<OwnerScope>) -> Option<OwnerScope> {
        if skill.global { None } else { owner }
    }
}

fn check_timing(id: &str, field: &'static str, secs: f64) -> Result<(), CatalogError> {
    if secs.is_finite() && secs >= 0.0 {
        Ok(())
    } else {
        Err(CatalogError::InvalidTiming {
            id: id.to_string(),
            field,
        })
    }
}
