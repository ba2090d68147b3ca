//! Composite identities for cooldown resources.
//!
//! Every counter the sweep maintains and every interval it produces is keyed
//! by a base id plus an optional owner scope. Keeping the two apart (instead
//! of string concatenation) means a skill id can never collide with a group
//! id, and unscoped resources are never silently partitioned by owner.

use std::fmt;

use mitplan_types::OwnerScope;

/// What a resource counter tracks
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceBase {
    /// A single skill's own recast (one charge)
    Skill(String),
    /// A shared charge pool
    Group(String),
}

/// A resource counter, scoped to an owner unless shared by everyone
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub base: ResourceBase,
    pub owner: Option<OwnerScope>,
}

impl ResourceKey {
    pub fn skill(skill_id: impl Into<String>, owner: Option<OwnerScope>) -> Self {
        Self {
            base: ResourceBase::Skill(skill_id.into()),
            owner,
        }
    }

    pub fn group(group_id: impl Into<String>, owner: Option<OwnerScope>) -> Self {
        Self {
            base: ResourceBase::Group(group_id.into()),
            owner,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.base, ResourceBase::Group(_))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            ResourceBase::Skill(id) => write!(f, "{id}")?,
            ResourceBase::Group(id) => write!(f, "grp:{id}")?,
        }
        match &self.owner {
            Some(owner) => write!(f, ":{owner}"),
            None => Ok(()),
        }
    }
}

/// Which skill lane an interval belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkillKey {
    pub skill_id: String,
    pub owner: Option<OwnerScope>,
}

impl SkillKey {
    pub fn new(skill_id: impl Into<String>, owner: Option<OwnerScope>) -> Self {
        Self {
            skill_id: skill_id.into(),
            owner,
        }
    }
}

impl fmt::Display for SkillKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{}:{}", self.skill_id, owner),
            None => write!(f, "{}", self.skill_id),
        }
    }
}
