//! Jobs and combat roles

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Combat role, used to decide which role actions a job can slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Tank,
    Healer,
    Melee,
    PhysicalRanged,
    MagicalRanged,
}

/// Player job, serialized with the three-letter in-game abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Job {
    // Tanks
    Pld,
    War,
    Drk,
    Gnb,
    // Healers
    Whm,
    Sch,
    Ast,
    Sge,
    // Melee
    Mnk,
    Drg,
    Nin,
    Sam,
    Rpr,
    Vpr,
    // Physical ranged
    Brd,
    Mch,
    Dnc,
    // Magical ranged
    Blm,
    Smn,
    Rdm,
    Pct,
}

impl Job {
    pub const ALL: [Job; 21] = [
        Job::Pld,
        Job::War,
        Job::Drk,
        Job::Gnb,
        Job::Whm,
        Job::Sch,
        Job::Ast,
        Job::Sge,
        Job::Mnk,
        Job::Drg,
        Job::Nin,
        Job::Sam,
        Job::Rpr,
        Job::Vpr,
        Job::Brd,
        Job::Mch,
        Job::Dnc,
        Job::Blm,
        Job::Smn,
        Job::Rdm,
        Job::Pct,
    ];

    pub fn role(self) -> Role {
        match self {
            Job::Pld | Job::War | Job::Drk | Job::Gnb => Role::Tank,
            Job::Whm | Job::Sch | Job::Ast | Job::Sge => Role::Healer,
            Job::Mnk | Job::Drg | Job::Nin | Job::Sam | Job::Rpr | Job::Vpr => Role::Melee,
            Job::Brd | Job::Mch | Job::Dnc => Role::PhysicalRanged,
            Job::Blm | Job::Smn | Job::Rdm | Job::Pct => Role::MagicalRanged,
        }
    }

    /// Three-letter abbreviation ("PLD", "WAR", ...)
    pub fn as_str(self) -> &'static str {
        match self {
            Job::Pld => "PLD",
            Job::War => "WAR",
            Job::Drk => "DRK",
            Job::Gnb => "GNB",
            Job::Whm => "WHM",
            Job::Sch => "SCH",
            Job::Ast => "AST",
            Job::Sge => "SGE",
            Job::Mnk => "MNK",
            Job::Drg => "DRG",
            Job::Nin => "NIN",
            Job::Sam => "SAM",
            Job::Rpr => "RPR",
            Job::Vpr => "VPR",
            Job::Brd => "BRD",
            Job::Mch => "MCH",
            Job::Dnc => "DNC",
            Job::Blm => "BLM",
            Job::Smn => "SMN",
            Job::Rdm => "RDM",
            Job::Pct => "PCT",
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Job {
    type Err = ParseJobError;

    /// Case-insensitive parse of the three-letter abbreviation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Job::ALL
            .into_iter()
            .find(|job| job.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseJobError(s.to_string()))
    }
}

/// Returned when a string is not a known job abbreviation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseJobError(pub String);

impl fmt::Display for ParseJobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown job {:?}", self.0)
    }
}

impl std::error::Error for ParseJobError {}
