//! Saved plan files
//!
//! A plan is stored as pretty JSON: a format version plus the event list in
//! the same camelCase shape the frontend uses. Intervals are never stored;
//! they are rebuilt on load.

use std::fs;
use std::path::Path;

use mitplan_types::ScheduledEvent;
use serde::{Deserialize, Serialize};

use super::ScheduleError;

/// Increment when the file layout changes
pub const SCHEDULE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleFile {
    pub version: u32,
    pub events: Vec<ScheduledEvent>,
}

impl ScheduleFile {
    pub fn new(events: Vec<ScheduledEvent>) -> Self {
        Self {
            version: SCHEDULE_FORMAT_VERSION,
            events,
        }
    }
}

/// Write events to `path`, creating parent directories as needed
pub fn save_events(path: &Path, events: &[ScheduledEvent]) -> Result<(), ScheduleError> {
    let io_err = |source| ScheduleError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let file = ScheduleFile::new(events.to_vec());
    let content = serde_json::to_string_pretty(&file).map_err(|source| ScheduleError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, content).map_err(io_err)
}

/// Read the event list from a plan file
pub fn load_events(path: &Path) -> Result<Vec<ScheduledEvent>, ScheduleError> {
    let content = fs::read_to_string(path).map_err(|source| ScheduleError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let file: ScheduleFile = serde_json::from_str(&content).map_err(|source| ScheduleError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if file.version != SCHEDULE_FORMAT_VERSION {
        return Err(ScheduleError::UnsupportedVersion {
            found: file.version,
            expected: SCHEDULE_FORMAT_VERSION,
        });
    }

    tracing::debug!(path = %path.display(), events = file.events.len(), "Loaded plan");
    Ok(file.events)
}
