pub mod catalog;
pub mod config;
pub mod cooldown;
pub mod import;
pub mod resource;
pub mod schedule;

// Re-exports for convenience
pub use catalog::{CatalogError, ConfigError, SkillCatalog, load_catalog, normalize_skill_id};
pub use config::AppConfig;
pub use cooldown::{
    BuildError, BuildOptions, build_cooldown_intervals, build_with_options, can_shift_events,
    can_use_skill_at,
};
pub use import::{CastKind, CastRecord, ImportTarget, import_casts};
pub use resource::{ResourceKey, SkillKey};
pub use schedule::{Schedule, ScheduleError};
