use std::fs;
use std::path::Path;
use std::sync::Arc;

use mitplan_core::catalog::load_catalog;
use mitplan_core::{
    AppConfig, BuildOptions, CastRecord, ImportTarget, Schedule, SkillCatalog, build_with_options,
    import_casts,
};
use mitplan_core::schedule::{load_events, save_events};
use mitplan_types::formatting::{format_duration, format_timeline_ms};
use mitplan_types::{CooldownKind, Job};

/// Load saved settings, falling back to defaults on a broken settings file
pub fn load_config() -> AppConfig {
    AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load settings, using defaults");
        AppConfig::default()
    })
}

/// Print the settings, or update and save them when any value is given
pub fn update_config(
    mut config: AppConfig,
    catalog_dir: Option<&Path>,
    default_job: Option<Job>,
    show_lead_in: Option<bool>,
) -> Result<(), String> {
    let changed = catalog_dir.is_some() || default_job.is_some() || show_lead_in.is_some();

    if let Some(dir) = catalog_dir {
        config.catalog_dir = Some(dir.to_path_buf());
    }
    if let Some(job) = default_job {
        config.default_job = Some(job);
    }
    if let Some(show) = show_lead_in {
        config.show_unusable_lead_in = show;
    }

    if changed {
        config.save().map_err(|e| e.to_string())?;
        tracing::info!("Saved settings");
    }

    let dir = config
        .catalog_dir()
        .map_or_else(|| "none".to_string(), |d| d.display().to_string());
    let job = config.default_job.map_or_else(|| "none".to_string(), |j| j.to_string());
    println!("catalog_dir           {dir}");
    println!("default_job           {job}");
    println!("show_unusable_lead_in {}", config.show_unusable_lead_in);
    Ok(())
}

/// Load the builtin catalog layered with the custom directory in effect
pub fn open_catalog(
    config: &AppConfig,
    catalog_dir: Option<&Path>,
) -> Result<Arc<SkillCatalog>, String> {
    let configured = match catalog_dir {
        Some(dir) => Some(dir.to_path_buf()),
        None => config.catalog_dir(),
    };

    let catalog = load_catalog(configured.as_deref()).map_err(|e| e.to_string())?;
    Ok(Arc::new(catalog))
}

pub fn list_catalog(catalog: &SkillCatalog, job: Option<Job>) -> Result<(), String> {
    let skills: Vec<_> = match job {
        Some(job) => catalog.skills_for_job(job).collect(),
        None => catalog.skills().collect(),
    };

    for skill in skills {
        let owner = match (skill.job, skill.role) {
            (Some(job), _) => job.to_string(),
            (None, Some(role)) => format!("{role:?}").to_lowercase(),
            (None, None) => "all".to_string(),
        };
        let group = catalog
            .group_of(skill)
            .map(|g| format!("  [{} x{}, {}]", g.id, g.stack, format_duration(g.cooldown_ms() / 1_000)))
            .unwrap_or_default();

        println!(
            "{:<24} {:<22} {:<6} cd {:>5}  dur {:>5}{}",
            skill.id,
            skill.name,
            owner,
            format_duration(skill.cooldown_ms() / 1_000),
            format_duration(skill.duration_ms() / 1_000),
            group
        );
    }
    Ok(())
}

pub fn show_intervals(
    catalog: &SkillCatalog,
    path: &Path,
    options: &BuildOptions,
    json: bool,
) -> Result<(), String> {
    let events = load_events(path).map_err(|e| e.to_string())?;

    let intervals = build_with_options(catalog, &events, options)
        .map_err(|e| format!("Schedule is invalid: {e}"))?;

    if json {
        let out = serde_json::to_string_pretty(&intervals).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    for interval in &intervals {
        let kind = match interval.kind {
            CooldownKind::Cooldown => "cooldown",
            CooldownKind::Unusable => "unusable",
        };
        let owner = interval.owner.map(|o| format!(" ({o})")).unwrap_or_default();
        println!(
            "{:>9} - {:>9}  {:<8}  {}{}",
            format_timeline_ms(interval.t_start_ms),
            format_timeline_ms(interval.t_end_ms),
            kind,
            interval.skill_id,
            owner
        );
    }
    Ok(())
}

pub fn can_use(
    catalog: Arc<SkillCatalog>,
    path: &Path,
    skill_id: &str,
    at_ms: i64,
    owner_id: Option<i64>,
    owner_job: Option<Job>,
    exclude: &[String],
) -> Result<(), String> {
    let schedule = Schedule::load_json(catalog, path).map_err(|e| e.to_string())?;
    let allowed = schedule.can_use_skill_at(skill_id, at_ms, exclude, owner_id, owner_job);

    println!(
        "{} at {}: {}",
        skill_id,
        format_timeline_ms(at_ms),
        if allowed { "ok" } else { "blocked" }
    );
    Ok(())
}

pub fn import(
    catalog: Arc<SkillCatalog>,
    casts: &Path,
    target: ImportTarget,
    options: BuildOptions,
    output: &Path,
) -> Result<(), String> {
    let content = fs::read_to_string(casts).map_err(|e| format!("{}: {e}", casts.display()))?;
    let records: Vec<CastRecord> =
        serde_json::from_str(&content).map_err(|e| format!("{}: {e}", casts.display()))?;

    let events = import_casts(&catalog, &records, &target);

    let mut schedule = Schedule::with_options(catalog, options);
    schedule.replace_all(events);
    if let Some(e) = schedule.last_error() {
        tracing::warn!(error = %e, "Imported plan has conflicts");
    }

    save_events(output, schedule.events()).map_err(|e| e.to_string())?;
    println!("Wrote {} events to {}", schedule.events().len(), output.display());
    Ok(())
}
