mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mitplan_core::ImportTarget;
use mitplan_types::Job;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Mitigation timeline planner")]
struct Cli {
    /// Directory of custom catalog TOML files layered over the builtin one
    #[arg(long, global = true)]
    catalog_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog skills
    Catalog {
        #[arg(short, long)]
        job: Option<Job>,
    },
    /// Print the cooldown intervals of a saved plan
    Intervals {
        schedule: PathBuf,
        #[arg(long)]
        no_lead_in: bool,
        #[arg(long)]
        json: bool,
    },
    /// Check whether a skill can be placed in a saved plan
    CanUse {
        schedule: PathBuf,
        #[arg(short, long)]
        skill: String,
        /// Proposed start, milliseconds from the pull
        #[arg(long)]
        at: i64,
        #[arg(long)]
        owner_id: Option<i64>,
        #[arg(long)]
        owner_job: Option<Job>,
        /// Event ids to ignore (e.g. the events being dragged)
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Turn exported cast records into a plan
    Import {
        casts: PathBuf,
        /// Job to import (defaults to the saved default job)
        #[arg(short, long)]
        job: Option<Job>,
        #[arg(long)]
        owner_id: Option<i64>,
        /// Absolute log timestamp of the pull, in milliseconds
        #[arg(long, default_value_t = 0)]
        fight_start: i64,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show saved settings, or update them (with --catalog-dir to store it)
    Config {
        #[arg(long)]
        default_job: Option<Job>,
        #[arg(long)]
        show_lead_in: Option<bool>,
    },
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // If MITPLAN_LOG_PATH is set, append to that file
    if let Ok(path) = std::env::var("MITPLAN_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    // Fallback to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = commands::load_config();
    let catalog_dir = cli.catalog_dir.as_deref();
    let open_catalog = || commands::open_catalog(&config, catalog_dir);

    match cli.command {
        Commands::Catalog { job } => commands::list_catalog(&*open_catalog()?, job),
        Commands::Intervals {
            schedule,
            no_lead_in,
            json,
        } => {
            let options = config.build_options(no_lead_in);
            commands::show_intervals(&*open_catalog()?, &schedule, &options, json)
        }
        Commands::CanUse {
            schedule,
            skill,
            at,
            owner_id,
            owner_job,
            exclude,
        } => commands::can_use(
            open_catalog()?,
            &schedule,
            &skill,
            at,
            owner_id,
            config.owner_job(owner_job),
            &exclude,
        ),
        Commands::Import {
            casts,
            job,
            owner_id,
            fight_start,
            output,
        } => {
            let job = config
                .owner_job(job)
                .ok_or("no --job given and no default job saved")?;
            let target = ImportTarget {
                job,
                owner_id,
                fight_start_ms: fight_start,
            };
            let options = config.build_options(false);
            commands::import(open_catalog()?, &casts, target, options, &output)
        }
        Commands::Config {
            default_job,
            show_lead_in,
        } => commands::update_config(config.clone(), catalog_dir, default_job, show_lead_in),
    }
}
