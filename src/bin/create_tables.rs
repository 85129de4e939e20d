//! Load the reference CSV into the `reference` table and create an empty
//! `current` table with the same columns.
use clap::Parser;
use driftwatch::jobs::run_setup;
use driftwatch::store::{MemoryStore, PostgresStore};
use driftwatch::{DriftError, SetupConfig};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "create-tables", about = "Initialize the reference and current tables")]
struct Args {
    /// YAML configuration file.
    #[arg(long, default_value = "config/config.yaml")]
    config: PathBuf,

    /// Write to an in-memory store instead of the database.
    #[arg(long)]
    dry_run: bool,

    /// Configuration overrides such as `db.host=postgres`.
    overrides: Vec<String>,
}

fn run(args: &Args) -> Result<(), DriftError> {
    let config = SetupConfig::load(&args.config, &args.overrides)?;
    if args.dry_run {
        info!("Dry run, {} is left untouched.", config.db);
        let mut store = MemoryStore::new();
        return run_setup(&config, &mut store);
    }
    let mut store = PostgresStore::connect(&config.db)?;
    run_setup(&config, &mut store)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
