//! Compare the current dataset against the reference dataset and publish
//! `drift_detected` and `p_value` for the calling workflow.
use clap::Parser;
use driftwatch::jobs::run_detect;
use driftwatch::outputs::KestraOutputs;
use driftwatch::{DetectConfig, StatTestDetector};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "detect-drift", about = "Detect dataset drift between reference and current data")]
struct Args {
    /// YAML configuration file.
    #[arg(long, default_value = "config/detect.yaml")]
    config: PathBuf,

    /// Configuration overrides such as `dates.start=2011-03-01`.
    overrides: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let result = DetectConfig::load(&args.config, &args.overrides).and_then(|config| {
        let detector = StatTestDetector::new(config.drift.clone());
        run_detect(&config, &detector, &mut KestraOutputs::stdout())
    });
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
