mod app;
mod config;
mod effects;
mod ui;

use std::process::ExitCode;

use clap::Parser;
use studio_logging::studio_info;

use config::{AppConfig, Cli};

fn main() -> anyhow::Result<ExitCode> {
    let config = AppConfig::from_cli(Cli::parse())?;
    studio_logging::initialize(config.log_destination.clone(), config.log_level);
    studio_info!(
        "plan2scene {} starting; api={} poll_ms={}",
        env!("CARGO_PKG_VERSION"),
        config.api.base_url,
        config.poll_interval.as_millis()
    );
    let outcome = app::run(config)?;
    Ok(match outcome {
        app::RunOutcome::Success => ExitCode::SUCCESS,
        app::RunOutcome::Failure => ExitCode::FAILURE,
    })
}
