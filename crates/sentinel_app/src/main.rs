mod app;
mod cli;
mod config;
mod effects;
mod logging;
mod status;

use anyhow::{Context, Result};
use clap::Parser;
use sentinel_engine::ensure_state_dir;
use sentinel_logging::sentinel_info;

use crate::cli::{Cli, Command};
use crate::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(minutes) = cli.interval_minutes {
        config.interval_minutes = minutes;
    }
    config.validate()?;

    ensure_state_dir(&config.state_dir).with_context(|| {
        format!(
            "cannot use state directory {}",
            config.state_dir.display()
        )
    })?;
    logging::initialize(config.log_destination, &config.log_path(), cli.verbose);
    sentinel_info!(
        "sentinel {} starting, key {}, state dir {}",
        env!("CARGO_PKG_VERSION"),
        config.monitor_key(),
        config.state_dir.display()
    );

    match cli.command() {
        Command::Run { once } => app::run(&config, once),
        Command::Baseline => app::print_baseline(&config),
    }
}
