use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use common::log_setup::setup_logging;
use merge::cli::{Args, Job};
use merge::{merge, merge_verbatim, FileStore};

fn main() -> ExitCode {
    let args = Args::parse();
    let _logger = match setup_logging(&args.log_config()) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("Failed to set up logging: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let job = args.into_job().context("Invalid arguments")?;

    match job {
        Job::Groups(config) => {
            let report = merge(&config, &mut FileStore)?;
            let written = report.outputs().count();
            info!(
                "Merged {} group(s), wrote {} file(s)",
                report.groups.len(),
                written
            );
        }
        Job::Verbatim(config) => {
            let report = merge_verbatim(&config, &mut FileStore)?;
            info!(
                "Merged {} of {} file(s)",
                report.count,
                config.files.len()
            );
        }
    }

    Ok(())
}
