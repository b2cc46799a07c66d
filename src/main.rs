//! CLI tool to validate web server configuration files.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use clap::error::ErrorKind;
use serverconf_rs::{RealFs, check_str};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Check a server configuration file for syntax and semantic errors.
#[derive(Debug, Parser)]
#[command(name = "serverconf", version)]
struct Cli {
    /// Path to the configuration file.
    file: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if e.print().is_err() {
                return ExitCode::FAILURE;
            }
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Returns whether the file is valid. I/O problems are errors.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let path = cli.file.display().to_string();
    let source = fs::read_to_string(&cli.file).with_context(|| format!("cannot read {path}"))?;

    match check_str(&source, &RealFs) {
        Ok(config) => {
            println!(
                "{path}: configuration is valid ({} server(s), {} location(s))",
                config.servers.len(),
                config.location_count()
            );
            Ok(true)
        }
        Err(e) => {
            tracing::debug!(
                phase = e.phase(),
                count = e.diagnostics().len(),
                "configuration rejected"
            );
            e.diagnostics().emit(&path, &source);
            Ok(false)
        }
    }
}
