mod check;
mod cli;
mod digest;
mod digest_db;
mod reconcile;
mod replicate;
mod report;
mod scan;

use check::{CheckOutcome, check_directory};
use cli::{Cli, Command};
use replicate::{ReplicateError, replicate_directory};
use report::{ConsoleConfirm, print_changes};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::prelude::*;

struct ReplisumExitCode;

impl ReplisumExitCode {
    /// Exit code used when replication aborts because the source does not
    /// match its own digest database. Distinct so scripts can react to drift
    /// specifically.
    fn source_drift() -> ExitCode {
        ExitCode::from(2)
    }

    /// Exit code used for other errors (I/O errors, parse errors, invalid
    /// arguments, etc.).
    fn any_error() -> ExitCode {
        ExitCode::from(255)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let result: anyhow::Result<ExitCode> = match cli.command {
        Command::Check { directory } => handle_check(&directory),
        Command::Replicate {
            source,
            destination,
        } => handle_replicate(&source, &destination),
    };

    match result {
        Ok(exit_code) => exit_code,
        Err(err) => {
            error!("{err}");
            ReplisumExitCode::any_error()
        }
    }
}

fn handle_check(directory: &Path) -> anyhow::Result<ExitCode> {
    let outcome = check_directory(directory, &mut ConsoleConfirm)?;

    match outcome {
        CheckOutcome::Created { files } => {
            info!("Created digest database covering {} file(s)", files);
        }
        CheckOutcome::Unchanged => {
            info!("No changes detected");
        }
        CheckOutcome::Updated(changes) => {
            info!("Committed {} change(s)", changes.len());
        }
        CheckOutcome::Declined(_) => {
            println!("Canceled, database left unchanged.");
        }
    }

    // Declined confirmation is a normal completion, not an error.
    Ok(ExitCode::SUCCESS)
}

fn handle_replicate(source: &Path, destination: &Path) -> anyhow::Result<ExitCode> {
    match replicate_directory(source, destination) {
        Ok(result) => {
            info!(
                "Replication complete: {} file(s) copied, {} orphan(s)",
                result.copied.len(),
                result.orphans.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(ReplicateError::SourceDrift(changes)) => {
            println!("Source drift detected:");
            print_changes(&changes);
            error!("Source does not match its digest database; review with 'replisum check' before replicating");
            Ok(ReplisumExitCode::source_drift())
        }
        Err(e) => Err(e.into()),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
