mod commands;
mod logging;
mod progress;
mod prompt;

use std::process;

use anyhow::Context;
use clap::Parser;
use colored::*;
use commands::Cli;
use dotenv::dotenv;
use progress::{rule, CliReporter};
use prompt::StdinConfirmation;
use safe_delete_core::{Error, Outcome, TrashSession};
use tracing::{debug, error};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let code = match run(args) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(err) => {
            error!("Error: {:#}", err);
            1
        }
    };

    // flush the non-blocking file writer before exiting
    drop(_guard);
    process::exit(code);
}

/// `Ok(false)` is a failed run that has already been reported to the user;
/// `Err` is reserved for failures before the session starts.
fn run(args: Cli) -> anyhow::Result<bool> {
    let config = safe_delete_core::config::load_configuration()
        .context("Error loading configuration")?;
    let mut session = TrashSession::new(config).context("Error resolving configured paths")?;

    println!("{}", rule('═', 70));
    println!("   {}", "SAFE FILE DELETION UTILITY".bold());
    println!(
        "   Files are moved to {} and never permanently deleted",
        session.trash_dir().display()
    );
    println!("{}", rule('═', 70));

    let raw_path = match args.path {
        Some(path) => path,
        None => prompt::prompt_line("\nEnter the full path to the file: ")
            .context("Could not read file path")?,
    };

    let reporter = CliReporter::new();
    match session.run(&raw_path, &mut StdinConfirmation, &reporter) {
        Ok(Outcome::Trashed(_)) => {
            println!("\n{} File has been safely moved to trash.", "[Success]".green());
            Ok(true)
        }
        Ok(Outcome::Cancelled(_)) => Ok(true),
        Err(err) => {
            debug!("Session error: {:?}", err);
            eprintln!("\n{} {}", "[Failure]".red(), failure_headline(&err));
            Ok(false)
        }
    }
}

fn failure_headline(err: &Error) -> String {
    match err {
        Error::Move { path, .. } => format!(
            "File backed up but not moved; the original is still at {}",
            path.display()
        ),
        Error::Backup { .. } => "Backup failed; the file was left untouched".to_string(),
        other => other.to_string(),
    }
}
