// src/main.rs
use cli::Cli;
use colored::*;
use cook_core::SubmitError;
use std::process;
use structopt::StructOpt;

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::from_args();
    if let Err(e) = cli.execute().await {
        if let Some(line) = error_line(&e) {
            eprintln!("{}", line);
        }
        process::exit(1);
    }
}

/// Ambiguous outcomes have already been shown as a warning.
fn error_line(e: &anyhow::Error) -> Option<String> {
    match e.downcast_ref::<SubmitError>() {
        Some(err) if err.is_ambiguous() => None,
        _ => Some(format!("{} {:#}", "[ERROR]".red(), e)),
    }
}
