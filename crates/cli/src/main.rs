// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! autorun - drive an agent through markdown task documents

mod color;
mod commands;
mod env;
mod exit_error;
mod logging;
mod output;
mod table;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{count, docs, run};
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "autorun",
    version,
    about = "Auto Run - work through markdown task documents with an agent"
)]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    /// Also write logs to this file
    #[arg(long = "log-file", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every document in a run file until done, stopped or stalled
    Run(run::RunArgs),
    /// Count open and done tasks per document
    Count(count::CountArgs),
    /// List the task documents in a folder
    Docs(docs::DocsArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Render an error chain, skipping causes the top-level message already repeats
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let _guard = logging::setup_logging(cli.log_file.as_deref())?;

    match command {
        Commands::Run(args) => run::handle(args, format).await,
        Commands::Count(args) => count::handle(args, format).await,
        Commands::Docs(args) => docs::handle(args, format).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
