// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use anyhow::Context;
use clap::error::ErrorKind;

#[test]
fn run_requires_a_file() {
    let err = Cli::try_parse_from(["autorun", "run"]).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "autorun",
        "count",
        "docs/",
        "-o",
        "json",
        "--log-file",
        "/tmp/autorun.log",
    ])
    .unwrap();
    assert_eq!(cli.output, OutputFormat::Json);
    assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/autorun.log")));
    assert!(matches!(cli.command, Some(Commands::Count(_))));
}

#[test]
fn run_options_parse() {
    let cli = Cli::try_parse_from([
        "autorun",
        "run",
        "autorun.toml",
        "--session",
        "abc",
        "--max-loops",
        "3",
        "--on-error",
        "skip",
    ])
    .unwrap();
    let Some(Commands::Run(args)) = cli.command else {
        panic!("expected run");
    };
    assert_eq!(args.session.as_deref(), Some("abc"));
    assert_eq!(args.max_loops, Some(3));
    assert_eq!(args.on_error, run::OnError::Skip);
    assert!(!args.loop_mode);
}

#[test]
fn redundant_chain_is_collapsed() {
    let inner = std::io::Error::other("disk full");
    let err = anyhow::Error::new(inner).context("write failed: disk full");
    assert_eq!(format_error(&err), "write failed: disk full");
}

#[test]
fn distinct_causes_are_listed() {
    let err: anyhow::Error = Err::<(), _>(std::io::Error::other("disk full"))
        .context("write failed")
        .unwrap_err();
    assert_eq!(
        format_error(&err),
        "write failed\n\nCaused by:\n    0: disk full"
    );
}
