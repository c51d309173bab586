// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use autorun_core::RunSummary;
use clap::ValueEnum;
use serde::Serialize;

use crate::color;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Pretty JSON to stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Headline plus the markdown details body
pub fn format_summary(summary: &RunSummary) -> String {
    let headline = summary.headline();
    let status = summary.status.to_string();
    let headline = match headline.find(&status) {
        Some(at) => format!(
            "{}{}{}",
            &headline[..at],
            color::status(&status),
            &headline[at + status.len()..]
        ),
        None => headline,
    };
    format!("{}\n\n{}", headline, summary.details())
}

pub fn print_summary(summary: &RunSummary, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", format_summary(summary));
            Ok(())
        }
        OutputFormat::Json => print_json(summary),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
