// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `autorun docs <folder>` - list task documents

use std::path::PathBuf;

use anyhow::{Context, Result};
use autorun_adapters::{DocumentStore, FsDocumentStore, RUNS_DIR};
use clap::Args;

use crate::color;
use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct DocsArgs {
    /// Folder holding the task documents
    pub folder: PathBuf,
}

pub async fn handle(args: DocsArgs, format: OutputFormat) -> Result<()> {
    let names = FsDocumentStore::new()
        .list_docs(&args.folder)
        .await
        .with_context(|| format!("failed to list documents in {}", args.folder.display()))?;

    match format {
        OutputFormat::Json => print_json(&names),
        OutputFormat::Text => {
            for name in &names {
                println!("{}", name);
            }
            let runs = args.folder.join(RUNS_DIR);
            if runs.is_dir() {
                println!(
                    "{}",
                    color::muted(&format!("(working copies in {})", runs.display()))
                );
            }
            Ok(())
        }
    }
}
