// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `autorun count <folder>` - open and done tasks per document

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use autorun_adapters::{DocumentStore, FsDocumentStore};
use autorun_core::count_tasks;
use clap::Args;
use serde::Serialize;

use crate::output::{print_json, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct CountArgs {
    /// Folder holding the task documents
    pub folder: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocCount {
    pub document: String,
    pub unchecked: u32,
    pub checked: u32,
}

impl DocCount {
    fn status(&self) -> &'static str {
        match (self.unchecked, self.checked) {
            (0, 0) => "empty",
            (0, _) => "done",
            _ => "pending",
        }
    }
}

/// Count every document in `folder`, sorted by name
pub async fn collect<D: DocumentStore>(store: &D, folder: &Path) -> Result<Vec<DocCount>> {
    let names = store
        .list_docs(folder)
        .await
        .with_context(|| format!("failed to list documents in {}", folder.display()))?;
    let mut counts = Vec::with_capacity(names.len());
    for name in names {
        let content = store.read_doc(folder, &name).await?;
        let tasks = count_tasks(&content);
        counts.push(DocCount {
            document: name,
            unchecked: tasks.unchecked,
            checked: tasks.checked,
        });
    }
    Ok(counts)
}

pub async fn handle(args: CountArgs, format: OutputFormat) -> Result<()> {
    let counts = collect(&FsDocumentStore::new(), &args.folder).await?;
    if format == OutputFormat::Json {
        return print_json(&counts);
    }
    if counts.is_empty() {
        println!("No documents in {}", args.folder.display());
        return Ok(());
    }

    let mut table = Table::new(vec![
        Column::left("DOCUMENT"),
        Column::right("OPEN"),
        Column::right("DONE"),
        Column::status("STATUS"),
    ]);
    for count in &counts {
        table.row(vec![
            count.document.clone(),
            count.unchecked.to_string(),
            count.checked.to_string(),
            count.status().to_string(),
        ]);
    }
    table.render(&mut std::io::stdout());

    let open: u32 = counts.iter().map(|c| c.unchecked).sum();
    let done: u32 = counts.iter().map(|c| c.checked).sum();
    println!("\n{} open, {} done across {} documents", open, done, counts.len());
    Ok(())
}

#[cfg(test)]
#[path = "count_tests.rs"]
mod tests;
