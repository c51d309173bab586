// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

#[tokio::test]
async fn write_then_read() {
    let dir = TempDir::new().unwrap();
    let store = FsDocumentStore::new();
    store
        .write_doc(dir.path(), "Phase-1", "- [ ] one\n")
        .await
        .unwrap();
    assert_eq!(
        std::fs::read_to_string(dir.path().join("Phase-1.md")).unwrap(),
        "- [ ] one\n"
    );
    assert_eq!(
        store.read_doc(dir.path(), "Phase-1").await.unwrap(),
        "- [ ] one\n"
    );
}

#[tokio::test]
async fn read_missing_is_not_found() {
    let dir = TempDir::new().unwrap();
    let err = FsDocumentStore::new()
        .read_doc(dir.path(), "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn rejects_escaping_names() {
    let dir = TempDir::new().unwrap();
    let err = FsDocumentStore::new()
        .read_doc(dir.path(), "../outside")
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::InvalidName(_)));
}

#[tokio::test]
async fn working_copies_are_distinct_and_leave_original_alone() {
    let dir = TempDir::new().unwrap();
    let store = FsDocumentStore::new();
    store
        .write_doc(dir.path(), "Tasks", "- [x] done\n")
        .await
        .unwrap();

    let first = store.create_working_copy(dir.path(), "Tasks", 1).await.unwrap();
    let second = store.create_working_copy(dir.path(), "Tasks", 1).await.unwrap();

    assert_ne!(first, second);
    assert!(first.starts_with("Runs/Tasks-"), "{first}");
    assert!(first.contains("-loop-1"), "{first}");
    assert_eq!(
        store.read_doc(dir.path(), &first).await.unwrap(),
        "- [x] done\n"
    );

    store
        .write_doc(dir.path(), &second, "- [ ] done\n")
        .await
        .unwrap();
    assert_eq!(
        store.read_doc(dir.path(), "Tasks").await.unwrap(),
        "- [x] done\n"
    );
}

#[tokio::test]
async fn list_docs_sorted_and_skips_runs() {
    let dir = TempDir::new().unwrap();
    let store = FsDocumentStore::new();
    for name in ["b", "a", "nested/c"] {
        store.write_doc(dir.path(), name, "").await.unwrap();
    }
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    store.create_working_copy(dir.path(), "a", 1).await.unwrap();

    let docs = store.list_docs(dir.path()).await.unwrap();
    assert_eq!(docs, vec!["a", "b", "nested/c"]);
}

#[tokio::test]
async fn list_docs_missing_folder_errors() {
    let dir = TempDir::new().unwrap();
    let result = FsDocumentStore::new()
        .list_docs(&dir.path().join("nope"))
        .await;
    assert!(result.is_err());
}
