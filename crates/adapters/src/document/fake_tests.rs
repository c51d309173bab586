// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn scripted_read_failures_then_recover() {
    let store = FakeDocumentStore::new();
    let folder = Path::new("/docs");
    store.set_doc(folder, "a", "- [ ] x\n");
    store.fail_reads("a", 1);

    assert!(store.read_doc(folder, "a").await.is_err());
    assert_eq!(store.read_doc(folder, "a").await.unwrap(), "- [ ] x\n");
}

#[tokio::test]
async fn working_copies_are_listed_separately() {
    let store = FakeDocumentStore::new();
    let folder = Path::new("/docs");
    store.set_doc(folder, "a", "text");

    let c1 = store.create_working_copy(folder, "a", 1).await.unwrap();
    let c2 = store.create_working_copy(folder, "a", 2).await.unwrap();
    assert_ne!(c1, c2);
    assert_eq!(store.working_copies(folder).len(), 2);
    assert_eq!(store.list_docs(folder).await.unwrap(), vec!["a"]);
    assert_eq!(store.doc(folder, &c1).as_deref(), Some("text"));
}

#[tokio::test]
async fn records_writes() {
    let store = FakeDocumentStore::new();
    let folder = Path::new("/docs");
    store.write_doc(folder, "a", "one").await.unwrap();
    store.write_doc(folder, "a", "two").await.unwrap();
    assert_eq!(store.write_count("a"), 2);
    assert_eq!(store.doc(folder, "a").as_deref(), Some("two"));
}

#[tokio::test]
async fn scripted_write_failures_leave_document_untouched() {
    let store = FakeDocumentStore::new();
    let folder = Path::new("/docs");
    store.set_doc(folder, "a", "before");
    store.fail_writes("a", 1);

    assert!(store.write_doc(folder, "a", "after").await.is_err());
    assert_eq!(store.doc(folder, "a").as_deref(), Some("before"));
    store.write_doc(folder, "a", "after").await.unwrap();
    assert_eq!(store.doc(folder, "a").as_deref(), Some("after"));
}
