//! Journal recovery tests: a reopened store must reproduce the exact state
//! the journal recorded, including owner reassignments.

use std::sync::Arc;
use tempfile::TempDir;

use textmate::{
    LogStore, NewLogEntry, OperationType, OwnerRef, Reconciler, SessionId, StoreError, UserId,
};

fn anon(session: &str, text: &str) -> NewLogEntry {
    NewLogEntry {
        owner: OwnerRef::session(SessionId::new(session)),
        operation_type: OperationType::Uppercase,
        original_text: text.to_string(),
        transformed_text: Some(text.to_uppercase()),
        analysis: None,
    }
}

#[test]
fn test_entries_survive_reopen_in_order() {
    let dir = TempDir::new().unwrap();
    {
        let store = LogStore::open(dir.path()).unwrap();
        for i in 0..10 {
            store.append(anon("sess-r", &format!("text {i}"))).unwrap();
        }
    }

    let store = LogStore::open(dir.path()).unwrap();
    let entries = store.query_by_session(&SessionId::new("sess-r"));
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[0].original_text, "text 9");
    assert_eq!(entries[9].original_text, "text 0");
}

#[test]
fn test_merge_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let user = UserId::new("alice");
    {
        let store = Arc::new(LogStore::open(dir.path()).unwrap());
        store.append(anon("sess-m", "one")).unwrap();
        store.append(anon("sess-m", "two")).unwrap();
        let reconciler = Reconciler::new(Arc::clone(&store));
        assert_eq!(reconciler.merge(&SessionId::new("sess-m"), &user).unwrap(), 2);
    }

    let store = LogStore::open(dir.path()).unwrap();
    assert!(store.query_by_session(&SessionId::new("sess-m")).is_empty());
    let entries = store.query_by_user(&user);
    assert_eq!(entries.len(), 2);

    // Idempotent after recovery too.
    assert_eq!(
        store.reassign_owner(&SessionId::new("sess-m"), &user).unwrap(),
        0
    );
}

#[test]
fn test_interleaved_append_and_merge_replay() {
    let dir = TempDir::new().unwrap();
    let user = UserId::new("bob");
    {
        let store = LogStore::open(dir.path()).unwrap();
        store.append(anon("sess-i", "before")).unwrap();
        store
            .reassign_owner(&SessionId::new("sess-i"), &user)
            .unwrap();
        // An orphan logged under the already-merged session id.
        store.append(anon("sess-i", "after")).unwrap();
    }

    let store = LogStore::open(dir.path()).unwrap();
    // The reassign only covers entries that existed when it was journaled.
    assert_eq!(store.query_by_user(&user).len(), 1);
    let orphans = store.query_by_session(&SessionId::new("sess-i"));
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].original_text, "after");
}

#[test]
fn test_ids_and_timestamps_stable_across_reopen() {
    let dir = TempDir::new().unwrap();
    let before;
    {
        let store = LogStore::open(dir.path()).unwrap();
        store.append(anon("sess-s", "stable")).unwrap();
        before = store.query_by_session(&SessionId::new("sess-s"));
    }

    let store = LogStore::open(dir.path()).unwrap();
    let after = store.query_by_session(&SessionId::new("sess-s"));
    assert_eq!(after, before);
}

#[test]
fn test_corrupt_journal_line_fails_open() {
    let dir = TempDir::new().unwrap();
    {
        let store = LogStore::open(dir.path()).unwrap();
        store.append(anon("sess-c", "fine")).unwrap();
    }

    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(dir.path().join("operations.journal"))
        .unwrap();
    writeln!(file, "{{ truncated garbage").unwrap();

    match LogStore::open(dir.path()) {
        Err(StoreError::Corrupt { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected corrupt journal error, got {:?}", other.map(|_| ())),
    }
}
