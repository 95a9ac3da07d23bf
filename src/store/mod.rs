//! Durable Operation Log
//!
//! Append-only store of operation records, each tagged with exactly one owner
//! (a user account or an anonymous session). Entries are immutable after
//! creation; the single exception is the one-time owner rewrite performed by
//! [`LogStore::reassign_owner`] when anonymous history merges into an account.
//!
//! ## Architecture
//!
//! ```text
//! append / reassign -> journal (JSON lines, fsync) -> in-memory state
//!                           |
//!                           v
//!                    replay on open
//! ```
//!
//! The journal record is written before the in-memory commit, both under the
//! state write lock, so queries observe either pre- or post-write state and
//! never a partial migration.

mod error;
mod journal;

pub use error::{StoreError, StoreResult};
pub use journal::{Journal, JournalRecord};

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::identity::{OwnerRef, SessionId, UserId};
use crate::text_ops::{OperationType, TextAnalysis};

/// A single recorded operation.
///
/// `id` and `timestamp` are assigned by the store and never change. Only the
/// owner may change, and only via [`LogStore::reassign_owner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationLogEntry {
    pub id: u64,
    #[serde(flatten)]
    pub owner: OwnerRef,
    pub operation_type: OperationType,
    pub original_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformed_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<TextAnalysis>,
    pub timestamp: DateTime<Utc>,
}

/// Payload for [`LogStore::append`]. Id and timestamp are assigned by the
/// store at commit time.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub owner: OwnerRef,
    pub operation_type: OperationType,
    pub original_text: String,
    pub transformed_text: Option<String>,
    pub analysis: Option<TextAnalysis>,
}

struct LogState {
    /// Entries in append order (= ascending id and timestamp).
    entries: Vec<OperationLogEntry>,
    next_id: u64,
    last_timestamp: DateTime<Utc>,
}

/// Durable, append-only store of operation records.
pub struct LogStore {
    state: RwLock<LogState>,
    journal: Mutex<Journal>,
}

impl LogStore {
    /// Open the store rooted at `data_dir`, replaying the journal.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let journal = Journal::open(data_dir.to_path_buf())?;

        let mut state = LogState {
            entries: Vec::new(),
            next_id: 1,
            last_timestamp: DateTime::<Utc>::MIN_UTC,
        };
        for record in journal.read_all()? {
            match record {
                JournalRecord::Append { entry } => {
                    state.next_id = state.next_id.max(entry.id + 1);
                    state.last_timestamp = state.last_timestamp.max(entry.timestamp);
                    state.entries.push(entry);
                }
                JournalRecord::Reassign {
                    session_id,
                    user_id,
                } => {
                    reassign_in_place(&mut state.entries, &session_id, &user_id);
                }
            }
        }

        Ok(LogStore {
            state: RwLock::new(state),
            journal: Mutex::new(journal),
        })
    }

    /// Append a new entry. Rejects blank text before any write; otherwise
    /// assigns a unique id and a strictly increasing timestamp, makes the
    /// journal record durable, then commits to memory.
    pub fn append(&self, new: NewLogEntry) -> StoreResult<u64> {
        if new.original_text.trim().is_empty() {
            return Err(StoreError::EmptyText);
        }

        let mut state = self.state.write();
        let id = state.next_id;
        let now = Utc::now();
        // Clamp forward so the per-entry timestamp order always matches id order.
        let timestamp = if now > state.last_timestamp {
            now
        } else {
            state.last_timestamp + Duration::microseconds(1)
        };

        let entry = OperationLogEntry {
            id,
            owner: new.owner,
            operation_type: new.operation_type,
            original_text: new.original_text,
            transformed_text: new.transformed_text,
            analysis: new.analysis,
            timestamp,
        };

        self.journal
            .lock()
            .append(&JournalRecord::Append {
                entry: entry.clone(),
            })?;

        state.next_id = id + 1;
        state.last_timestamp = timestamp;
        state.entries.push(entry);
        Ok(id)
    }

    /// All entries owned by `user_id`, most recent first.
    pub fn query_by_user(&self, user_id: &UserId) -> Vec<OperationLogEntry> {
        let state = self.state.read();
        state
            .entries
            .iter()
            .rev()
            .filter(|e| e.owner.is_user(user_id))
            .cloned()
            .collect()
    }

    /// All entries owned by the anonymous session, most recent first.
    pub fn query_by_session(&self, session_id: &SessionId) -> Vec<OperationLogEntry> {
        let state = self.state.read();
        state
            .entries
            .iter()
            .rev()
            .filter(|e| e.owner.is_session(session_id))
            .cloned()
            .collect()
    }

    /// Atomically rewrite the owner of every entry held by `session_id` to
    /// `user_id`, returning how many were migrated.
    ///
    /// Safe to call repeatedly with the same arguments: once migrated, nothing
    /// matches the old key, so the second call touches zero entries and writes
    /// no journal record.
    pub fn reassign_owner(&self, session_id: &SessionId, user_id: &UserId) -> StoreResult<usize> {
        let mut state = self.state.write();
        let matching = state
            .entries
            .iter()
            .filter(|e| e.owner.is_session(session_id))
            .count();
        if matching == 0 {
            return Ok(0);
        }

        self.journal.lock().append(&JournalRecord::Reassign {
            session_id: session_id.clone(),
            user_id: user_id.clone(),
        })?;

        reassign_in_place(&mut state.entries, session_id, user_id);
        Ok(matching)
    }

    /// Total number of entries across all owners.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn reassign_in_place(entries: &mut [OperationLogEntry], session_id: &SessionId, user_id: &UserId) {
    for entry in entries
        .iter_mut()
        .filter(|e| e.owner.is_session(session_id))
    {
        entry.owner = OwnerRef::user(user_id.clone());
    }
}
