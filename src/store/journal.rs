//! Append-only journal for the operation log
//!
//! Provides O(1) append-only persistence for log writes, replayed on startup
//! to rebuild the in-memory state.
//!
//! ## Record Format
//!
//! Each record is a JSON line (for simplicity and debuggability):
//! ```json
//! {"op":"append","entry":{"id":1,"sessionId":"sess-1","operationType":"uppercase",...}}
//! {"op":"reassign","sessionId":"sess-1","userId":"a1b2..."}
//! ```
//!
//! A `reassign` record is a single line, so a replayed store rewrites the
//! matching owners in one step, the same all-or-nothing shape the live store
//! guarantees under its write lock.

use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use super::{OperationLogEntry, StoreError, StoreResult};
use crate::identity::{SessionId, UserId};

/// A single journal record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum JournalRecord {
    /// A new log entry was appended.
    Append { entry: OperationLogEntry },
    /// Every entry owned by `session_id` was reassigned to `user_id`.
    #[serde(rename_all = "camelCase")]
    Reassign {
        session_id: SessionId,
        user_id: UserId,
    },
}

/// Append-only journal backing a [`super::LogStore`].
pub struct Journal {
    /// Path to the journal file
    path: PathBuf,
    /// Current journal writer (lazy initialization)
    writer: Option<BufWriter<File>>,
}

impl Journal {
    /// Create or open the journal under `dir`.
    pub fn open(dir: PathBuf) -> StoreResult<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Journal {
            path: dir.join("operations.journal"),
            writer: None,
        })
    }

    /// Open the journal file for writing (lazy initialization)
    fn ensure_writer(&mut self) -> StoreResult<&mut BufWriter<File>> {
        if self.writer.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            self.writer = Some(BufWriter::new(file));
        }
        Ok(self
            .writer
            .as_mut()
            .expect("journal writer initialized above"))
    }

    /// Append a record. Flushed and fsync'd: the record is durable on return.
    pub fn append(&mut self, record: &JournalRecord) -> StoreResult<()> {
        let writer = self.ensure_writer()?;

        let json = serde_json::to_string(record)?;
        writeln!(writer, "{json}")?;
        writer.flush()?;
        writer.get_ref().sync_all()?;

        Ok(())
    }

    /// Read all records for replay, in write order.
    pub fn read_all(&self) -> StoreResult<Vec<JournalRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record = serde_json::from_str(&line).map_err(|e| StoreError::Corrupt {
                line: idx + 1,
                reason: e.to_string(),
            })?;
            records.push(record);
        }

        Ok(records)
    }
}
