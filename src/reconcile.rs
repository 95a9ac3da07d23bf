//! Merge Reconciler
//!
//! On login, the anonymous history accumulated under the presented session id
//! is reattributed to the authenticated user, exactly once, idempotently.
//!
//! The store performs the rewrite atomically with respect to queries. An
//! append racing the migration lands either before the rewrite (and is
//! migrated) or after it (and is picked up the next time the same session id
//! is presented at login); a race-created entry is never permanently dropped
//! under the old identity. The user-visible outcome of login is never blocked
//! by a merge failure: transient store errors are retried in the background.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::identity::{SessionId, UserId};
use crate::store::{LogStore, StoreError};

/// Verification passes after the initial rewrite before reporting a remainder.
const MAX_PASSES: usize = 3;
/// Background retry schedule for transient store failures.
const RETRY_ATTEMPTS: u32 = 5;
const RETRY_DELAY_SECS: u64 = 5;

/// Merge errors
#[derive(Error, Debug)]
pub enum MergeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Entries still bearing the session id after the bounded re-attempts.
    #[error("merge incomplete: {remaining} entries still owned by the session")]
    Incomplete { remaining: usize },
}

/// Drives session-to-account history migration.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<LogStore>,
}

impl Reconciler {
    pub fn new(store: Arc<LogStore>) -> Self {
        Reconciler { store }
    }

    /// Reattribute all entries under `session_id` to `user_id`, returning the
    /// total number migrated. Idempotent: a repeat call migrates nothing.
    ///
    /// After the rewrite the session is re-queried; entries appended
    /// concurrently with the migration are swept up in a bounded number of
    /// extra passes.
    pub fn merge(&self, session_id: &SessionId, user_id: &UserId) -> Result<usize, MergeError> {
        let mut migrated = 0;
        for _ in 0..MAX_PASSES {
            migrated += self.store.reassign_owner(session_id, user_id)?;
            if self.store.query_by_session(session_id).is_empty() {
                return Ok(migrated);
            }
        }

        let remaining = self.store.query_by_session(session_id).len();
        if remaining == 0 {
            Ok(migrated)
        } else {
            Err(MergeError::Incomplete { remaining })
        }
    }

    /// Merge triggered by a successful login. Never fails or blocks the
    /// login: errors are logged and retried in the background, and the same
    /// session id merges again at its next login regardless.
    pub fn merge_after_login(&self, session_id: &SessionId, user_id: &UserId) {
        match self.merge(session_id, user_id) {
            Ok(0) => {}
            Ok(migrated) => {
                info!(session = %session_id, user = %user_id, migrated, "merged anonymous history");
            }
            Err(error) => {
                warn!(
                    session = %session_id,
                    user = %user_id,
                    %error,
                    "history merge failed, retrying in background"
                );
                self.spawn_retry(session_id.clone(), user_id.clone());
            }
        }
    }

    fn spawn_retry(&self, session_id: SessionId, user_id: UserId) {
        let reconciler = self.clone();
        tokio::spawn(async move {
            for attempt in 1..=RETRY_ATTEMPTS {
                tokio::time::sleep(std::time::Duration::from_secs(RETRY_DELAY_SECS)).await;
                match reconciler.merge(&session_id, &user_id) {
                    Ok(migrated) => {
                        info!(session = %session_id, user = %user_id, migrated, "merged history backlog");
                        return;
                    }
                    Err(error) => {
                        warn!(attempt, %error, "history merge retry failed");
                    }
                }
            }
            warn!(
                session = %session_id,
                "giving up on background merge; entries will migrate at the session's next login"
            );
        });
    }
}
