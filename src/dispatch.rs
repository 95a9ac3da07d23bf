//! Operation Dispatcher
//!
//! Applies the requested transform or analysis and records the result to the
//! log store under the caller's resolved identity. Logging is best-effort: a
//! storage failure degrades history completeness, never the returned result.

use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::identity::IdentityContext;
use crate::store::{LogStore, NewLogEntry};
use crate::text_ops::{self, OperationType, TextAnalysis};

/// Dispatch errors
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Empty or whitespace-only input, rejected before any log write.
    #[error("text must not be empty")]
    EmptyText,
}

/// Result of a dispatched operation.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Present for transform operations.
    pub transformed_text: Option<String>,
    /// Present for the analyze operation.
    pub analysis: Option<TextAnalysis>,
    /// Id of the recorded log entry; `None` when the append failed.
    pub entry_id: Option<u64>,
    /// False when the operation succeeded but the log append did not.
    pub history_recorded: bool,
}

/// Performs operations and records them.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<LogStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<LogStore>) -> Self {
        Dispatcher { store }
    }

    /// Apply `op` to `text` and record the operation under `identity`.
    ///
    /// The identity is resolved by the caller before dispatch: a rejected
    /// token must fail the request there, never fall through to a session id.
    pub fn perform(
        &self,
        op: OperationType,
        text: &str,
        identity: &IdentityContext,
    ) -> Result<Outcome, DispatchError> {
        if text.trim().is_empty() {
            return Err(DispatchError::EmptyText);
        }

        let (transformed_text, analysis) = match op {
            OperationType::Uppercase => (Some(text_ops::to_uppercase(text)), None),
            OperationType::Lowercase => (Some(text_ops::to_lowercase(text)), None),
            OperationType::Titlecase => (Some(text_ops::to_titlecase(text)), None),
            OperationType::Reverse => (Some(text_ops::reverse(text)), None),
            OperationType::Analyze => (None, Some(text_ops::analyze(text))),
        };

        let entry = NewLogEntry {
            owner: identity.owner(),
            operation_type: op,
            original_text: text.to_string(),
            transformed_text: transformed_text.clone(),
            analysis,
        };

        let (entry_id, history_recorded) = match self.store.append(entry) {
            Ok(id) => (Some(id), true),
            Err(error) => {
                warn!(operation = %op, %error, "failed to record operation");
                (None, false)
            }
        };

        Ok(Outcome {
            transformed_text,
            analysis,
            entry_id,
            history_recorded,
        })
    }
}
