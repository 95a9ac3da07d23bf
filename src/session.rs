//! Anonymous Identity Provider
//!
//! A client generates one durable random session identifier and reuses it for
//! every anonymous operation. The identifier lives in a small TOML state file
//! alongside the auth token, the client's only persisted state. When the
//! file cannot be written the id degrades to an in-memory value for this
//! process only.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;
use uuid::Uuid;

use crate::identity::SessionId;

/// Client-side durable key-value state: session id + auth token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl ClientState {
    /// Load state from a TOML file. Missing or unreadable files yield the
    /// default (empty) state.
    pub fn load(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|contents| toml::from_str(&contents).ok())
            .unwrap_or_default()
    }

    /// Save state to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents =
            toml::to_string_pretty(self).map_err(|e| std::io::Error::other(e.to_string()))?;
        std::fs::write(path, contents)
    }
}

/// Return the persisted session id for this client, generating and persisting
/// a cryptographically random one on first use.
///
/// Never fails: when the state file is unwritable, the generated id is
/// returned unpersisted and a warning is logged.
pub fn get_or_create_session_id(path: &Path) -> SessionId {
    let mut state = ClientState::load(path);
    if let Some(existing) = state
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return SessionId::new(existing);
    }

    let id = Uuid::new_v4().to_string();
    state.session_id = Some(id.clone());
    if let Err(error) = state.save(path) {
        warn!(path = %path.display(), %error, "session id not persisted; using in-memory id");
    }
    SessionId::new(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_creates_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");

        let id = get_or_create_session_id(&path);
        assert!(!id.as_str().is_empty());
        assert!(path.exists());

        let state = ClientState::load(&path);
        assert_eq!(state.session_id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_subsequent_calls_return_same_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");

        let first = get_or_create_session_id(&path);
        let second = get_or_create_session_id(&path);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ids_differ_across_clients() {
        let dir = tempfile::tempdir().unwrap();
        let a = get_or_create_session_id(&dir.path().join("a.toml"));
        let b = get_or_create_session_id(&dir.path().join("b.toml"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_unwritable_path_falls_back_to_memory() {
        // A directory path can't be written as a file.
        let dir = tempfile::tempdir().unwrap();
        let id = get_or_create_session_id(dir.path());
        assert!(!id.as_str().is_empty());
    }

    #[test]
    fn test_state_preserves_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");

        let mut state = ClientState::load(&path);
        state.token = Some("tok-abc".to_string());
        state.save(&path).unwrap();

        let id = get_or_create_session_id(&path);
        let reloaded = ClientState::load(&path);
        assert_eq!(reloaded.token.as_deref(), Some("tok-abc"));
        assert_eq!(reloaded.session_id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_corrupt_state_file_resets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        std::fs::write(&path, "not valid { toml }").unwrap();

        let id = get_or_create_session_id(&path);
        assert!(!id.as_str().is_empty());
    }
}
