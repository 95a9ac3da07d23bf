//! Identity types
//!
//! Durable user ids, client-generated session ids, and the mutually-exclusive
//! owner tag carried by every log entry. An entry is owned by exactly one of
//! the two; the enum makes "both" and "neither" unrepresentable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Durable account identifier. Assigned at signup, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client-generated identifier for an unauthenticated browser instance.
///
/// Durable for the life of the client's local state, not guaranteed unique
/// across devices but treated as unique per client origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        SessionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The attribution key on a log entry: a user account or an anonymous session.
///
/// Serializes flat as `{"userId": ...}` or `{"sessionId": ...}` so log entries
/// keep the wire shape clients expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerRef {
    User {
        #[serde(rename = "userId")]
        user_id: UserId,
    },
    Session {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
    },
}

impl OwnerRef {
    pub fn user(user_id: UserId) -> Self {
        OwnerRef::User { user_id }
    }

    pub fn session(session_id: SessionId) -> Self {
        OwnerRef::Session { session_id }
    }

    pub fn is_user(&self, id: &UserId) -> bool {
        matches!(self, OwnerRef::User { user_id } if user_id == id)
    }

    pub fn is_session(&self, id: &SessionId) -> bool {
        matches!(self, OwnerRef::Session { session_id } if session_id == id)
    }
}

/// Resolved caller identity for a single operation.
///
/// The HTTP layer resolves this before dispatch: a presented bearer token must
/// validate (it is never silently replaced by the session header), otherwise
/// the session id is used. Exactly one of the two is ever in play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityContext {
    User(UserId),
    Session(SessionId),
}

impl IdentityContext {
    /// The owner tag a log entry created under this identity will carry.
    pub fn owner(&self) -> OwnerRef {
        match self {
            IdentityContext::User(user_id) => OwnerRef::user(user_id.clone()),
            IdentityContext::Session(session_id) => OwnerRef::session(session_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_ref_user_wire_shape() {
        let owner = OwnerRef::user(UserId::new("u-1"));
        let json = serde_json::to_string(&owner).unwrap();
        assert_eq!(json, r#"{"userId":"u-1"}"#);
    }

    #[test]
    fn test_owner_ref_session_wire_shape() {
        let owner = OwnerRef::session(SessionId::new("sess-1"));
        let json = serde_json::to_string(&owner).unwrap();
        assert_eq!(json, r#"{"sessionId":"sess-1"}"#);
    }

    #[test]
    fn test_owner_ref_roundtrip() {
        let owner = OwnerRef::session(SessionId::new("sess-2"));
        let json = serde_json::to_string(&owner).unwrap();
        let back: OwnerRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, owner);
    }

    #[test]
    fn test_owner_ref_matching() {
        let owner = OwnerRef::session(SessionId::new("sess-1"));
        assert!(owner.is_session(&SessionId::new("sess-1")));
        assert!(!owner.is_session(&SessionId::new("sess-2")));
        assert!(!owner.is_user(&UserId::new("sess-1")));
    }

    #[test]
    fn test_identity_context_owner() {
        let ctx = IdentityContext::User(UserId::new("alice"));
        assert_eq!(ctx.owner(), OwnerRef::user(UserId::new("alice")));

        let ctx = IdentityContext::Session(SessionId::new("sess-9"));
        assert_eq!(ctx.owner(), OwnerRef::session(SessionId::new("sess-9")));
    }
}
