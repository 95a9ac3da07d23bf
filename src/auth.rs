//! Authentication Service
//!
//! Password hashing (argon2id), opaque bearer tokens (SHA-256-hashed at
//! rest), and the persisted user table. Token mechanics are opaque to the
//! rest of the system: the reconciler consumes only the user id from a
//! successful login.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::identity::UserId;

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Blank username or password.
    #[error("username and password are required")]
    MissingCredentials,

    /// Signup with a username that already exists.
    #[error("username already taken")]
    UsernameTaken,

    /// Unknown user or wrong password. Deliberately undistinguished.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Token not present in the registry.
    #[error("invalid token")]
    InvalidToken,

    /// Token past its expiry. The caller must re-authenticate; the request is
    /// never silently downgraded to anonymous.
    #[error("token expired")]
    ExpiredToken,

    /// The user table could not be written.
    #[error("failed to persist user table: {0}")]
    Persist(#[from] std::io::Error),
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub password_hash: String,
}

/// User table persisted to a TOML file for reuse across server restarts.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedUsers {
    users: Vec<UserRecord>,
}

impl PersistedUsers {
    /// Load the table from a TOML file. Returns `None` if the file doesn't exist.
    fn load(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        toml::from_str(&contents).ok()
    }

    /// Save the table to a TOML file.
    fn save(&self, path: &Path) -> std::io::Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| std::io::Error::other(e.to_string()))?;
        std::fs::write(path, contents)
    }
}

#[derive(Debug, Clone)]
struct TokenRecord {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

/// Issued on successful login.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub user_id: UserId,
    /// The opaque bearer token, shown to the client exactly once.
    pub token: String,
}

/// Credential checking and token issuance.
pub struct AuthService {
    /// Accounts keyed by username.
    users: RwLock<HashMap<String, UserRecord>>,
    /// Live tokens keyed by SHA-256 of the token value.
    tokens: RwLock<HashMap<String, TokenRecord>>,
    users_path: PathBuf,
    token_ttl: Duration,
}

impl AuthService {
    /// Open the service, loading any persisted user table from `data_dir`.
    pub fn open(data_dir: &Path, token_ttl_secs: u64) -> Self {
        let users_path = data_dir.join("users.toml");
        let users = PersistedUsers::load(&users_path)
            .map(|persisted| {
                persisted
                    .users
                    .into_iter()
                    .map(|u| (u.username.clone(), u))
                    .collect()
            })
            .unwrap_or_default();

        AuthService {
            users: RwLock::new(users),
            tokens: RwLock::new(HashMap::new()),
            users_path,
            token_ttl: Duration::seconds(token_ttl_secs as i64),
        }
    }

    /// Register a new account. The user table is persisted before the account
    /// becomes visible in memory.
    pub fn signup(&self, username: &str, password: &str) -> Result<UserId, AuthError> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let mut users = self.users.write();
        if users.contains_key(username) {
            return Err(AuthError::UsernameTaken);
        }

        let record = UserRecord {
            user_id: UserId::new(Uuid::new_v4().to_string()),
            username: username.to_string(),
            password_hash: hash_password(password),
        };
        let user_id = record.user_id.clone();

        let mut snapshot: Vec<UserRecord> = users.values().cloned().collect();
        snapshot.push(record.clone());
        PersistedUsers { users: snapshot }.save(&self.users_path)?;

        users.insert(username.to_string(), record);
        Ok(user_id)
    }

    /// Validate credentials and issue a bearer token.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginGrant, AuthError> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user_id = {
            let users = self.users.read();
            let record = users.get(username).ok_or(AuthError::InvalidCredentials)?;
            if !verify_password(password, &record.password_hash) {
                return Err(AuthError::InvalidCredentials);
            }
            record.user_id.clone()
        };

        let token = generate_token();
        self.tokens.write().insert(
            hash_token(&token),
            TokenRecord {
                user_id: user_id.clone(),
                expires_at: Utc::now() + self.token_ttl,
            },
        );

        Ok(LoginGrant { user_id, token })
    }

    /// Resolve a bearer token to its user. Expired tokens are removed and
    /// rejected.
    pub fn authenticate(&self, token: &str) -> Result<UserId, AuthError> {
        let key = hash_token(token);
        let record = {
            let tokens = self.tokens.read();
            tokens.get(&key).cloned().ok_or(AuthError::InvalidToken)?
        };

        if record.expires_at <= Utc::now() {
            self.tokens.write().remove(&key);
            return Err(AuthError::ExpiredToken);
        }

        Ok(record.user_id)
    }

    /// Invalidate a token (logout). Returns whether it existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens.write().remove(&hash_token(token)).is_some()
    }

    /// Drop expired tokens. Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut tokens = self.tokens.write();
        let before = tokens.len();
        tokens.retain(|_, record| record.expires_at > now);
        before - tokens.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }
}

// ── Password Hashing (argon2id) ─────────────────────────────────────────────

/// Hash a password using argon2id with a random salt.
pub fn hash_password(password: &str) -> String {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .expect("argon2 hashing should not fail")
        .to_string()
}

/// Verify a password against an argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{password_hash::PasswordHash, Argon2, PasswordVerifier};
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// ── Token Handling ──────────────────────────────────────────────────────────

/// Hash a token using SHA-256 for registry lookup.
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate a random bearer token (32 bytes → 64 hex characters).
pub fn generate_token() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    use std::fmt::Write;
    let mut hex = String::with_capacity(64);
    for b in &bytes {
        let _ = write!(hex, "{b:02x}");
    }
    hex
}
