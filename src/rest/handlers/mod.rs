//! HTTP request handlers.

pub mod admin;
pub mod auth;
pub mod history;
pub mod text;

use axum::http::{header, HeaderMap};

use crate::app::App;
use crate::auth::AuthError;
use crate::identity::{IdentityContext, SessionId};
use crate::messages::{lookup, Language, MessageKey};
use crate::rest::error::RestError;

/// Language negotiated from `Accept-Language`; English when absent.
pub(crate) fn language(headers: &HeaderMap) -> Language {
    Language::from_tag(
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok()),
    )
}

/// The bearer token from `Authorization`, if one was presented.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned)
}

/// Map an [`AuthError`] to a localized HTTP error.
pub(crate) fn auth_error(lang: Language, err: AuthError) -> RestError {
    match err {
        AuthError::MissingCredentials => {
            RestError::bad_request(lookup(lang, MessageKey::CredentialsRequired))
        }
        AuthError::UsernameTaken => RestError::conflict(lookup(lang, MessageKey::UsernameTaken)),
        AuthError::InvalidCredentials => {
            RestError::unauthorized(lookup(lang, MessageKey::LoginFailed))
        }
        AuthError::InvalidToken => RestError::unauthorized(lookup(lang, MessageKey::InvalidToken)),
        AuthError::ExpiredToken => RestError::unauthorized(lookup(lang, MessageKey::TokenExpired)),
        AuthError::Persist(_) => RestError::unavailable(err.to_string()),
    }
}

/// Resolve the caller's identity from the request headers.
///
/// A presented bearer token must validate; it is never silently replaced by
/// the session header, so attribution cannot change mid-flow. Exactly one of
/// `Authorization` and `X-Session-ID` must be present.
pub(crate) fn resolve_identity(
    app: &App,
    headers: &HeaderMap,
) -> Result<IdentityContext, RestError> {
    let lang = language(headers);
    let bearer = bearer_token(headers);
    let session = headers
        .get("x-session-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned);

    match (bearer, session) {
        (Some(_), Some(_)) => Err(RestError::bad_request(lookup(
            lang,
            MessageKey::AmbiguousIdentity,
        ))),
        (Some(token), None) => {
            let user_id = app
                .auth
                .authenticate(&token)
                .map_err(|e| auth_error(lang, e))?;
            Ok(IdentityContext::User(user_id))
        }
        (None, Some(session_id)) => Ok(IdentityContext::Session(SessionId::new(session_id))),
        (None, None) => Err(RestError::bad_request(lookup(
            lang,
            MessageKey::MissingIdentity,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::http::HeaderValue;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn make_app() -> (Arc<App>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.data_dir = dir.path().to_path_buf();
        (Arc::new(App::from_config(config).unwrap()), dir)
    }

    #[test]
    fn test_resolve_identity_session_header() {
        let (app, _dir) = make_app();
        let mut headers = HeaderMap::new();
        headers.insert("x-session-id", HeaderValue::from_static("sess-1"));

        let identity = resolve_identity(&app, &headers).unwrap();
        assert_eq!(
            identity,
            IdentityContext::Session(SessionId::new("sess-1"))
        );
    }

    #[test]
    fn test_resolve_identity_missing_headers() {
        let (app, _dir) = make_app();
        let headers = HeaderMap::new();
        let err = resolve_identity(&app, &headers).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_resolve_identity_both_headers_rejected() {
        let (app, _dir) = make_app();
        let mut headers = HeaderMap::new();
        headers.insert("x-session-id", HeaderValue::from_static("sess-1"));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok"),
        );

        let err = resolve_identity(&app, &headers).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_resolve_identity_bad_token_never_falls_back() {
        let (app, _dir) = make_app();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer bogus"),
        );

        let err = resolve_identity(&app, &headers).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_resolve_identity_valid_token() {
        let (app, _dir) = make_app();
        app.auth.signup("alice", "pw").unwrap();
        let grant = app.auth.login("alice", "pw").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", grant.token)).unwrap(),
        );

        let identity = resolve_identity(&app, &headers).unwrap();
        assert_eq!(identity, IdentityContext::User(grant.user_id));
    }

    #[test]
    fn test_bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcg=="),
        );
        assert!(bearer_token(&headers).is_none());
    }
}
