//! Auth Handlers
//!
//! Signup and login. A successful login triggers the session-to-account
//! history merge; the merge never blocks or fails the login response.

use std::sync::Arc;

use axum::{http::HeaderMap, http::StatusCode, Extension, Json};

use super::{auth_error, language};
use crate::app::App;
use crate::identity::SessionId;
use crate::messages::{lookup, MessageKey};
use crate::rest::dto::{LoginRequest, LoginResponse, SignupRequest, StatusResponse};
use crate::rest::error::RestError;

/// Register a new account
pub async fn signup(
    Extension(app): Extension<Arc<App>>,
    headers: HeaderMap,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<StatusResponse>), RestError> {
    let lang = language(&headers);

    app.auth
        .signup(request.username.trim(), &request.password)
        .map_err(|e| auth_error(lang, e))?;

    Ok((
        StatusCode::CREATED,
        Json(StatusResponse {
            success: true,
            message: lookup(lang, MessageKey::SignupSuccess).to_string(),
        }),
    ))
}

/// Validate credentials and issue a token
///
/// When the body carries a session id, the anonymous history recorded under
/// it is merged into the account after authentication succeeds.
pub async fn login(
    Extension(app): Extension<Arc<App>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, RestError> {
    let lang = language(&headers);

    let grant = app
        .auth
        .login(request.username.trim(), &request.password)
        .map_err(|e| auth_error(lang, e))?;

    if let Some(session_id) = request
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        app.reconciler
            .merge_after_login(&SessionId::new(session_id), &grant.user_id);
    }

    Ok(Json(LoginResponse {
        success: true,
        token: grant.token,
        user_id: grant.user_id.to_string(),
        message: lookup(lang, MessageKey::LoginSuccess).to_string(),
    }))
}
