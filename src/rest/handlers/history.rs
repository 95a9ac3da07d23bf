//! History Handler
//!
//! Account history requires a valid bearer token; anonymous history is not
//! separately queryable.

use std::sync::Arc;

use axum::{http::HeaderMap, Extension, Json};

use super::{auth_error, bearer_token, language};
use crate::app::App;
use crate::messages::{lookup, MessageKey};
use crate::rest::dto::HistoryResponse;
use crate::rest::error::RestError;

/// The authenticated user's operation history, most recent first
pub async fn history(
    Extension(app): Extension<Arc<App>>,
    headers: HeaderMap,
) -> Result<Json<HistoryResponse>, RestError> {
    let lang = language(&headers);

    let token = bearer_token(&headers)
        .ok_or_else(|| RestError::unauthorized(lookup(lang, MessageKey::InvalidToken)))?;
    let user_id = app
        .auth
        .authenticate(&token)
        .map_err(|e| auth_error(lang, e))?;

    let data = app.store.query_by_user(&user_id);
    let message = if data.is_empty() {
        lookup(lang, MessageKey::HistoryEmpty)
    } else {
        lookup(lang, MessageKey::HistoryRetrieved)
    };

    Ok(Json(HistoryResponse {
        success: true,
        data,
        message: message.to_string(),
    }))
}
