//! Transform and Analyze Handlers
//!
//! Each endpoint resolves the caller's identity, dispatches the pure
//! operation, and reports the result. History recording is best-effort; a
//! failed append surfaces as a `warning` field, never as a failed request.

use std::sync::Arc;

use axum::{http::HeaderMap, Extension, Json};

use super::{language, resolve_identity};
use crate::app::App;
use crate::messages::{lookup, Language, MessageKey};
use crate::rest::dto::{AnalyzeResponse, TextRequest, TransformResponse};
use crate::rest::error::RestError;
use crate::text_ops::OperationType;

pub async fn uppercase(
    Extension(app): Extension<Arc<App>>,
    headers: HeaderMap,
    Json(request): Json<TextRequest>,
) -> Result<Json<TransformResponse>, RestError> {
    transform(&app, &headers, &request, OperationType::Uppercase, MessageKey::Uppercased)
}

pub async fn lowercase(
    Extension(app): Extension<Arc<App>>,
    headers: HeaderMap,
    Json(request): Json<TextRequest>,
) -> Result<Json<TransformResponse>, RestError> {
    transform(&app, &headers, &request, OperationType::Lowercase, MessageKey::Lowercased)
}

pub async fn titlecase(
    Extension(app): Extension<Arc<App>>,
    headers: HeaderMap,
    Json(request): Json<TextRequest>,
) -> Result<Json<TransformResponse>, RestError> {
    transform(&app, &headers, &request, OperationType::Titlecase, MessageKey::Titlecased)
}

pub async fn reverse(
    Extension(app): Extension<Arc<App>>,
    headers: HeaderMap,
    Json(request): Json<TextRequest>,
) -> Result<Json<TransformResponse>, RestError> {
    transform(&app, &headers, &request, OperationType::Reverse, MessageKey::Reversed)
}

pub async fn analyze(
    Extension(app): Extension<Arc<App>>,
    headers: HeaderMap,
    Json(request): Json<TextRequest>,
) -> Result<Json<AnalyzeResponse>, RestError> {
    let lang = language(&headers);
    let identity = validate_and_resolve(&app, &headers, &request, lang)?;

    let outcome = app
        .dispatcher
        .perform(OperationType::Analyze, &request.text, &identity)?;
    app.record_operation();

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis: outcome.analysis.unwrap_or_default(),
        message: lookup(lang, MessageKey::Analyzed).to_string(),
        warning: history_warning(lang, outcome.history_recorded),
    }))
}

fn transform(
    app: &App,
    headers: &HeaderMap,
    request: &TextRequest,
    op: OperationType,
    success_key: MessageKey,
) -> Result<Json<TransformResponse>, RestError> {
    let lang = language(headers);
    let identity = validate_and_resolve(app, headers, request, lang)?;

    let outcome = app.dispatcher.perform(op, &request.text, &identity)?;
    app.record_operation();

    Ok(Json(TransformResponse {
        success: true,
        transformed_text: outcome.transformed_text.unwrap_or_default(),
        message: lookup(lang, success_key).to_string(),
        warning: history_warning(lang, outcome.history_recorded),
    }))
}

/// Blank text is rejected before identity resolution so a missing header
/// never masks the validation error the user can actually fix.
fn validate_and_resolve(
    app: &App,
    headers: &HeaderMap,
    request: &TextRequest,
    lang: Language,
) -> Result<crate::identity::IdentityContext, RestError> {
    if request.text.trim().is_empty() {
        return Err(RestError::bad_request(lookup(lang, MessageKey::EmptyText)));
    }
    resolve_identity(app, headers)
}

fn history_warning(lang: Language, history_recorded: bool) -> Option<String> {
    (!history_recorded).then(|| lookup(lang, MessageKey::HistoryUnavailable).to_string())
}
