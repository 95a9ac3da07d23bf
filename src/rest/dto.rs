//! REST API Data Transfer Objects
//!
//! Request/response types for the HTTP endpoints. Responses are flat
//! `{ success, ... }` objects in the shape browser clients consume directly.

use serde::{Deserialize, Serialize};

use crate::store::OperationLogEntry;
use crate::text_ops::TextAnalysis;

/// Signup request body
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// Login request body. `sessionId` carries the client's anonymous id so the
/// server can merge its history on success.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Body for transform and analyze operations
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Generic `{ success, message }` response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user_id: String,
    pub message: String,
}

/// Transform response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    pub success: bool,
    pub transformed_text: String,
    pub message: String,
    /// Set when the transform succeeded but history could not be recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Analyze response
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: TextAnalysis,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// History response
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub data: Vec<OperationLogEntry>,
    pub message: String,
}

/// Health check payload
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub operations: u64,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub data: HealthData,
}
