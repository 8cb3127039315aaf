//! Public endpoints: the operations an application performs while gating
//! access with a code. Thin wrappers over the license service.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::handlers::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/validate", post(validate_code))
        .route("/register", post(register_code))
        .route("/consume", post(consume_code))
        .route("/remaining", get(remaining_time))
        .route("/registered", get(has_registered_code))
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: String,
    /// Identity asking; empty skips the ownership check.
    #[serde(default)]
    pub identity: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub reason: String,
}

async fn validate_code(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>> {
    let verdict = state.licenses.validate_code(&req.code, &req.identity)?;

    Ok(Json(ValidateResponse {
        valid: verdict.accepted(),
        reason: verdict.message(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub code: String,
    pub identity: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub registered: bool,
}

async fn register_code(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    let registered = state.licenses.register_code(&req.code, &req.identity)?;
    Ok(Json(RegisterResponse { registered }))
}

#[derive(Debug, Deserialize)]
pub struct ConsumeRequest {
    pub code: String,
    pub identity: String,
}

#[derive(Debug, Serialize)]
pub struct ConsumeResponse {
    pub consumed: bool,
}

async fn consume_code(
    State(state): State<AppState>,
    Json(req): Json<ConsumeRequest>,
) -> Result<Json<ConsumeResponse>> {
    let consumed = state.licenses.consume_code(&req.code, &req.identity)?;
    Ok(Json(ConsumeResponse { consumed }))
}

#[derive(Debug, Deserialize)]
pub struct IdentityQuery {
    pub identity: String,
}

#[derive(Debug, Serialize)]
pub struct RemainingResponse {
    pub report: String,
}

async fn remaining_time(
    State(state): State<AppState>,
    Query(query): Query<IdentityQuery>,
) -> Result<Json<RemainingResponse>> {
    let report = state.licenses.remaining_time(&query.identity)?;
    Ok(Json(RemainingResponse { report }))
}

#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    pub registered: bool,
}

async fn has_registered_code(
    State(state): State<AppState>,
    Query(query): Query<IdentityQuery>,
) -> Result<Json<RegisteredResponse>> {
    let registered = state.licenses.has_registered_code(&query.identity)?;
    Ok(Json(RegisteredResponse { registered }))
}
