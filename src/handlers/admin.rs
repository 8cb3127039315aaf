//! Administrative endpoints: issuing and managing the code inventory.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::expiry::{ExpiryWindow, DEFAULT_EXPIRY_DAYS};
use crate::handlers::AppState;
use crate::models::LicenseCode;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/codes", get(list_codes).post(generate_code))
        .route("/codes/{code}", delete(delete_code))
        .route("/codes/{code}/toggle", post(toggle_usage))
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    /// Validity window in whole days; defaults to 30.
    #[serde(default)]
    pub expiry_days: Option<i64>,
    /// Validity window in fractional hours; takes precedence when set.
    #[serde(default)]
    pub expiry_hours: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub code: String,
}

async fn generate_code(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let window = match (req.expiry_hours, req.expiry_days) {
        (Some(hours), _) if hours > 0.0 => ExpiryWindow::Hours(hours),
        (Some(_), _) => {
            return Err(AppError::BadRequest(
                "expiry_hours must be positive".to_string(),
            ))
        }
        (None, Some(days)) if days > 0 => ExpiryWindow::Days(days),
        (None, Some(_)) => {
            return Err(AppError::BadRequest(
                "expiry_days must be positive".to_string(),
            ))
        }
        (None, None) => ExpiryWindow::Days(DEFAULT_EXPIRY_DAYS),
    };

    let code = state.licenses.generate_code(window)?;
    Ok(Json(GenerateResponse { code }))
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub codes: Vec<LicenseCode>,
    pub total: usize,
}

async fn list_codes(State(state): State<AppState>) -> Result<Json<ListResponse>> {
    let codes = state.licenses.list_codes()?;
    let total = codes.len();
    Ok(Json(ListResponse { codes, total }))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

async fn delete_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.licenses.delete_code(&code)? {
        return Err(AppError::NotFound(format!("code {} not found", code)));
    }
    Ok(Json(DeleteResponse { deleted: true }))
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub toggled: bool,
}

async fn toggle_usage(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ToggleResponse>> {
    if !state.licenses.toggle_usage(&code)? {
        return Err(AppError::NotFound(format!("code {} not found", code)));
    }
    Ok(Json(ToggleResponse { toggled: true }))
}
