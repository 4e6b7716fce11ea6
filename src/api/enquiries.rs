use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{current_principal, require_staff};
use super::validation::{Violations, validate_preferred_date};
use super::{ApiError, ApiResponse, AppState, EnquiryDto};
use crate::db::NewEnquiry;

#[derive(Deserialize)]
pub struct EnquiryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
    pub preferred_date: Option<String>,
}

#[derive(Deserialize)]
pub struct ContactedRequest {
    pub is_contacted: bool,
}

/// POST /enquiries
/// Anonymous public submission; no account required. New enquiries always
/// start uncontacted.
pub async fn submit_enquiry(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EnquiryRequest>,
) -> Result<Json<ApiResponse<EnquiryDto>>, ApiError> {
    let mut violations = Violations::default();
    violations.require("name", &payload.name);
    violations.require_email("email", &payload.email);
    violations.require("phone", &payload.phone);
    violations.require("message", &payload.message);

    let mut preferred_date = None;
    if let Some(raw) = payload.preferred_date.as_deref()
        && !raw.trim().is_empty()
    {
        match validate_preferred_date(raw) {
            Some(date) => preferred_date = Some(date),
            None => violations.push("preferred_date", "Enter a valid date (YYYY-MM-DD)"),
        }
    }
    violations.into_result()?;

    let id = state
        .store
        .create_enquiry(NewEnquiry {
            name: payload.name.trim().to_string(),
            email: payload.email.trim().to_string(),
            phone: payload.phone.trim().to_string(),
            message: payload.message.trim().to_string(),
            preferred_date,
        })
        .await
        .map_err(|e| ApiError::internal(format!("Failed to save enquiry: {e}")))?;

    let stored = state
        .store
        .get_enquiry(id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load enquiry: {e}")))?
        .ok_or_else(|| ApiError::enquiry_not_found(id))?;

    Ok(Json(ApiResponse::success(EnquiryDto::from(stored))))
}

/// GET /manage/enquiries
/// Staff-only inbox, newest first.
pub async fn list_enquiries(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<EnquiryDto>>>, ApiError> {
    let principal = current_principal(&state, &session).await?;
    require_staff(&principal)?;

    let rows = state
        .store
        .list_enquiries()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to list enquiries: {e}")))?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(EnquiryDto::from).collect(),
    )))
}

/// PUT /enquiries/{id}/contacted
pub async fn set_contacted(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<ContactedRequest>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let principal = current_principal(&state, &session).await?;
    require_staff(&principal)?;

    let found = state
        .store
        .set_enquiry_contacted(id, payload.is_contacted)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to update enquiry: {e}")))?;

    if !found {
        return Err(ApiError::enquiry_not_found(id));
    }

    Ok(Json(ApiResponse::success(payload.is_contacted)))
}
