use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::current_principal;
use super::validation::{Violations, normalize_session_date};
use super::{
    ApiError, ApiResponse, AppState, AppointmentDto, DashboardResponse, MessageResponse, StatsDto,
};
use crate::db::{AppointmentEdit, NewAppointment};
use crate::domain::AppointmentStatus;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub tattoo_design: String,
    pub reference_image: Option<String>,
    #[serde(default)]
    pub appointment_date: String,
}

#[derive(Deserialize)]
pub struct EditRequest {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub tattoo_design: String,
    #[serde(default)]
    pub appointment_date: String,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct BulkStatusRequest {
    pub ids: Vec<i32>,
    pub status: String,
}

#[derive(Serialize)]
pub struct StatusChangeResponse {
    pub id: i32,
    pub prior_status: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct BulkStatusResponse {
    pub status: String,
    pub updated: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /dashboard
/// Stats and activity for the logged-in account, scoped to what it may see.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<DashboardResponse>>, ApiError> {
    let principal = current_principal(&state, &session).await?;
    let data = state.appointments.dashboard(&principal).await?;

    Ok(Json(ApiResponse::success(DashboardResponse {
        stats: StatsDto::from(data.stats),
        upcoming: data.upcoming.into_iter().map(AppointmentDto::from).collect(),
        recent: data.recent.into_iter().map(AppointmentDto::from).collect(),
        next_session: data.next_session,
    })))
}

/// GET /appointments
/// Appointments visible to the logged-in account, most recent session first.
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<AppointmentDto>>>, ApiError> {
    let principal = current_principal(&state, &session).await?;
    let rows = state.appointments.visible(&principal).await?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(AppointmentDto::from).collect(),
    )))
}

/// POST /appointments
/// Book a session. The stored record is always `pending` and always owned
/// by the requester, whatever the payload claims.
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<BookingRequest>,
) -> Result<Json<ApiResponse<AppointmentDto>>, ApiError> {
    let principal = current_principal(&state, &session).await?;

    let offset = state.config.studio.offset()?;
    let mut violations = Violations::default();
    violations.require("client_name", &payload.client_name);
    violations.require_email("email", &payload.email);
    violations.require("phone", &payload.phone);
    violations.require("tattoo_design", &payload.tattoo_design);

    let mut appointment_date = None;
    if violations.require("appointment_date", &payload.appointment_date) {
        match normalize_session_date(&payload.appointment_date, offset) {
            Some(normalized) => {
                if normalized < chrono::Utc::now() {
                    violations.push("appointment_date", "Session date cannot be in the past");
                } else {
                    appointment_date = Some(normalized.to_rfc3339());
                }
            }
            None => violations.push(
                "appointment_date",
                "Enter a valid date and time (YYYY-MM-DDTHH:MM)",
            ),
        }
    }
    violations.into_result()?;

    let id = state
        .appointments
        .book(
            &principal,
            NewAppointment {
                client_name: payload.client_name.trim().to_string(),
                email: payload.email.trim().to_string(),
                phone: payload.phone.trim().to_string(),
                tattoo_design: payload.tattoo_design.trim().to_string(),
                reference_image: payload.reference_image,
                // Always present when validation passed
                appointment_date: appointment_date.unwrap_or_default(),
                status: AppointmentStatus::Pending,
                user_id: None,
            },
        )
        .await?;

    let stored = state
        .store
        .get_appointment(id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load appointment: {e}")))?
        .ok_or_else(|| ApiError::appointment_not_found(id))?;

    Ok(Json(ApiResponse::success(AppointmentDto::from(stored))))
}

/// GET /manage/appointments
/// Full listing for staff, newest booking first.
pub async fn manage_appointments(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<AppointmentDto>>>, ApiError> {
    let principal = current_principal(&state, &session).await?;
    let rows = state.appointments.manage_list(&principal).await?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(AppointmentDto::from).collect(),
    )))
}

/// PUT /appointments/{id}/status
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<ApiResponse<StatusChangeResponse>>, ApiError> {
    let principal = current_principal(&state, &session).await?;
    let status = parse_status(&payload.status)?;

    let change = state.appointments.set_status(id, status, &principal).await?;

    Ok(Json(ApiResponse::success(StatusChangeResponse {
        id,
        prior_status: change.prior.as_str().to_string(),
        status: change.new.as_str().to_string(),
    })))
}

/// POST /manage/appointments/status
/// Bulk transition over an id set. Ids that match no record are skipped;
/// the count reflects rows actually written.
pub async fn set_status_bulk(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<BulkStatusRequest>,
) -> Result<Json<ApiResponse<BulkStatusResponse>>, ApiError> {
    let principal = current_principal(&state, &session).await?;
    let status = parse_status(&payload.status)?;

    let updated = state
        .appointments
        .set_status_bulk(&payload.ids, status, &principal)
        .await?;

    Ok(Json(ApiResponse::success(BulkStatusResponse {
        status: status.as_str().to_string(),
        updated,
    })))
}

/// GET /manage/appointments/export
/// CSV download of every appointment record, for staff.
pub async fn export_appointments(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<axum::response::Response, ApiError> {
    let principal = current_principal(&state, &session).await?;
    let rows = state.appointments.export_rows(&principal).await?;

    let mut csv = String::from(
        "Client Name,Email,Phone,Tattoo Design,Appointment Date,Status,Created At\n",
    );
    for row in rows {
        let _ = writeln!(
            csv,
            "\"{}\",{},{},\"{}\",{},{},{}",
            row.client_name.replace('"', "\"\""),
            row.email,
            row.phone,
            row.tattoo_design.replace('"', "\"\""),
            row.appointment_date,
            row.status.label(),
            row.created_at
        );
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"appointments.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// PUT /appointments/{id}
/// Overwrite the editable fields. Status and owner never change here.
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<EditRequest>,
) -> Result<Json<ApiResponse<AppointmentDto>>, ApiError> {
    let _principal = current_principal(&state, &session).await?;

    let offset = state.config.studio.offset()?;
    let mut violations = Violations::default();
    violations.require("client_name", &payload.client_name);
    violations.require_email("email", &payload.email);
    violations.require("phone", &payload.phone);
    violations.require("tattoo_design", &payload.tattoo_design);

    let mut appointment_date = None;
    if violations.require("appointment_date", &payload.appointment_date) {
        match normalize_session_date(&payload.appointment_date, offset) {
            Some(normalized) => appointment_date = Some(normalized.to_rfc3339()),
            None => violations.push(
                "appointment_date",
                "Enter a valid date and time (YYYY-MM-DDTHH:MM)",
            ),
        }
    }
    violations.into_result()?;

    state
        .appointments
        .edit(
            id,
            AppointmentEdit {
                client_name: payload.client_name.trim().to_string(),
                email: payload.email.trim().to_string(),
                phone: payload.phone.trim().to_string(),
                tattoo_design: payload.tattoo_design.trim().to_string(),
                appointment_date: appointment_date.unwrap_or_default(),
            },
        )
        .await?;

    let stored = state
        .store
        .get_appointment(id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load appointment: {e}")))?
        .ok_or_else(|| ApiError::appointment_not_found(id))?;

    Ok(Json(ApiResponse::success(AppointmentDto::from(stored))))
}

/// DELETE /appointments/{id}
pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let _principal = current_principal(&state, &session).await?;

    state.appointments.delete(id).await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Appointment {} deleted", id),
    })))
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_status(raw: &str) -> Result<AppointmentStatus, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::validation(
            "status",
            format!("Unknown status '{}': expected pending, approved, or rejected", raw),
        )
    })
}
