use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::validation::Violations;
use super::{ApiError, ApiResponse, AppState, MessageResponse, UserDto};
use crate::db::NewUser;
use crate::domain::{Principal, policy};

const SESSION_USER_KEY: &str = "user_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
}

/// `next_page` tells the frontend where this account lands after login:
/// staff go to the management view, clients to their personal dashboard.
#[derive(Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub is_staff: bool,
    pub next_page: &'static str,
}

// ============================================================================
// Middleware
// ============================================================================

/// Session-cookie authentication. Requests without a logged-in session are
/// rejected before reaching any protected handler.
pub async fn auth_middleware(
    State(_state): State<Arc<AppState>>,
    session: Session,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Ok(Some(user_id)) = session.get::<i32>(SESSION_USER_KEY).await {
        tracing::Span::current().record("user_id", user_id);
        return Ok(next.run(request).await);
    }

    Err(ApiError::Unauthorized("Not authenticated".to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create a client account and log it in. Accounts created here are never
/// staff.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let mut violations = Violations::default();
    violations.require("username", &payload.username);
    violations.require_email("email", &payload.email);
    if payload.password.len() < 8 {
        violations.push("password", "Password must be at least 8 characters");
    }
    violations.into_result()?;

    let username = payload.username.trim().to_string();

    if state
        .store
        .get_user_by_username(&username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to check username: {e}")))?
        .is_some()
    {
        return Err(ApiError::validation(
            "username",
            "This username is already taken",
        ));
    }

    let user = state
        .store
        .create_user(NewUser {
            username,
            password: payload.password,
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            email: payload.email.trim().to_string(),
        })
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create account: {e}")))?;

    tracing::info!("Registered account: {}", user.username);

    session
        .insert(SESSION_USER_KEY, user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    let principal = Principal::from(user);
    Ok(Json(ApiResponse::success(LoginResponse {
        next_page: policy::default_next_page(&principal),
        is_staff: principal.is_staff,
        username: principal.username,
    })))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let mut violations = Violations::default();
    violations.require("username", &payload.username);
    violations.require("password", &payload.password);
    violations.into_result()?;

    let is_valid = state
        .store
        .verify_user_password(&payload.username, &payload.password)
        .await
        .map_err(|e| ApiError::internal(format!("Authentication error: {e}")))?;

    if !is_valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let user = state
        .store
        .get_user_by_username(&payload.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    session
        .insert(SESSION_USER_KEY, user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    let principal = Principal::from(user);
    Ok(Json(ApiResponse::success(LoginResponse {
        next_page: policy::default_next_page(&principal),
        is_staff: principal.is_staff,
        username: principal.username,
    })))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Json<ApiResponse<MessageResponse>> {
    let _ = session.flush().await;
    Json(ApiResponse::success(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let principal = current_principal(&state, &session).await?;

    let user = state
        .store
        .get_user_by_id(principal.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

// ============================================================================
// Helpers
// ============================================================================

/// Resolve the session to a [`Principal`]. The middleware guarantees a
/// session key is present on protected routes; the account lookup still
/// runs so a deleted account cannot keep acting through a stale cookie.
pub async fn current_principal(
    state: &AppState,
    session: &Session,
) -> Result<Principal, ApiError> {
    let user_id = session
        .get::<i32>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    let user = state
        .store
        .get_user_by_id(user_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to get user: {e}")))?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Principal::from(user))
}

pub fn require_staff(principal: &Principal) -> Result<(), ApiError> {
    if principal.is_staff {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Staff access is required for this operation".to_string(),
        ))
    }
}
