use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use time;

use crate::config::Config;
use crate::db::Store;
use crate::services::AppointmentService;

mod appointments;
pub mod auth;
mod enquiries;
mod error;
mod landing;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;
pub use validation::FieldViolation;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,

    pub config: Config,

    pub appointments: AppointmentService,
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let appointments = AppointmentService::new(store.clone());

    Ok(Arc::new(AppState {
        store,
        config,
        appointments,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let uploads_path = state.config.general.uploads_path.clone();
    let cors_origins = state.config.server.cors_allowed_origins.clone();
    let secure_cookies = state.config.server.secure_cookies;
    let session_minutes = state.config.server.session_minutes;

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/landing", get(landing::get_landing))
        .route("/enquiries", post(enquiries::submit_enquiry))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(uploads_path),
        )
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::get_current_user))
        .route("/dashboard", get(appointments::get_dashboard))
        .route("/appointments", get(appointments::list_appointments))
        .route("/appointments", post(appointments::create_appointment))
        .route("/appointments/{id}", put(appointments::update_appointment))
        .route(
            "/appointments/{id}",
            delete(appointments::delete_appointment),
        )
        .route("/appointments/{id}/status", put(appointments::set_status))
        .route(
            "/manage/appointments",
            get(appointments::manage_appointments),
        )
        .route(
            "/manage/appointments/status",
            post(appointments::set_status_bulk),
        )
        .route(
            "/manage/appointments/export",
            get(appointments::export_appointments),
        )
        .route("/manage/enquiries", get(enquiries::list_enquiries))
        .route("/enquiries/{id}/contacted", put(enquiries::set_contacted))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
