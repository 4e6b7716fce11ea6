use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{AppointmentStatus, VisibilityScope};
use crate::entities::{artists, reviews, studios, tattoo_styles};

pub mod migrator;
pub mod repositories;

pub use repositories::appointment::{
    Appointment, AppointmentEdit, NewAppointment, StatusCounts,
};
pub use repositories::enquiry::{Enquiry, NewEnquiry};
pub use repositories::user::{NewUser, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") && !db_url.contains("memory") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn appointment_repo(&self) -> repositories::appointment::AppointmentRepository {
        repositories::appointment::AppointmentRepository::new(self.conn.clone())
    }

    fn enquiry_repo(&self) -> repositories::enquiry::EnquiryRepository {
        repositories::enquiry::EnquiryRepository::new(self.conn.clone())
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.user_repo().create(new_user).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    // ========================================================================
    // Appointments
    // ========================================================================

    pub async fn create_appointment(&self, new: NewAppointment) -> Result<i32> {
        self.appointment_repo().insert(new).await
    }

    pub async fn get_appointment(&self, id: i32) -> Result<Option<Appointment>> {
        self.appointment_repo().get(id).await
    }

    pub async fn list_appointments(&self, scope: VisibilityScope) -> Result<Vec<Appointment>> {
        self.appointment_repo().list(scope).await
    }

    pub async fn recent_appointments(
        &self,
        scope: VisibilityScope,
        limit: Option<u64>,
    ) -> Result<Vec<Appointment>> {
        self.appointment_repo().list_recent(scope, limit).await
    }

    pub async fn upcoming_appointments(
        &self,
        scope: VisibilityScope,
        now: &str,
        limit: u64,
    ) -> Result<Vec<Appointment>> {
        self.appointment_repo().list_upcoming(scope, now, limit).await
    }

    pub async fn appointment_counts(&self, scope: VisibilityScope) -> Result<StatusCounts> {
        self.appointment_repo().counts(scope).await
    }

    pub async fn set_appointment_status(
        &self,
        id: i32,
        status: AppointmentStatus,
    ) -> Result<Option<AppointmentStatus>> {
        self.appointment_repo().set_status(id, status).await
    }

    pub async fn set_appointment_status_bulk(
        &self,
        ids: &[i32],
        status: AppointmentStatus,
    ) -> Result<u64> {
        self.appointment_repo().set_status_bulk(ids, status).await
    }

    pub async fn update_appointment(&self, id: i32, edit: AppointmentEdit) -> Result<bool> {
        self.appointment_repo().update_fields(id, edit).await
    }

    pub async fn delete_appointment(&self, id: i32) -> Result<bool> {
        self.appointment_repo().delete(id).await
    }

    // ========================================================================
    // Enquiries
    // ========================================================================

    pub async fn create_enquiry(&self, new: NewEnquiry) -> Result<i32> {
        self.enquiry_repo().insert(new).await
    }

    pub async fn get_enquiry(&self, id: i32) -> Result<Option<Enquiry>> {
        self.enquiry_repo().get(id).await
    }

    pub async fn list_enquiries(&self) -> Result<Vec<Enquiry>> {
        self.enquiry_repo().list().await
    }

    pub async fn set_enquiry_contacted(&self, id: i32, contacted: bool) -> Result<bool> {
        self.enquiry_repo().set_contacted(id, contacted).await
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    pub async fn active_styles(&self, limit: u64) -> Result<Vec<tattoo_styles::Model>> {
        self.catalog_repo().active_styles(limit).await
    }

    pub async fn active_artists(&self, limit: u64) -> Result<Vec<artists::Model>> {
        self.catalog_repo().active_artists(limit).await
    }

    pub async fn active_studios(&self, limit: u64) -> Result<Vec<studios::Model>> {
        self.catalog_repo().active_studios(limit).await
    }

    pub async fn featured_reviews(&self, limit: u64) -> Result<Vec<reviews::Model>> {
        self.catalog_repo().featured_reviews(limit).await
    }
}
