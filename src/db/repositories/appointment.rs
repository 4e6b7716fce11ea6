use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use tracing::info;

use crate::domain::{AppointmentStatus, VisibilityScope};
use crate::entities::{appointments, prelude::*};

/// Repository for appointment records. Every read takes a
/// [`VisibilityScope`] so ownership filtering happens in the query itself,
/// not in the caller.
pub struct AppointmentRepository {
    conn: DatabaseConnection,
}

#[derive(Debug, Clone)]
pub struct Appointment {
    pub id: i32,
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub tattoo_design: String,
    pub reference_image: Option<String>,
    pub appointment_date: String,
    pub created_at: String,
    pub status: AppointmentStatus,
    pub user_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub tattoo_design: String,
    pub reference_image: Option<String>,
    /// RFC 3339
    pub appointment_date: String,
    pub status: AppointmentStatus,
    pub user_id: Option<i32>,
}

/// Direct field overwrite used by the edit endpoint. Status and owner are
/// deliberately absent; they change only through their dedicated paths.
#[derive(Debug, Clone)]
pub struct AppointmentEdit {
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub tattoo_design: String,
    pub appointment_date: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatusCounts {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

impl AppointmentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Model Conversion Helpers
    // ========================================================================

    fn map_model(m: appointments::Model) -> Appointment {
        Appointment {
            id: m.id,
            client_name: m.client_name,
            email: m.email,
            phone: m.phone,
            tattoo_design: m.tattoo_design,
            reference_image: m.reference_image,
            appointment_date: m.appointment_date,
            created_at: m.created_at,
            // Stored values only ever come from AppointmentStatus::as_str
            status: m.status.parse().unwrap_or_default(),
            user_id: m.user_id,
        }
    }

    fn scoped(scope: VisibilityScope) -> Select<Appointments> {
        let select = Appointments::find();
        match scope {
            VisibilityScope::All => select,
            VisibilityScope::OwnedBy(user_id) => {
                select.filter(appointments::Column::UserId.eq(user_id))
            }
        }
    }

    // ========================================================================
    // Appointment Operations
    // ========================================================================

    pub async fn insert(&self, new: NewAppointment) -> Result<i32> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = appointments::ActiveModel {
            client_name: Set(new.client_name),
            email: Set(new.email),
            phone: Set(new.phone),
            tattoo_design: Set(new.tattoo_design),
            reference_image: Set(new.reference_image),
            appointment_date: Set(new.appointment_date),
            created_at: Set(now),
            status: Set(new.status.as_str().to_string()),
            user_id: Set(new.user_id),
            ..Default::default()
        };

        let res = Appointments::insert(active).exec(&self.conn).await?;
        info!("Created appointment {}", res.last_insert_id);
        Ok(res.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Appointment>> {
        let row = Appointments::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(Self::map_model))
    }

    /// All visible appointments, most recent session date first.
    pub async fn list(&self, scope: VisibilityScope) -> Result<Vec<Appointment>> {
        let rows = Self::scoped(scope)
            .order_by_desc(appointments::Column::AppointmentDate)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    /// Visible appointments created most recently.
    pub async fn list_recent(
        &self,
        scope: VisibilityScope,
        limit: Option<u64>,
    ) -> Result<Vec<Appointment>> {
        let rows = Self::scoped(scope)
            .order_by_desc(appointments::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    /// Visible appointments with a session date at or after `now`, soonest
    /// first. `now` is an RFC 3339 string; lexicographic order matches
    /// chronological order for normalized timestamps.
    pub async fn list_upcoming(
        &self,
        scope: VisibilityScope,
        now: &str,
        limit: u64,
    ) -> Result<Vec<Appointment>> {
        let rows = Self::scoped(scope)
            .filter(appointments::Column::AppointmentDate.gte(now))
            .order_by_asc(appointments::Column::AppointmentDate)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    /// Per-status counts over the visible set. A client's totals count only
    /// their own rows.
    pub async fn counts(&self, scope: VisibilityScope) -> Result<StatusCounts> {
        let total = Self::scoped(scope).count(&self.conn).await?;

        let mut counts = StatusCounts {
            total,
            ..Default::default()
        };

        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Approved,
            AppointmentStatus::Rejected,
        ] {
            let n = Self::scoped(scope)
                .filter(appointments::Column::Status.eq(status.as_str()))
                .count(&self.conn)
                .await?;
            match status {
                AppointmentStatus::Pending => counts.pending = n,
                AppointmentStatus::Approved => counts.approved = n,
                AppointmentStatus::Rejected => counts.rejected = n,
            }
        }

        Ok(counts)
    }

    /// Persist a status transition and return the prior status, or `None`
    /// if the record does not exist. Last write wins; there is no version
    /// token guarding concurrent staff updates.
    pub async fn set_status(
        &self,
        id: i32,
        status: AppointmentStatus,
    ) -> Result<Option<AppointmentStatus>> {
        let Some(row) = Appointments::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let prior = row.status.parse().unwrap_or_default();

        let mut active: appointments::ActiveModel = row.into();
        active.status = Set(status.as_str().to_string());
        active.update(&self.conn).await?;

        info!("Appointment {} status: {} -> {}", id, prior, status);
        Ok(Some(prior))
    }

    /// Unconditional status write over an id set. Returns the number of
    /// rows mutated.
    pub async fn set_status_bulk(&self, ids: &[i32], status: AppointmentStatus) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Appointments::update_many()
            .col_expr(
                appointments::Column::Status,
                sea_orm::sea_query::Expr::value(status.as_str()),
            )
            .filter(appointments::Column::Id.is_in(ids.to_vec()))
            .exec(&self.conn)
            .await?;

        info!("Bulk status {} applied to {} rows", status, result.rows_affected);
        Ok(result.rows_affected)
    }

    pub async fn update_fields(&self, id: i32, edit: AppointmentEdit) -> Result<bool> {
        let Some(row) = Appointments::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: appointments::ActiveModel = row.into();
        active.client_name = Set(edit.client_name);
        active.email = Set(edit.email);
        active.phone = Set(edit.phone);
        active.tattoo_design = Set(edit.tattoo_design);
        active.appointment_date = Set(edit.appointment_date);
        active.update(&self.conn).await?;

        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Appointments::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
