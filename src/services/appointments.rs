//! Domain service for the appointment lifecycle.
//!
//! Wraps the repository with the access policy and the status state
//! machine: every read is scoped to what the principal may see, and every
//! mutation checks the actor before touching the store. Handlers validate
//! request payloads first and hand this service normalized input.

use thiserror::Error;

use crate::db::{Appointment, AppointmentEdit, NewAppointment, StatusCounts, Store};
use crate::domain::{AppointmentStatus, Principal, policy};

/// Errors specific to appointment operations.
#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    #[error("Appointment not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for AppointmentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Outcome of a status transition, carrying the prior value so callers can
/// describe the change (e.g. in a user-facing message).
#[derive(Debug, Clone, Copy)]
pub struct StatusChange {
    pub prior: AppointmentStatus,
    pub new: AppointmentStatus,
}

/// Data backing the post-login dashboard, all scoped to the principal.
#[derive(Debug)]
pub struct DashboardData {
    pub upcoming: Vec<Appointment>,
    pub recent: Vec<Appointment>,
    pub stats: StatusCounts,
    pub next_session: Option<String>,
}

const UPCOMING_LIMIT: u64 = 5;
const RECENT_LIMIT: u64 = 4;

#[derive(Clone)]
pub struct AppointmentService {
    store: Store,
}

impl AppointmentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Appointments the principal may observe, most recent session first.
    pub async fn visible(&self, principal: &Principal) -> Result<Vec<Appointment>, AppointmentError> {
        let scope = policy::visible_appointments(principal);
        Ok(self.store.list_appointments(scope).await?)
    }

    /// Dashboard aggregates over the visible set only; a client's totals
    /// never include another client's rows.
    pub async fn dashboard(&self, principal: &Principal) -> Result<DashboardData, AppointmentError> {
        let scope = policy::visible_appointments(principal);
        let now = chrono::Utc::now().to_rfc3339();

        let upcoming = self
            .store
            .upcoming_appointments(scope, &now, UPCOMING_LIMIT)
            .await?;
        let recent = self
            .store
            .recent_appointments(scope, Some(RECENT_LIMIT))
            .await?;
        let stats = self.store.appointment_counts(scope).await?;
        let next_session = upcoming.first().map(|a| a.appointment_date.clone());

        Ok(DashboardData {
            upcoming,
            recent,
            stats,
            next_session,
        })
    }

    /// Book an appointment for a client. Status and owner are forced here
    /// regardless of anything the caller supplied: a new booking is always
    /// `pending` and always owned by the requester.
    pub async fn book(
        &self,
        principal: &Principal,
        mut new: NewAppointment,
    ) -> Result<i32, AppointmentError> {
        if !policy::can_create_appointment(principal) {
            return Err(AppointmentError::Forbidden(
                "Staff manage appointments directly and do not book through the client path",
            ));
        }

        new.status = AppointmentStatus::Pending;
        new.user_id = Some(principal.id);

        Ok(self.store.create_appointment(new).await?)
    }

    /// Staff-only transition. Returns the prior and new status. A rejected
    /// actor causes no mutation.
    pub async fn set_status(
        &self,
        id: i32,
        new_status: AppointmentStatus,
        actor: &Principal,
    ) -> Result<StatusChange, AppointmentError> {
        if !policy::can_transition_status(actor) {
            return Err(AppointmentError::Forbidden(
                "Only staff may change appointment status",
            ));
        }

        let prior = self
            .store
            .set_appointment_status(id, new_status)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        Ok(StatusChange {
            prior,
            new: new_status,
        })
    }

    /// Bulk variant: the actor check runs once up front, then the write is
    /// unconditional per record, so partial failure is not possible.
    pub async fn set_status_bulk(
        &self,
        ids: &[i32],
        new_status: AppointmentStatus,
        actor: &Principal,
    ) -> Result<u64, AppointmentError> {
        if !policy::can_transition_status(actor) {
            return Err(AppointmentError::Forbidden(
                "Only staff may change appointment status",
            ));
        }

        Ok(self.store.set_appointment_status_bulk(ids, new_status).await?)
    }

    /// Full management listing, newest booking first. Staff only.
    pub async fn manage_list(&self, actor: &Principal) -> Result<Vec<Appointment>, AppointmentError> {
        if !actor.is_staff {
            return Err(AppointmentError::Forbidden(
                "Only staff may access the management view",
            ));
        }

        Ok(self
            .store
            .recent_appointments(policy::VisibilityScope::All, None)
            .await?)
    }

    /// Rows for the staff CSV export, newest booking first.
    pub async fn export_rows(&self, actor: &Principal) -> Result<Vec<Appointment>, AppointmentError> {
        self.manage_list(actor).await
    }

    /// Direct field overwrite. Any authenticated user holding a valid id
    /// may edit; there is no owner-or-staff restriction on this path.
    pub async fn edit(&self, id: i32, edit: AppointmentEdit) -> Result<(), AppointmentError> {
        if self.store.update_appointment(id, edit).await? {
            Ok(())
        } else {
            Err(AppointmentError::NotFound)
        }
    }

    /// Irreversible delete. Same access note as [`Self::edit`].
    pub async fn delete(&self, id: i32) -> Result<(), AppointmentError> {
        if self.store.delete_appointment(id).await? {
            Ok(())
        } else {
            Err(AppointmentError::NotFound)
        }
    }
}
