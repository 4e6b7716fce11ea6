pub mod appointments;

pub use appointments::{AppointmentError, AppointmentService, DashboardData, StatusChange};
