pub mod policy;
pub mod status;

pub use policy::{Principal, VisibilityScope};
pub use status::AppointmentStatus;
