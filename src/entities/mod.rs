pub mod prelude;

pub mod appointments;
pub mod artists;
pub mod enquiries;
pub mod reviews;
pub mod studios;
pub mod tattoo_styles;
pub mod users;
