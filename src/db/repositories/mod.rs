pub mod appointment;
pub mod catalog;
pub mod enquiry;
pub mod user;
