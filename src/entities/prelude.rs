pub use super::appointments::Entity as Appointments;
pub use super::artists::Entity as Artists;
pub use super::enquiries::Entity as Enquiries;
pub use super::reviews::Entity as Reviews;
pub use super::studios::Entity as Studios;
pub use super::tattoo_styles::Entity as TattooStyles;
pub use super::users::Entity as Users;
