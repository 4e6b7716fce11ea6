use serde::Serialize;

use crate::db::{Appointment, Enquiry, StatusCounts, User};
use crate::entities::{artists, reviews, studios, tattoo_styles};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AppointmentDto {
    pub id: i32,
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub tattoo_design: String,
    pub reference_image: Option<String>,
    pub appointment_date: String,
    pub created_at: String,
    pub status: String,
    pub status_label: String,
    pub user_id: Option<i32>,
}

impl From<Appointment> for AppointmentDto {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            client_name: a.client_name,
            email: a.email,
            phone: a.phone,
            tattoo_design: a.tattoo_design,
            reference_image: a.reference_image,
            appointment_date: a.appointment_date,
            created_at: a.created_at,
            status: a.status.as_str().to_string(),
            status_label: a.status.label().to_string(),
            user_id: a.user_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsDto {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

impl From<StatusCounts> for StatsDto {
    fn from(c: StatusCounts) -> Self {
        Self {
            total: c.total,
            pending: c.pending,
            approved: c.approved,
            rejected: c.rejected,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: StatsDto,
    pub upcoming: Vec<AppointmentDto>,
    pub recent: Vec<AppointmentDto>,
    pub next_session: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnquiryDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub preferred_date: Option<String>,
    pub created_at: String,
    pub is_contacted: bool,
}

impl From<Enquiry> for EnquiryDto {
    fn from(e: Enquiry) -> Self {
        Self {
            id: e.id,
            name: e.name,
            email: e.email,
            phone: e.phone,
            message: e.message,
            preferred_date: e.preferred_date,
            created_at: e.created_at,
            is_contacted: e.is_contacted,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            is_staff: u.is_staff,
        }
    }
}

// ============================================================================
// Landing page catalog
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StyleDto {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}

impl From<tattoo_styles::Model> for StyleDto {
    fn from(m: tattoo_styles::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            image_url: m.image_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistDto {
    pub id: i32,
    pub name: String,
    pub role: String,
    pub bio: String,
    pub image_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub instagram: Option<String>,
}

impl From<artists::Model> for ArtistDto {
    fn from(m: artists::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            role: m.role,
            bio: m.bio,
            image_url: m.image_url,
            portfolio_url: m.portfolio_url,
            instagram: m.instagram,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StudioDto {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub country: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

impl From<studios::Model> for StudioDto {
    fn from(m: studios::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            city: m.city,
            country: m.country,
            address: m.address,
            phone: m.phone,
            email: m.email,
            image_url: m.image_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewDto {
    pub id: i32,
    pub client_name: String,
    pub rating: i32,
    pub review_text: String,
    pub review_date: String,
    pub image_url: Option<String>,
}

impl From<reviews::Model> for ReviewDto {
    fn from(m: reviews::Model) -> Self {
        Self {
            id: m.id,
            client_name: m.client_name,
            rating: m.rating,
            review_text: m.review_text,
            review_date: m.review_date,
            image_url: m.image_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LandingResponse {
    pub site_title: String,
    pub styles: Vec<StyleDto>,
    pub artists: Vec<ArtistDto>,
    pub studios: Vec<StudioDto>,
    pub reviews: Vec<ReviewDto>,
}
