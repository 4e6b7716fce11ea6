use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set,
};
use tracing::info;

use crate::entities::{enquiries, prelude::*};

pub struct EnquiryRepository {
    conn: DatabaseConnection,
}

#[derive(Debug, Clone)]
pub struct Enquiry {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub preferred_date: Option<String>,
    pub created_at: String,
    pub is_contacted: bool,
}

#[derive(Debug, Clone)]
pub struct NewEnquiry {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub preferred_date: Option<String>,
}

impl EnquiryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: enquiries::Model) -> Enquiry {
        Enquiry {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            message: m.message,
            preferred_date: m.preferred_date,
            created_at: m.created_at,
            is_contacted: m.is_contacted,
        }
    }

    /// New enquiries always start uncontacted.
    pub async fn insert(&self, new: NewEnquiry) -> Result<i32> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = enquiries::ActiveModel {
            name: Set(new.name),
            email: Set(new.email),
            phone: Set(new.phone),
            message: Set(new.message),
            preferred_date: Set(new.preferred_date),
            created_at: Set(now),
            is_contacted: Set(false),
            ..Default::default()
        };

        let res = Enquiries::insert(active).exec(&self.conn).await?;
        info!("Received enquiry {}", res.last_insert_id);
        Ok(res.last_insert_id)
    }

    pub async fn get(&self, id: i32) -> Result<Option<Enquiry>> {
        let row = Enquiries::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(Self::map_model))
    }

    pub async fn list(&self) -> Result<Vec<Enquiry>> {
        let rows = Enquiries::find()
            .order_by_desc(enquiries::Column::CreatedAt)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn set_contacted(&self, id: i32, contacted: bool) -> Result<bool> {
        let Some(row) = Enquiries::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: enquiries::ActiveModel = row.into();
        active.is_contacted = Set(contacted);
        active.update(&self.conn).await?;

        Ok(true)
    }
}
