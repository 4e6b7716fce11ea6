use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "artists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// One of "owner", "manager", "resident", "guest", "apprentice"
    pub role: String,

    pub bio: String,

    pub image_url: Option<String>,

    pub portfolio_url: Option<String>,

    pub instagram: Option<String>,

    pub sort_order: i32,

    pub is_active: bool,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
