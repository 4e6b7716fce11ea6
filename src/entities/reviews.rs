use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub client_name: String,

    /// 1 through 5
    pub rating: i32,

    pub review_text: String,

    /// Date of the review (YYYY-MM-DD)
    pub review_date: String,

    pub is_featured: bool,

    pub is_approved: bool,

    pub image_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
