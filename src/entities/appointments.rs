use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub client_name: String,

    pub email: String,

    pub phone: String,

    pub tattoo_design: String,

    /// Optional path or URL to an uploaded reference image
    pub reference_image: Option<String>,

    /// RFC 3339 date-time of the session
    pub appointment_date: String,

    pub created_at: String,

    /// One of "pending", "approved", "rejected"
    pub status: String,

    /// Owning user; set at creation, never reassigned
    pub user_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
