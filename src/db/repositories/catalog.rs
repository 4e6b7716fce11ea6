use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{artists, prelude::*, reviews, studios, tattoo_styles};

/// Read-mostly catalog content shown on the public landing page. Only rows
/// passing their visibility gate (active / approved+featured) are ever
/// returned to anonymous visitors.
pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn active_styles(&self, limit: u64) -> Result<Vec<tattoo_styles::Model>> {
        let rows = TattooStyles::find()
            .filter(tattoo_styles::Column::IsActive.eq(true))
            .order_by_asc(tattoo_styles::Column::SortOrder)
            .order_by_asc(tattoo_styles::Column::Name)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn active_artists(&self, limit: u64) -> Result<Vec<artists::Model>> {
        let rows = Artists::find()
            .filter(artists::Column::IsActive.eq(true))
            .order_by_asc(artists::Column::SortOrder)
            .order_by_asc(artists::Column::Name)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn active_studios(&self, limit: u64) -> Result<Vec<studios::Model>> {
        let rows = Studios::find()
            .filter(studios::Column::IsActive.eq(true))
            .order_by_asc(studios::Column::SortOrder)
            .order_by_asc(studios::Column::Name)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    /// Reviews must be both approved and featured to appear publicly.
    pub async fn featured_reviews(&self, limit: u64) -> Result<Vec<reviews::Model>> {
        let rows = Reviews::find()
            .filter(reviews::Column::IsApproved.eq(true))
            .filter(reviews::Column::IsFeatured.eq(true))
            .order_by_desc(reviews::Column::ReviewDate)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }
}
