use axum::{Json, extract::State};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, ArtistDto, LandingResponse, ReviewDto, StudioDto, StyleDto,
};

// How much of each catalog section the landing page shows
const STYLE_LIMIT: u64 = 4;
const ARTIST_LIMIT: u64 = 8;
const STUDIO_LIMIT: u64 = 2;
const REVIEW_LIMIT: u64 = 4;

/// GET /landing
/// Public catalog subsets for the landing page. Only rows passing their
/// visibility gates (active, or approved and featured) ever appear.
pub async fn get_landing(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<LandingResponse>>, ApiError> {
    let styles = state
        .store
        .active_styles(STYLE_LIMIT)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load styles: {e}")))?;
    let artists = state
        .store
        .active_artists(ARTIST_LIMIT)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load artists: {e}")))?;
    let studios = state
        .store
        .active_studios(STUDIO_LIMIT)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load studios: {e}")))?;
    let reviews = state
        .store
        .featured_reviews(REVIEW_LIMIT)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load reviews: {e}")))?;

    Ok(Json(ApiResponse::success(LandingResponse {
        site_title: state.config.studio.site_title.clone(),
        styles: styles.into_iter().map(StyleDto::from).collect(),
        artists: artists.into_iter().map(ArtistDto::from).collect(),
        studios: studios.into_iter().map(StudioDto::from).collect(),
        reviews: reviews.into_iter().map(ReviewDto::from).collect(),
    })))
}
