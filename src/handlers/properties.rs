use axum::{Json, extract::State};
use serde::Serialize;

use crate::db::{DbProperty, DbVibes};
use crate::error::HomeMatchError;
use crate::middleware::{ApiPath, ApiQuery, AuthUser};
use crate::router::HomeMatchState;
use crate::types::FeedQuery;
use crate::types::filters::resolve_limit;

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub properties: Vec<DbProperty>,
}

/// GET /api/properties: the swipe deck. Listings the caller already decided
/// on are left out.
pub async fn feed(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<FeedQuery>,
) -> Result<Json<FeedResponse>, HomeMatchError> {
    let (filters, limit) = query.into_parts();
    filters.validate()?;
    let limit = resolve_limit(limit, state.config.feed_page_size)?;
    let properties = state
        .storage
        .property_feed(&filters, Some(&user.id), limit)
        .await?;
    Ok(Json(FeedResponse { properties }))
}

pub async fn get_property(
    State(state): State<HomeMatchState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<DbProperty>, HomeMatchError> {
    Ok(Json(state.storage.get_property(&id).await?))
}

pub async fn get_vibes(
    State(state): State<HomeMatchState>,
    _user: AuthUser,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<DbVibes>, HomeMatchError> {
    if !state.storage.property_exists(&id).await? {
        return Err(HomeMatchError::NotFound("property"));
    }
    Ok(Json(state.storage.get_vibes(&id).await?))
}
