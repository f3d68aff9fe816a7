use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::db::{DbProperty, DbSavedSearch, SavedSearchPatch};
use crate::error::HomeMatchError;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::router::HomeMatchState;
use crate::types::PropertyFilters;
use crate::types::filters::resolve_limit;

const MAX_NAME: usize = 120;

fn clean_name(name: &str) -> Result<String, HomeMatchError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(HomeMatchError::validation("name is required"));
    }
    if name.chars().count() > MAX_NAME {
        return Err(HomeMatchError::validation(format!(
            "name must be at most {MAX_NAME} characters"
        )));
    }
    Ok(name.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearchList {
    pub saved_searches: Vec<DbSavedSearch>,
}

pub async fn list_searches(
    State(state): State<HomeMatchState>,
    user: AuthUser,
) -> Result<Json<SavedSearchList>, HomeMatchError> {
    let saved_searches = state.storage.list_saved_searches(&user.id).await?;
    Ok(Json(SavedSearchList { saved_searches }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSearch {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub filters: PropertyFilters,
    pub notify_on_new_matches: Option<bool>,
}

pub async fn create_search(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateSearch>,
) -> Result<(StatusCode, Json<DbSavedSearch>), HomeMatchError> {
    let name = clean_name(&req.name)?;
    req.filters.validate()?;
    let household_id = state.storage.household_id_of(&user.id).await?;
    let search = state
        .storage
        .create_saved_search(
            &user.id,
            household_id.as_deref(),
            &name,
            req.filters,
            req.notify_on_new_matches.unwrap_or(true),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(search)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSearch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub notify_on_new_matches: Option<bool>,
}

pub async fn update_search(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateSearch>,
) -> Result<Json<DbSavedSearch>, HomeMatchError> {
    let patch = SavedSearchPatch {
        name: req.name.as_deref().map(clean_name).transpose()?,
        is_active: req.is_active,
        notify_on_new_matches: req.notify_on_new_matches,
    };
    Ok(Json(
        state.storage.update_saved_search(&user.id, &id, patch).await?,
    ))
}

pub async fn delete_search(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, HomeMatchError> {
    state.storage.delete_saved_search(&user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct MatchesQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MatchesResponse {
    pub properties: Vec<DbProperty>,
}

/// Run a saved search through the feed and mark it as viewed.
pub async fn search_matches(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<MatchesQuery>,
) -> Result<Json<MatchesResponse>, HomeMatchError> {
    let limit = resolve_limit(query.limit, state.config.feed_page_size)?;
    let search = state.storage.get_saved_search(&user.id, &id).await?;
    let properties = state
        .storage
        .property_feed(&search.filters.0, Some(&user.id), limit)
        .await?;
    state.storage.touch_saved_search(&search.id).await?;
    Ok(Json(MatchesResponse { properties }))
}
