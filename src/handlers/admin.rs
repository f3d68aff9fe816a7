use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::{DbVibes, PropertyInput, VibesInput};
use crate::error::HomeMatchError;
use crate::middleware::{ApiJson, ApiPath, RequireServiceKey};
use crate::router::HomeMatchState;

#[derive(Debug, Deserialize)]
pub struct UpsertProperties {
    #[serde(default)]
    pub properties: Vec<PropertyInput>,
}

#[derive(Debug, Serialize)]
pub struct UpsertResponse {
    pub ids: Vec<String>,
}

/// PUT /api/admin/properties
pub async fn upsert_properties(
    State(state): State<HomeMatchState>,
    _key: RequireServiceKey,
    ApiJson(req): ApiJson<UpsertProperties>,
) -> Result<Json<UpsertResponse>, HomeMatchError> {
    for (i, p) in req.properties.iter().enumerate() {
        p.validate().map_err(|e| match e {
            HomeMatchError::Validation(msg) => {
                HomeMatchError::validation(format!("properties[{i}]: {msg}"))
            }
            other => other,
        })?;
        if let Some(nid) = p.neighborhood_id.as_deref()
            && !state.storage.neighborhood_exists(nid).await?
        {
            return Err(HomeMatchError::validation(format!(
                "properties[{i}]: unknown neighborhoodId `{nid}`"
            )));
        }
    }
    let ids = state.storage.upsert_properties(req.properties).await?;
    info!(count = ids.len(), "properties upserted");
    Ok(Json(UpsertResponse { ids }))
}

/// PUT /api/admin/properties/{id}/vibes
pub async fn upsert_vibes(
    State(state): State<HomeMatchState>,
    _key: RequireServiceKey,
    ApiPath(id): ApiPath<String>,
    ApiJson(vibes): ApiJson<VibesInput>,
) -> Result<Json<DbVibes>, HomeMatchError> {
    if !state.storage.property_exists(&id).await? {
        return Err(HomeMatchError::NotFound("property"));
    }
    Ok(Json(state.storage.upsert_vibes(&id, vibes).await?))
}
