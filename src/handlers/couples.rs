use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::db::{ActivityRow, DbProperty, PropertySummary};
use crate::error::HomeMatchError;
use crate::middleware::{ApiJson, ApiQuery, AuthUser};
use crate::router::HomeMatchState;
use crate::service::disputes::{DisputedProperty, find_disputes};
use crate::service::mutual::{MutualLike, find_mutual_likes};
use crate::types::{InteractionType, Page, Resolution};

async fn properties_by_id(
    state: &HomeMatchState,
    ids: impl Iterator<Item = String>,
) -> Result<HashMap<String, DbProperty>, HomeMatchError> {
    let ids: Vec<String> = ids.collect();
    Ok(state
        .storage
        .get_properties(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutualLikesResponse {
    pub mutual_likes: Vec<MutualLike>,
}

pub async fn mutual_likes(
    State(state): State<HomeMatchState>,
    user: AuthUser,
) -> Result<Json<MutualLikesResponse>, HomeMatchError> {
    let Some(household_id) = state.storage.household_id_of(&user.id).await? else {
        return Ok(Json(MutualLikesResponse {
            mutual_likes: Vec::new(),
        }));
    };

    let rows = state.storage.household_decisions(&household_id, None).await?;
    let mut mutual_likes = find_mutual_likes(&rows);
    let mut properties =
        properties_by_id(&state, mutual_likes.iter().map(|m| m.property_id.clone())).await?;
    for m in &mut mutual_likes {
        m.property = properties.remove(&m.property_id);
    }
    Ok(Json(MutualLikesResponse { mutual_likes }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub id: i64,
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    pub created_at: DateTime<Utc>,
    pub actor: Actor,
    pub property: PropertySummary,
}

impl From<ActivityRow> for ActivityItem {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: row.id,
            interaction_type: row.interaction_type,
            created_at: row.created_at,
            actor: Actor {
                user_id: row.user_id,
                display_name: row.display_name,
                avatar_url: row.avatar_url,
            },
            property: PropertySummary {
                id: row.property_id,
                address: row.address,
                city: row.city,
                price: row.price,
                image: row.images.0.into_iter().next(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub activity: Vec<ActivityItem>,
}

pub async fn activity(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<ActivityResponse>, HomeMatchError> {
    let (limit, offset) = page.resolve(state.config.feed_page_size)?;
    let Some(household_id) = state.storage.household_id_of(&user.id).await? else {
        return Ok(Json(ActivityResponse {
            activity: Vec::new(),
        }));
    };
    let rows = state
        .storage
        .household_activity(&household_id, limit, offset)
        .await?;
    Ok(Json(ActivityResponse {
        activity: rows.into_iter().map(ActivityItem::from).collect(),
    }))
}

#[derive(Debug, Serialize)]
pub struct DisputedResponse {
    pub disputes: Vec<DisputedProperty>,
}

pub async fn disputed(
    State(state): State<HomeMatchState>,
    user: AuthUser,
) -> Result<Json<DisputedResponse>, HomeMatchError> {
    let Some(household_id) = state.storage.household_id_of(&user.id).await? else {
        return Ok(Json(DisputedResponse {
            disputes: Vec::new(),
        }));
    };

    let rows = state.storage.household_decisions(&household_id, None).await?;
    let resolved: HashSet<String> = state
        .storage
        .resolved_property_ids(&household_id)
        .await?
        .into_iter()
        .collect();
    let mut disputes = find_disputes(&rows, &resolved);
    let mut properties =
        properties_by_id(&state, disputes.iter().map(|d| d.property_id.clone())).await?;
    for d in &mut disputes {
        d.property = properties.remove(&d.property_id);
    }
    Ok(Json(DisputedResponse { disputes }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveDispute {
    pub property_id: Option<String>,
    pub resolution: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub property_id: String,
    pub resolution: Resolution,
    pub resolved_by: String,
    pub resolved_at: DateTime<Utc>,
}

pub async fn resolve_dispute(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    ApiJson(req): ApiJson<ResolveDispute>,
) -> Result<Json<ResolveResponse>, HomeMatchError> {
    let household_id = state
        .storage
        .household_id_of(&user.id)
        .await?
        .ok_or_else(|| HomeMatchError::validation("user is not in a household"))?;
    let property_id = req
        .property_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| HomeMatchError::validation("propertyId is required"))?;
    let resolution: Resolution = req
        .resolution
        .as_deref()
        .ok_or_else(|| HomeMatchError::validation("resolution is required"))?
        .parse()?;
    if !state.storage.property_exists(property_id).await? {
        return Err(HomeMatchError::NotFound("property"));
    }

    let record = state
        .storage
        .upsert_resolution(&household_id, property_id, resolution, &user.id)
        .await?;
    info!(household_id = %household_id, property_id, ?resolution, "dispute resolved");
    Ok(Json(ResolveResponse {
        property_id: record.property_id,
        resolution: record.resolution,
        resolved_by: record.resolved_by,
        resolved_at: record.resolved_at,
    }))
}
