use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::db::{DbInteraction, DbProperty, InteractionSummary};
use crate::error::HomeMatchError;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::router::HomeMatchState;
use crate::service::mutual::{Partner, mutual_partners};
use crate::types::{InteractionType, Page};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInteraction {
    pub property_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub score_data: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutualLikeNotice {
    pub property_id: String,
    pub partners: Vec<Partner>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub interaction: DbInteraction,
    pub mutual_like: Option<MutualLikeNotice>,
}

/// POST /api/interactions. A like answers with the household partners who
/// already like the same property.
pub async fn record_interaction(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    ApiJson(req): ApiJson<RecordInteraction>,
) -> Result<(StatusCode, Json<RecordResponse>), HomeMatchError> {
    let property_id = req
        .property_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| HomeMatchError::validation("propertyId is required"))?;
    let kind: InteractionType = req
        .kind
        .as_deref()
        .ok_or_else(|| HomeMatchError::validation("type is required"))?
        .parse()?;

    if !state.storage.property_exists(property_id).await? {
        return Err(HomeMatchError::NotFound("property"));
    }

    let household_id = state.storage.household_id_of(&user.id).await?;
    let interaction = state
        .storage
        .record_interaction(
            &user.id,
            property_id,
            household_id.as_deref(),
            kind,
            req.score_data,
        )
        .await?;

    let mutual_like = match (kind, household_id.as_deref()) {
        (InteractionType::Like, Some(household_id)) => {
            let rows = state
                .storage
                .household_decisions(household_id, Some(property_id))
                .await?;
            let partners = mutual_partners(&rows, property_id, &user.id);
            if partners.is_empty() {
                None
            } else {
                info!(
                    user_id = %user.id,
                    property_id,
                    partners = partners.len(),
                    "mutual like"
                );
                Some(MutualLikeNotice {
                    property_id: property_id.to_string(),
                    partners,
                })
            }
        }
        _ => None,
    };

    Ok((
        StatusCode::CREATED,
        Json(RecordResponse {
            interaction,
            mutual_like,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct InteractionWithProperty {
    #[serde(flatten)]
    pub interaction: DbInteraction,
    pub property: Option<DbProperty>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub interactions: Vec<InteractionWithProperty>,
}

pub async fn list_interactions(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<ListResponse>, HomeMatchError> {
    let kind = query
        .kind
        .as_deref()
        .filter(|k| !k.is_empty())
        .map(str::parse::<InteractionType>)
        .transpose()?;
    let (limit, offset) = Page {
        limit: query.limit,
        offset: query.offset,
    }
    .resolve(state.config.feed_page_size)?;

    let rows = state
        .storage
        .list_user_interactions(&user.id, kind, limit, offset)
        .await?;
    let mut ids: Vec<String> = rows.iter().map(|r| r.property_id.clone()).collect();
    ids.sort();
    ids.dedup();
    let properties = state.storage.get_properties(&ids).await?;

    let interactions = rows
        .into_iter()
        .map(|interaction| {
            let property = properties
                .iter()
                .find(|p| p.id == interaction.property_id)
                .cloned();
            InteractionWithProperty {
                interaction,
                property,
            }
        })
        .collect();
    Ok(Json(ListResponse { interactions }))
}

pub async fn summary(
    State(state): State<HomeMatchState>,
    user: AuthUser,
) -> Result<Json<InteractionSummary>, HomeMatchError> {
    Ok(Json(state.storage.interaction_summary(&user.id).await?))
}

#[derive(Debug, Serialize)]
pub struct UndoResponse {
    pub deleted: u64,
}

pub async fn undo_interactions(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    ApiPath(property_id): ApiPath<String>,
) -> Result<Json<UndoResponse>, HomeMatchError> {
    let deleted = state
        .storage
        .delete_interactions(&user.id, &property_id)
        .await?;
    Ok(Json(UndoResponse { deleted }))
}
