use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::{DbHousehold, HouseholdMember};
use crate::error::HomeMatchError;
use crate::middleware::{ApiJson, AuthUser};
use crate::router::HomeMatchState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateHousehold {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinHousehold {
    pub invite_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HouseholdView {
    #[serde(flatten)]
    pub household: DbHousehold,
    pub members: Vec<HouseholdMember>,
}

pub async fn create_household(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    body: Option<ApiJson<CreateHousehold>>,
) -> Result<(StatusCode, Json<HouseholdView>), HomeMatchError> {
    let req = body.map(|ApiJson(req)| req).unwrap_or_default();
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let household = state.storage.create_household(&user.id, name).await?;
    info!(user_id = %user.id, household_id = %household.id, "household created");
    let members = state.storage.household_members(&household.id).await?;
    Ok((StatusCode::CREATED, Json(HouseholdView { household, members })))
}

pub async fn join_household(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    ApiJson(req): ApiJson<JoinHousehold>,
) -> Result<Json<HouseholdView>, HomeMatchError> {
    let code = req
        .invite_code
        .as_deref()
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| HomeMatchError::validation("inviteCode is required"))?;
    let household = state.storage.join_household(&user.id, &code).await?;
    info!(user_id = %user.id, household_id = %household.id, "joined household");
    let members = state.storage.household_members(&household.id).await?;
    Ok(Json(HouseholdView { household, members }))
}

pub async fn get_my_household(
    State(state): State<HomeMatchState>,
    user: AuthUser,
) -> Result<Json<HouseholdView>, HomeMatchError> {
    let household_id = state
        .storage
        .household_id_of(&user.id)
        .await?
        .ok_or(HomeMatchError::NotFound("household"))?;
    let household = state.storage.get_household(&household_id).await?;
    let members = state.storage.household_members(&household_id).await?;
    Ok(Json(HouseholdView { household, members }))
}

#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub left: bool,
}

pub async fn leave_household(
    State(state): State<HomeMatchState>,
    user: AuthUser,
) -> Result<Json<LeaveResponse>, HomeMatchError> {
    if !state.storage.leave_household(&user.id).await? {
        return Err(HomeMatchError::validation("user is not in a household"));
    }
    info!(user_id = %user.id, "left household");
    Ok(Json(LeaveResponse { left: true }))
}
