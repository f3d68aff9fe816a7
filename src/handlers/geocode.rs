use axum::{Json, extract::State};
use serde::Deserialize;

use crate::api::GeocodeResult;
use crate::error::HomeMatchError;
use crate::middleware::{ApiQuery, AuthUser};
use crate::router::HomeMatchState;

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub address: Option<String>,
}

pub async fn geocode(
    State(state): State<HomeMatchState>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<GeocodeQuery>,
) -> Result<Json<GeocodeResult>, HomeMatchError> {
    let address = query
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| HomeMatchError::validation("address is required"))?;
    state
        .geocoder
        .geocode(address)
        .await?
        .map(Json)
        .ok_or(HomeMatchError::NotFound("address"))
}
