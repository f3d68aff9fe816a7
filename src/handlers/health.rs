use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::error::HomeMatchError;
use crate::router::HomeMatchState;

pub async fn health(State(state): State<HomeMatchState>) -> Result<Json<Value>, HomeMatchError> {
    state.storage.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}
