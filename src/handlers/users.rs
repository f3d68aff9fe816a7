use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::db::DbProfile;
use crate::error::HomeMatchError;
use crate::middleware::{ApiJson, AuthUser};
use crate::router::HomeMatchState;
use crate::service::avatar;

const MAX_DISPLAY_NAME: usize = 80;

pub async fn get_me(
    State(state): State<HomeMatchState>,
    user: AuthUser,
) -> Result<Json<DbProfile>, HomeMatchError> {
    Ok(Json(state.storage.get_profile(&user.id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub preferences: Option<Value>,
}

pub async fn patch_me(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    ApiJson(patch): ApiJson<ProfilePatch>,
) -> Result<Json<DbProfile>, HomeMatchError> {
    let display_name = match patch.display_name.as_deref().map(str::trim) {
        Some("") => return Err(HomeMatchError::validation("displayName must not be empty")),
        Some(name) if name.chars().count() > MAX_DISPLAY_NAME => {
            return Err(HomeMatchError::validation(format!(
                "displayName must be at most {MAX_DISPLAY_NAME} characters"
            )));
        }
        other => other,
    };
    if let Some(prefs) = &patch.preferences
        && !prefs.is_object()
    {
        return Err(HomeMatchError::validation("preferences must be a JSON object"));
    }

    let profile = state
        .storage
        .update_profile(&user.id, display_name, patch.preferences.as_ref())
        .await?;
    Ok(Json(profile))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResponse {
    pub avatar_url: String,
}

/// POST /api/users/me/avatar with the raw image as body.
pub async fn upload_avatar(
    State(state): State<HomeMatchState>,
    user: AuthUser,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<AvatarResponse>), HomeMatchError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            HomeMatchError::PayloadTooLarge
        } else {
            HomeMatchError::validation(rejection.body_text())
        }
    })?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let extension = avatar::extension_for(content_type).ok_or_else(|| {
        HomeMatchError::validation("avatar must be image/png, image/jpeg, image/webp or image/gif")
    })?;
    if body.is_empty() {
        return Err(HomeMatchError::validation("avatar body is empty"));
    }

    let cfg = &state.config;
    let relative = avatar::store_avatar(&cfg.storage_dir, &user.id, extension, &body).await?;
    let avatar_url = cfg.storage_url(&relative);
    let previous = state.storage.set_avatar_url(&user.id, &avatar_url).await?;
    let replaced = previous.as_deref().filter(|url| *url != avatar_url);
    avatar::remove_previous(cfg, replaced).await;

    info!(user_id = %user.id, size = body.len(), "avatar updated");
    Ok((StatusCode::OK, Json(AvatarResponse { avatar_url })))
}
