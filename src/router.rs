use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use jsonwebtoken::DecodingKey;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::Geocoder;
use crate::config::Config;
use crate::db::Storage;
use crate::error::HomeMatchError;
use crate::handlers::{
    admin, couples, geocode, health, households, interactions, neighborhoods, properties,
    saved_searches, users,
};

/// Shared handles for every request. All fields are cheap to clone.
#[derive(Clone)]
pub struct HomeMatchState {
    pub storage: Storage,
    pub config: Arc<Config>,
    pub geocoder: Geocoder,
    pub jwt_key: Arc<DecodingKey>,
}

impl HomeMatchState {
    pub fn new(storage: Storage, config: Arc<Config>) -> Result<Self, HomeMatchError> {
        let geocoder = Geocoder::new(&config.geocoder)?;
        let jwt_key = Arc::new(DecodingKey::from_secret(config.jwt_secret.as_bytes()));
        Ok(Self {
            storage,
            config,
            geocoder,
            jwt_key,
        })
    }
}

pub fn homematch_router(state: HomeMatchState) -> Router {
    let avatar_limit = state.config.avatar_max_bytes;
    let storage_dir = state.config.storage_dir.clone();

    let api = Router::new()
        .route("/users/me", get(users::get_me).patch(users::patch_me))
        .route(
            "/users/me/avatar",
            post(users::upload_avatar).layer(DefaultBodyLimit::max(avatar_limit)),
        )
        .route("/households", post(households::create_household))
        .route("/households/join", post(households::join_household))
        .route("/households/leave", post(households::leave_household))
        .route("/households/me", get(households::get_my_household))
        .route("/properties", get(properties::feed))
        .route("/properties/{id}", get(properties::get_property))
        .route("/properties/{id}/vibes", get(properties::get_vibes))
        .route(
            "/interactions",
            get(interactions::list_interactions).post(interactions::record_interaction),
        )
        .route("/interactions/summary", get(interactions::summary))
        .route(
            "/interactions/{property_id}",
            delete(interactions::undo_interactions),
        )
        .route("/couples/mutual-likes", get(couples::mutual_likes))
        .route("/couples/activity", get(couples::activity))
        .route("/couples/disputed", get(couples::disputed))
        .route("/couples/disputed/resolve", post(couples::resolve_dispute))
        .route(
            "/saved-searches",
            get(saved_searches::list_searches).post(saved_searches::create_search),
        )
        .route(
            "/saved-searches/{id}",
            delete(saved_searches::delete_search).patch(saved_searches::update_search),
        )
        .route("/saved-searches/{id}/matches", get(saved_searches::search_matches))
        .route("/neighborhoods", get(neighborhoods::list_neighborhoods))
        .route("/geocode", get(geocode::geocode))
        .route("/admin/properties", put(admin::upsert_properties))
        .route("/admin/properties/{id}/vibes", put(admin::upsert_vibes))
        .route("/admin/neighborhoods", post(neighborhoods::import_neighborhoods));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .nest_service("/storage", ServeDir::new(storage_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
