use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use sqlx::types::Json;

use crate::types::{InteractionType, PropertyFilters, Resolution};

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbProfile {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub household_id: Option<String>,
    pub avatar_url: Option<String>,
    pub preferences: Json<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbHousehold {
    pub id: String,
    pub name: Option<String>,
    pub invite_code: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a household member.
#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdMember {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbProperty {
    pub id: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub price: i64,
    pub bedrooms: i64,
    pub bathrooms: f64,
    pub square_feet: Option<i64>,
    pub property_type: Option<String>,
    pub listing_status: String,
    pub images: Json<Vec<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub neighborhood_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact property card embedded in feeds.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    pub id: String,
    pub address: String,
    pub city: String,
    pub price: i64,
    pub image: Option<String>,
}

impl From<&DbProperty> for PropertySummary {
    fn from(p: &DbProperty) -> Self {
        Self {
            id: p.id.clone(),
            address: p.address.clone(),
            city: p.city.clone(),
            price: p.price,
            image: p.images.0.first().cloned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbVibes {
    pub property_id: String,
    pub tagline: String,
    pub vibe_justification: String,
    pub primary_vibes: Json<Vec<String>>,
    pub lifestyle_fits: Json<Vec<String>>,
    pub suggested_activities: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbInteraction {
    pub id: i64,
    pub user_id: String,
    pub property_id: String,
    pub household_id: Option<String>,
    pub interaction_type: InteractionType,
    pub score_data: Option<Json<Value>>,
    pub created_at: DateTime<Utc>,
}

/// A household interaction joined with the acting member's display name.
/// Input to dispute and mutual-like grouping.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MemberInteraction {
    pub id: i64,
    pub user_id: String,
    pub display_name: Option<String>,
    pub property_id: String,
    pub interaction_type: InteractionType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbResolution {
    pub household_id: String,
    pub property_id: String,
    pub resolution: Resolution,
    pub resolved_by: String,
    pub resolved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbSavedSearch {
    pub id: String,
    pub user_id: String,
    pub household_id: Option<String>,
    pub name: String,
    pub filters: Json<PropertyFilters>,
    pub is_active: bool,
    pub notify_on_new_matches: bool,
    pub created_at: DateTime<Utc>,
    pub last_viewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbNeighborhood {
    pub id: String,
    pub name: String,
    pub city: String,
    pub state: String,
    /// GeoJSON MultiPolygon text.
    pub bounds: String,
    pub created_at: DateTime<Utc>,
}
