use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::db::models::{DbProperty, DbVibes};
use crate::db::sqlite::Storage;
use crate::error::HomeMatchError;
use crate::types::PropertyFilters;

const PROPERTY_COLUMNS: &str = "p.id, p.address, p.city, p.state, p.zip_code, p.price, p.bedrooms, \
    p.bathrooms, p.square_feet, p.property_type, p.listing_status, p.images, p.latitude, \
    p.longitude, p.neighborhood_id, p.is_active, p.created_at, p.updated_at";

/// Listing payload accepted by the ingestion endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInput {
    pub id: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub price: i64,
    pub bedrooms: i64,
    pub bathrooms: f64,
    pub square_feet: Option<i64>,
    pub property_type: Option<String>,
    #[serde(default = "default_listing_status")]
    pub listing_status: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub neighborhood_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_listing_status() -> String {
    "active".to_string()
}

fn default_true() -> bool {
    true
}

impl PropertyInput {
    pub fn validate(&self) -> Result<(), HomeMatchError> {
        if self.address.trim().is_empty() {
            return Err(HomeMatchError::validation("address is required"));
        }
        if self.price < 0 || self.bedrooms < 0 || self.bathrooms < 0.0 {
            return Err(HomeMatchError::validation(
                "price, bedrooms and bathrooms must not be negative",
            ));
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) => {
                Err(HomeMatchError::validation("coordinates out of range"))
            }
            (Some(_), None) | (None, Some(_)) => Err(HomeMatchError::validation(
                "latitude and longitude must be given together",
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibesInput {
    pub tagline: String,
    pub vibe_justification: String,
    #[serde(default)]
    pub primary_vibes: Vec<String>,
    #[serde(default)]
    pub lifestyle_fits: Vec<String>,
    #[serde(default)]
    pub suggested_activities: Vec<String>,
}

impl Storage {
    pub async fn get_property(&self, id: &str) -> Result<DbProperty, HomeMatchError> {
        sqlx::query_as::<_, DbProperty>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties p WHERE p.id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or(HomeMatchError::NotFound("property"))
    }

    /// Fetch several listings at once; missing ids are simply absent.
    pub async fn get_properties(&self, ids: &[String]) -> Result<Vec<DbProperty>, HomeMatchError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties p WHERE p.id IN ("
        ));
        let mut sep = builder.separated(", ");
        for id in ids {
            sep.push_bind(id.clone());
        }
        sep.push_unseparated(")");
        let rows = builder
            .build_query_as::<DbProperty>()
            .fetch_all(self.pool())
            .await?;
        Ok(rows)
    }

    pub async fn property_exists(&self, id: &str) -> Result<bool, HomeMatchError> {
        let rec: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM properties WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(rec.is_some())
    }

    /// Upsert listings by id in one transaction. Returns ids in input order.
    pub async fn upsert_properties(
        &self,
        items: Vec<PropertyInput>,
    ) -> Result<Vec<String>, HomeMatchError> {
        let mut tx = self.pool().begin().await?;
        let mut ids = Vec::with_capacity(items.len());
        let now = Utc::now();

        for item in items {
            let id = item.id.unwrap_or_else(|| Uuid::new_v4().to_string());
            sqlx::query(
                r#"
                INSERT INTO properties (
                    id, address, city, state, zip_code, price, bedrooms, bathrooms,
                    square_feet, property_type, listing_status, images, latitude,
                    longitude, neighborhood_id, is_active, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    address=excluded.address,
                    city=excluded.city,
                    state=excluded.state,
                    zip_code=excluded.zip_code,
                    price=excluded.price,
                    bedrooms=excluded.bedrooms,
                    bathrooms=excluded.bathrooms,
                    square_feet=excluded.square_feet,
                    property_type=excluded.property_type,
                    listing_status=excluded.listing_status,
                    images=excluded.images,
                    latitude=excluded.latitude,
                    longitude=excluded.longitude,
                    neighborhood_id=excluded.neighborhood_id,
                    is_active=excluded.is_active,
                    updated_at=excluded.updated_at
                "#,
            )
            .bind(&id)
            .bind(item.address)
            .bind(item.city)
            .bind(item.state)
            .bind(item.zip_code)
            .bind(item.price)
            .bind(item.bedrooms)
            .bind(item.bathrooms)
            .bind(item.square_feet)
            .bind(item.property_type)
            .bind(item.listing_status)
            .bind(Json(item.images))
            .bind(item.latitude)
            .bind(item.longitude)
            .bind(item.neighborhood_id)
            .bind(item.is_active)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            ids.push(id);
        }

        tx.commit().await?;
        Ok(ids)
    }

    /// Active listings matching `filters`, newest first. When `exclude_decided_by`
    /// is set, listings that user already liked, disliked or skipped are left out.
    pub async fn property_feed(
        &self,
        filters: &PropertyFilters,
        exclude_decided_by: Option<&str>,
        limit: u32,
    ) -> Result<Vec<DbProperty>, HomeMatchError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties p WHERE p.is_active = 1"
        ));
        if let Some(min) = filters.price_min {
            builder.push(" AND p.price >= ");
            builder.push_bind(min);
        }
        if let Some(max) = filters.price_max {
            builder.push(" AND p.price <= ");
            builder.push_bind(max);
        }
        if let Some(beds) = filters.bedrooms_min {
            builder.push(" AND p.bedrooms >= ");
            builder.push_bind(beds);
        }
        if let Some(baths) = filters.bathrooms_min {
            builder.push(" AND p.bathrooms >= ");
            builder.push_bind(baths);
        }
        if let Some(city) = &filters.city {
            builder.push(" AND p.city = ");
            builder.push_bind(city.clone());
            builder.push(" COLLATE NOCASE");
        }
        if let Some(state) = &filters.state {
            builder.push(" AND p.state = ");
            builder.push_bind(state.clone());
            builder.push(" COLLATE NOCASE");
        }
        if !filters.property_types.is_empty() {
            builder.push(" AND p.property_type IN (");
            let mut sep = builder.separated(", ");
            for t in &filters.property_types {
                sep.push_bind(t.clone());
            }
            sep.push_unseparated(")");
        }
        if let Some(neighborhood) = &filters.neighborhood_id {
            builder.push(" AND p.neighborhood_id = ");
            builder.push_bind(neighborhood.clone());
        }
        if let Some(user_id) = exclude_decided_by {
            builder.push(
                " AND NOT EXISTS (SELECT 1 FROM user_property_interactions i \
                 WHERE i.property_id = p.id AND i.interaction_type <> 'view' AND i.user_id = ",
            );
            builder.push_bind(user_id.to_string());
            builder.push(")");
        }
        builder.push(" ORDER BY p.created_at DESC, p.id LIMIT ");
        builder.push_bind(i64::from(limit));

        let rows = builder
            .build_query_as::<DbProperty>()
            .fetch_all(self.pool())
            .await?;
        Ok(rows)
    }

    pub async fn get_vibes(&self, property_id: &str) -> Result<DbVibes, HomeMatchError> {
        sqlx::query_as::<_, DbVibes>(
            r#"SELECT property_id, tagline, vibe_justification, primary_vibes,
               lifestyle_fits, suggested_activities, created_at
               FROM property_vibes WHERE property_id = ?"#,
        )
        .bind(property_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or(HomeMatchError::NotFound("vibes"))
    }

    pub async fn upsert_vibes(
        &self,
        property_id: &str,
        vibes: VibesInput,
    ) -> Result<DbVibes, HomeMatchError> {
        sqlx::query(
            r#"
            INSERT INTO property_vibes (
                property_id, tagline, vibe_justification, primary_vibes,
                lifestyle_fits, suggested_activities, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(property_id) DO UPDATE SET
                tagline=excluded.tagline,
                vibe_justification=excluded.vibe_justification,
                primary_vibes=excluded.primary_vibes,
                lifestyle_fits=excluded.lifestyle_fits,
                suggested_activities=excluded.suggested_activities
            "#,
        )
        .bind(property_id)
        .bind(vibes.tagline)
        .bind(vibes.vibe_justification)
        .bind(Json(vibes.primary_vibes))
        .bind(Json(vibes.lifestyle_fits))
        .bind(Json(vibes.suggested_activities))
        .bind(Utc::now())
        .execute(self.pool())
        .await?;
        self.get_vibes(property_id).await
    }
}
