use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite};

use crate::db::models::{DbInteraction, DbResolution, MemberInteraction};
use crate::db::sqlite::Storage;
use crate::error::HomeMatchError;
use crate::types::{InteractionType, Resolution};

/// Per-user counts over distinct properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InteractionSummary {
    pub viewed: i64,
    pub liked: i64,
    pub passed: i64,
}

/// One row of the household activity feed.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityRow {
    pub id: i64,
    pub user_id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub interaction_type: InteractionType,
    pub created_at: DateTime<Utc>,
    pub property_id: String,
    pub address: String,
    pub city: String,
    pub price: i64,
    pub images: Json<Vec<String>>,
}

const INTERACTION_COLUMNS: &str =
    "id, user_id, property_id, household_id, interaction_type, score_data, created_at";

impl Storage {
    pub async fn record_interaction(
        &self,
        user_id: &str,
        property_id: &str,
        household_id: Option<&str>,
        kind: InteractionType,
        score_data: Option<Value>,
    ) -> Result<DbInteraction, HomeMatchError> {
        let now = Utc::now();
        let rec: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO user_property_interactions (
                user_id, property_id, household_id, interaction_type, score_data, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(property_id)
        .bind(household_id)
        .bind(kind)
        .bind(score_data.as_ref().map(Json))
        .bind(now)
        .fetch_one(self.pool())
        .await?;

        Ok(DbInteraction {
            id: rec.0,
            user_id: user_id.to_string(),
            property_id: property_id.to_string(),
            household_id: household_id.map(str::to_string),
            interaction_type: kind,
            score_data: score_data.map(Json),
            created_at: now,
        })
    }

    pub async fn list_user_interactions(
        &self,
        user_id: &str,
        kind: Option<InteractionType>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<DbInteraction>, HomeMatchError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {INTERACTION_COLUMNS} FROM user_property_interactions WHERE user_id = "
        ));
        builder.push_bind(user_id.to_string());
        if let Some(kind) = kind {
            builder.push(" AND interaction_type = ");
            builder.push_bind(kind);
        }
        builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        builder.push_bind(i64::from(limit));
        builder.push(" OFFSET ");
        builder.push_bind(i64::from(offset));

        let rows = builder
            .build_query_as::<DbInteraction>()
            .fetch_all(self.pool())
            .await?;
        Ok(rows)
    }

    pub async fn interaction_summary(
        &self,
        user_id: &str,
    ) -> Result<InteractionSummary, HomeMatchError> {
        let rec: (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(DISTINCT CASE WHEN interaction_type = 'view' THEN property_id END),
                COUNT(DISTINCT CASE WHEN interaction_type = 'like' THEN property_id END),
                COUNT(DISTINCT CASE WHEN interaction_type IN ('dislike', 'skip') THEN property_id END)
            FROM user_property_interactions
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(self.pool())
        .await?;
        Ok(InteractionSummary {
            viewed: rec.0,
            liked: rec.1,
            passed: rec.2,
        })
    }

    /// Remove every interaction `user_id` recorded on `property_id`.
    pub async fn delete_interactions(
        &self,
        user_id: &str,
        property_id: &str,
    ) -> Result<u64, HomeMatchError> {
        let res = sqlx::query(
            "DELETE FROM user_property_interactions WHERE user_id = ? AND property_id = ?",
        )
        .bind(user_id)
        .bind(property_id)
        .execute(self.pool())
        .await?;
        Ok(res.rows_affected())
    }

    /// Decision interactions (like/dislike/skip) of the household's current
    /// members, oldest first. Optionally narrowed to one property.
    pub async fn household_decisions(
        &self,
        household_id: &str,
        property_id: Option<&str>,
    ) -> Result<Vec<MemberInteraction>, HomeMatchError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT i.id, i.user_id, u.display_name, i.property_id, i.interaction_type, i.created_at \
             FROM user_property_interactions i \
             JOIN user_profiles u ON u.id = i.user_id \
             WHERE i.interaction_type <> 'view' AND u.household_id = ",
        );
        builder.push_bind(household_id.to_string());
        if let Some(property_id) = property_id {
            builder.push(" AND i.property_id = ");
            builder.push_bind(property_id.to_string());
        }
        builder.push(" ORDER BY i.created_at, i.id");

        let rows = builder
            .build_query_as::<MemberInteraction>()
            .fetch_all(self.pool())
            .await?;
        Ok(rows)
    }

    /// Household activity feed, newest first.
    pub async fn household_activity(
        &self,
        household_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ActivityRow>, HomeMatchError> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT i.id, i.user_id, u.display_name, u.avatar_url, i.interaction_type,
                   i.created_at, p.id AS property_id, p.address, p.city, p.price, p.images
            FROM user_property_interactions i
            JOIN user_profiles u ON u.id = i.user_id
            JOIN properties p ON p.id = i.property_id
            WHERE u.household_id = ?
            ORDER BY i.created_at DESC, i.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(household_id)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    pub async fn upsert_resolution(
        &self,
        household_id: &str,
        property_id: &str,
        resolution: Resolution,
        resolved_by: &str,
    ) -> Result<DbResolution, HomeMatchError> {
        let resolved_at = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO household_property_resolutions (
                household_id, property_id, resolution, resolved_by, resolved_at
            ) VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(household_id, property_id) DO UPDATE SET
                resolution=excluded.resolution,
                resolved_by=excluded.resolved_by,
                resolved_at=excluded.resolved_at
            "#,
        )
        .bind(household_id)
        .bind(property_id)
        .bind(resolution)
        .bind(resolved_by)
        .bind(resolved_at)
        .execute(self.pool())
        .await?;
        Ok(DbResolution {
            household_id: household_id.to_string(),
            property_id: property_id.to_string(),
            resolution,
            resolved_by: resolved_by.to_string(),
            resolved_at,
        })
    }

    /// Property ids the household has already resolved.
    pub async fn resolved_property_ids(
        &self,
        household_id: &str,
    ) -> Result<Vec<String>, HomeMatchError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT property_id FROM household_property_resolutions WHERE household_id = ?",
        )
        .bind(household_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}
