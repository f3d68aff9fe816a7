use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;

use crate::db::models::DbProfile;
use crate::db::sqlite::Storage;
use crate::error::HomeMatchError;

const PROFILE_COLUMNS: &str = "id, email, display_name, household_id, avatar_url, preferences, created_at, updated_at";

impl Storage {
    /// Create the profile row for an authenticated subject if it does not exist yet.
    /// A known email fills in a previously missing one.
    pub async fn ensure_profile(
        &self,
        user_id: &str,
        email: Option<&str>,
    ) -> Result<(), HomeMatchError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO user_profiles (id, email, preferences, created_at, updated_at)
            VALUES (?, ?, '{}', ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                email = COALESCE(user_profiles.email, excluded.email)
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<DbProfile, HomeMatchError> {
        sqlx::query_as::<_, DbProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE id = ?"
        ))
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or(HomeMatchError::NotFound("profile"))
    }

    pub async fn household_id_of(&self, user_id: &str) -> Result<Option<String>, HomeMatchError> {
        let rec: Option<(Option<String>,)> =
            sqlx::query_as("SELECT household_id FROM user_profiles WHERE id = ?")
                .bind(user_id)
                .fetch_optional(self.pool())
                .await?;
        Ok(rec.and_then(|r| r.0))
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        preferences: Option<&Value>,
    ) -> Result<DbProfile, HomeMatchError> {
        sqlx::query(
            r#"UPDATE user_profiles SET
                display_name = COALESCE(?, display_name),
                preferences = COALESCE(?, preferences),
                updated_at = ?
              WHERE id = ?"#,
        )
        .bind(display_name)
        .bind(preferences.map(Json))
        .bind(Utc::now())
        .bind(user_id)
        .execute(self.pool())
        .await?;
        self.get_profile(user_id).await
    }

    /// Point the profile at a new avatar, returning the previous URL.
    pub async fn set_avatar_url(
        &self,
        user_id: &str,
        avatar_url: &str,
    ) -> Result<Option<String>, HomeMatchError> {
        let mut tx = self.pool().begin().await?;
        let previous: Option<(Option<String>,)> =
            sqlx::query_as("SELECT avatar_url FROM user_profiles WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        sqlx::query("UPDATE user_profiles SET avatar_url = ?, updated_at = ? WHERE id = ?")
            .bind(avatar_url)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(previous.and_then(|p| p.0))
    }
}
