use chrono::Utc;
use uuid::Uuid;

use crate::db::models::{DbHousehold, HouseholdMember};
use crate::db::sqlite::Storage;
use crate::error::HomeMatchError;

/// Eight uppercase hex characters drawn from a fresh v4 UUID.
pub fn new_invite_code() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_ascii_uppercase()
}

impl Storage {
    /// Create a household and move `user_id` into it, atomically.
    /// Fails with `Conflict` when the user already belongs to a household.
    pub async fn create_household(
        &self,
        user_id: &str,
        name: Option<&str>,
    ) -> Result<DbHousehold, HomeMatchError> {
        let mut tx = self.pool().begin().await?;

        let current: Option<(Option<String>,)> =
            sqlx::query_as("SELECT household_id FROM user_profiles WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if current.and_then(|c| c.0).is_some() {
            return Err(HomeMatchError::Conflict(
                "user already belongs to a household".to_string(),
            ));
        }

        let household = DbHousehold {
            id: Uuid::new_v4().to_string(),
            name: name.map(str::to_string),
            invite_code: new_invite_code(),
            created_by: user_id.to_string(),
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO households (id, name, invite_code, created_by, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&household.id)
        .bind(&household.name)
        .bind(&household.invite_code)
        .bind(&household.created_by)
        .bind(household.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE user_profiles SET household_id = ?, updated_at = ? WHERE id = ?")
            .bind(&household.id)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(household)
    }

    pub async fn get_household(&self, id: &str) -> Result<DbHousehold, HomeMatchError> {
        sqlx::query_as::<_, DbHousehold>(
            "SELECT id, name, invite_code, created_by, created_at FROM households WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or(HomeMatchError::NotFound("household"))
    }

    /// Join by invite code. Re-joining the caller's own household is a no-op.
    pub async fn join_household(
        &self,
        user_id: &str,
        invite_code: &str,
    ) -> Result<DbHousehold, HomeMatchError> {
        let mut tx = self.pool().begin().await?;

        let household = sqlx::query_as::<_, DbHousehold>(
            "SELECT id, name, invite_code, created_by, created_at FROM households WHERE invite_code = ?",
        )
        .bind(invite_code)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(HomeMatchError::NotFound("household"))?;

        let current: Option<(Option<String>,)> =
            sqlx::query_as("SELECT household_id FROM user_profiles WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        match current.and_then(|c| c.0) {
            Some(existing) if existing == household.id => return Ok(household),
            Some(_) => {
                return Err(HomeMatchError::Conflict(
                    "user already belongs to a household".to_string(),
                ));
            }
            None => {}
        }

        sqlx::query("UPDATE user_profiles SET household_id = ?, updated_at = ? WHERE id = ?")
            .bind(&household.id)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(household)
    }

    /// Returns false when the user had no household to leave.
    pub async fn leave_household(&self, user_id: &str) -> Result<bool, HomeMatchError> {
        let res = sqlx::query(
            "UPDATE user_profiles SET household_id = NULL, updated_at = ? WHERE id = ? AND household_id IS NOT NULL",
        )
        .bind(Utc::now())
        .bind(user_id)
        .execute(self.pool())
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn household_members(
        &self,
        household_id: &str,
    ) -> Result<Vec<HouseholdMember>, HomeMatchError> {
        let members = sqlx::query_as::<_, HouseholdMember>(
            "SELECT id, email, display_name, avatar_url FROM user_profiles WHERE household_id = ? ORDER BY created_at, id",
        )
        .bind(household_id)
        .fetch_all(self.pool())
        .await?;
        Ok(members)
    }
}
