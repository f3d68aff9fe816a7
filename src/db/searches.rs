use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::models::DbSavedSearch;
use crate::db::sqlite::Storage;
use crate::error::HomeMatchError;
use crate::types::PropertyFilters;

const SEARCH_COLUMNS: &str = "id, user_id, household_id, name, filters, is_active, \
    notify_on_new_matches, created_at, last_viewed_at";

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct SavedSearchPatch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub notify_on_new_matches: Option<bool>,
}

impl Storage {
    pub async fn create_saved_search(
        &self,
        user_id: &str,
        household_id: Option<&str>,
        name: &str,
        filters: PropertyFilters,
        notify_on_new_matches: bool,
    ) -> Result<DbSavedSearch, HomeMatchError> {
        let search = DbSavedSearch {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            household_id: household_id.map(str::to_string),
            name: name.to_string(),
            filters: Json(filters),
            is_active: true,
            notify_on_new_matches,
            created_at: Utc::now(),
            last_viewed_at: None,
        };
        sqlx::query(
            r#"
            INSERT INTO saved_searches (
                id, user_id, household_id, name, filters, is_active,
                notify_on_new_matches, created_at, last_viewed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&search.id)
        .bind(&search.user_id)
        .bind(&search.household_id)
        .bind(&search.name)
        .bind(&search.filters)
        .bind(search.is_active)
        .bind(search.notify_on_new_matches)
        .bind(search.created_at)
        .execute(self.pool())
        .await?;
        Ok(search)
    }

    pub async fn list_saved_searches(
        &self,
        user_id: &str,
    ) -> Result<Vec<DbSavedSearch>, HomeMatchError> {
        let rows = sqlx::query_as::<_, DbSavedSearch>(&format!(
            "SELECT {SEARCH_COLUMNS} FROM saved_searches WHERE user_id = ? ORDER BY created_at DESC, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    /// Searches owned by someone else are reported as not found.
    pub async fn get_saved_search(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<DbSavedSearch, HomeMatchError> {
        sqlx::query_as::<_, DbSavedSearch>(&format!(
            "SELECT {SEARCH_COLUMNS} FROM saved_searches WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or(HomeMatchError::NotFound("saved search"))
    }

    pub async fn update_saved_search(
        &self,
        user_id: &str,
        id: &str,
        patch: SavedSearchPatch,
    ) -> Result<DbSavedSearch, HomeMatchError> {
        let res = sqlx::query(
            r#"UPDATE saved_searches SET
                name = COALESCE(?, name),
                is_active = COALESCE(?, is_active),
                notify_on_new_matches = COALESCE(?, notify_on_new_matches)
              WHERE id = ? AND user_id = ?"#,
        )
        .bind(patch.name)
        .bind(patch.is_active)
        .bind(patch.notify_on_new_matches)
        .bind(id)
        .bind(user_id)
        .execute(self.pool())
        .await?;
        if res.rows_affected() == 0 {
            return Err(HomeMatchError::NotFound("saved search"));
        }
        self.get_saved_search(user_id, id).await
    }

    pub async fn delete_saved_search(&self, user_id: &str, id: &str) -> Result<(), HomeMatchError> {
        let res = sqlx::query("DELETE FROM saved_searches WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool())
            .await?;
        if res.rows_affected() == 0 {
            return Err(HomeMatchError::NotFound("saved search"));
        }
        Ok(())
    }

    pub async fn touch_saved_search(&self, id: &str) -> Result<(), HomeMatchError> {
        sqlx::query("UPDATE saved_searches SET last_viewed_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
