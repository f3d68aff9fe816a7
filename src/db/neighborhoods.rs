use chrono::Utc;
use uuid::Uuid;

use crate::db::models::DbNeighborhood;
use crate::db::sqlite::Storage;
use crate::error::HomeMatchError;

/// A clipped boundary ready to be stored.
#[derive(Debug, Clone)]
pub struct NewNeighborhood {
    pub name: String,
    pub bounds: String,
}

impl Storage {
    /// Neighborhoods of a city, in creation order. Matching is case-insensitive.
    pub async fn list_neighborhoods(
        &self,
        city: &str,
        state: &str,
    ) -> Result<Vec<DbNeighborhood>, HomeMatchError> {
        let rows = sqlx::query_as::<_, DbNeighborhood>(
            r#"SELECT id, name, city, state, bounds, created_at FROM neighborhoods
               WHERE city = ? COLLATE NOCASE AND state = ? COLLATE NOCASE
               ORDER BY created_at, rowid"#,
        )
        .bind(city)
        .bind(state)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    pub async fn neighborhood_exists(&self, id: &str) -> Result<bool, HomeMatchError> {
        let rec: Option<(String,)> = sqlx::query_as("SELECT id FROM neighborhoods WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(rec.is_some())
    }

    /// Insert a batch in one transaction. Returns the new ids in input order.
    ///
    /// Names are unique per city ignoring case; a clash fails the whole batch
    /// with `Conflict`.
    pub async fn insert_neighborhoods(
        &self,
        city: &str,
        state: &str,
        items: Vec<NewNeighborhood>,
    ) -> Result<Vec<String>, HomeMatchError> {
        let mut tx = self.pool().begin().await?;
        let mut ids = Vec::with_capacity(items.len());
        let now = Utc::now();

        for item in items {
            let id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO neighborhoods (id, name, city, state, bounds, created_at) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(&item.name)
            .bind(city)
            .bind(state)
            .bind(&item.bounds)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => HomeMatchError::Conflict(
                    format!("neighborhood {:?} already exists in {city}, {state}", item.name),
                ),
                other => HomeMatchError::Database(other),
            })?;
            ids.push(id);
        }

        tx.commit().await?;
        Ok(ids)
    }
}
