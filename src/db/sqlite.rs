use crate::db::schema::SQLITE_INIT;
use crate::error::HomeMatchError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

/// Handle to the HomeMatch database. Cheap to clone; every method borrows
/// a connection from the shared pool.
///
/// Queries are grouped by table in sibling modules (`profiles`,
/// `households`, `properties`, ...), each adding an `impl Storage` block.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, HomeMatchError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(connect_opts)
            .await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        info!(database_url, "database ready");
        Ok(storage)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), HomeMatchError> {
        // sqlx::query runs a single statement, so split the bundle
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), HomeMatchError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
