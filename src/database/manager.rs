use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Stored recipe for drink {id} is not a valid ingredient list: {source}")]
    CorruptRecipe {
        id: i32,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize recipe: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                DatabaseError::UniqueViolation(db.message().to_string())
            }
            _ => DatabaseError::Sqlx(err),
        }
    }
}

const CREATE_DRINK_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drink (
        id SERIAL PRIMARY KEY,
        title VARCHAR(80) NOT NULL UNIQUE,
        recipe TEXT NOT NULL
    )
"#;

const SEED_TITLE: &str = "water";
const SEED_RECIPE: &str = r#"[{"name": "water", "color": "blue", "parts": 1}]"#;

/// Connection pool bootstrap and schema management
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Create the drink table if it does not exist yet
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query(CREATE_DRINK_TABLE).execute(pool).await?;
        Ok(())
    }

    /// Drop all drinks, recreate the table and add the starter drink.
    /// Destroys every existing record.
    pub async fn reset(pool: &PgPool) -> Result<(), DatabaseError> {
        let mut tx = pool.begin().await?;

        sqlx::query("DROP TABLE IF EXISTS drink").execute(&mut *tx).await?;
        sqlx::query(CREATE_DRINK_TABLE).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO drink (title, recipe) VALUES ($1, $2)")
            .bind(SEED_TITLE)
            .bind(SEED_RECIPE)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Reset drink table and seeded '{}'", SEED_TITLE);
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
