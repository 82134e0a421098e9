// Database connection and pool management
// This module handles SQLite database connections using sqlx

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

use crate::infrastructure::config::DatabaseConfig;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let in_memory = config.url.contains(":memory:");

        if !in_memory {
            let db_path = config
                .url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .with_context(|| format!("Failed to create database directory {parent:?}"))?;
                }
            }
        }

        let mut options = SqliteConnectOptions::from_str(&config.url)
            .with_context(|| format!("Invalid database url '{}'", config.url))?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // Every connection to `:memory:` opens its own database, so the pool
        // must hold exactly one connection that is never recycled.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .idle_timeout(config.idle_timeout())
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to {}", config.url))?;

        info!("🗄️ Connected to database: {}", config.url);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        let create_media_sql = r"
            CREATE TABLE IF NOT EXISTS media_item (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                original_url TEXT NOT NULL CHECK (length(original_url) > 0),
                media_url TEXT NOT NULL CHECK (length(media_url) BETWEEN 1 AND 2048),
                type TEXT NOT NULL CHECK (type IN ('IMAGE', 'VIDEO')),
                created_at TEXT NOT NULL
            )
        ";

        sqlx::query(create_media_sql).execute(&self.pool).await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_media_item_type ON media_item (type)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_media_item_original_url ON media_item (original_url)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
