use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::fetcher::{
    Result,
    cache::{CacheConfig, ScriptCache},
    traits::ScriptStore,
    types::ExtractionScript,
};

/// SQLite-backed script store.
///
/// One row per work, overwritten on save. Reads go through an in-process
/// cache first; a stale cache entry is harmless because scripts are
/// advisory and re-validated on every execution.
pub struct SqliteScriptStore {
    pool: SqlitePool,
    cache: ScriptCache,
}

impl SqliteScriptStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_cache_config(pool, CacheConfig::default())
    }

    pub fn with_cache_config(pool: SqlitePool, config: CacheConfig) -> Self {
        Self {
            pool,
            cache: ScriptCache::with_config(config),
        }
    }

    /// Create the backing table if it does not exist yet
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS extraction_scripts (
                work_id INTEGER PRIMARY KEY,
                source TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ScriptStore for SqliteScriptStore {
    async fn put(&self, script: &ExtractionScript) -> Result<()> {
        sqlx::query(
            "INSERT INTO extraction_scripts (work_id, source, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(work_id) DO UPDATE SET
                 source = excluded.source,
                 updated_at = excluded.updated_at",
        )
        .bind(script.work_id)
        .bind(&script.source)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.cache.insert(script.clone()).await;

        Ok(())
    }

    async fn get(&self, work_id: i64) -> Result<Option<ExtractionScript>> {
        if let Some(script) = self.cache.get(work_id).await {
            debug!("Cache hit for script of work {work_id}");
            return Ok(Some(script));
        }

        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT work_id, source FROM extraction_scripts WHERE work_id = ?")
                .bind(work_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((id, source)) => {
                let script = ExtractionScript::new(id, source);
                self.cache.insert(script.clone()).await;
                Ok(Some(script))
            }
            None => Ok(None),
        }
    }
}
