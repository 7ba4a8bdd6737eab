use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::fetcher::types::ExtractionScript;

/// In-process read-through cache in front of the script store
#[derive(Clone)]
pub struct ScriptCache {
    scripts: Cache<i64, Arc<ExtractionScript>>,
}

impl ScriptCache {
    /// Create a new cache with default settings
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create a new cache with custom configuration
    pub fn with_config(config: CacheConfig) -> Self {
        let scripts = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();

        Self { scripts }
    }

    pub async fn get(&self, work_id: i64) -> Option<ExtractionScript> {
        self.scripts.get(&work_id).await.map(|arc| (*arc).clone())
    }

    pub async fn insert(&self, script: ExtractionScript) {
        self.scripts.insert(script.work_id, Arc::new(script)).await;
    }

    /// Drop every cached script
    pub fn clear(&self) {
        self.scripts.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.scripts.entry_count()
    }
}

impl Default for ScriptCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached scripts
    pub max_entries: u64,
    /// TTL for cached scripts
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            ttl: Duration::from_secs(900), // 15 minutes
        }
    }
}
