use async_trait::async_trait;

use crate::fetcher::{
    Result,
    types::{EpisodeSubtitle, ExtractionScript, Work},
};

/// AI-backed subtitle lookup (web search, page reading).
///
/// Expensive and slow compared to the script path. Implementations recover
/// every failure internally and express it as `(None, None)`; all four
/// presence/absence combinations of the returned pair are legal.
#[async_trait]
pub trait AiExtractor: Send + Sync {
    /// Resolve the subtitle of episode `count`, optionally also producing a
    /// reusable extraction script for the work.
    async fn lookup(
        &self,
        work: &Work,
        count: u32,
    ) -> (Option<EpisodeSubtitle>, Option<ExtractionScript>);
}

/// Runs a stored extraction script against one `(work_id, episode_count)`
/// pair. Never raises: rejection at any stage is `None`.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(
        &self,
        script: &ExtractionScript,
        work_id: i64,
        count: u32,
    ) -> Option<EpisodeSubtitle>;
}

/// Persistence for extraction scripts, keyed by work id.
///
/// Upsert semantics; last write wins. The cached script is advisory, so no
/// get/put transactionality is required.
#[async_trait]
pub trait ScriptStore: Send + Sync {
    /// Save a script, overwriting any previous one for the same work
    async fn put(&self, script: &ExtractionScript) -> Result<()>;

    /// Load the script for a work, if one exists
    async fn get(&self, work_id: i64) -> Result<Option<ExtractionScript>>;
}
