mod cache;
pub mod mock;
mod orchestrator;
mod provider;
mod script;
mod store;
mod traits;
mod types;


pub use cache::{CacheConfig, ScriptCache};
pub use orchestrator::SubtitleFetcher;
pub use provider::{BrowserClient, HttpClient, OpenRouterExtractor, PageFetcher};
pub use script::{
    DEFAULT_EXECUTION_TIMEOUT, ExtractionRule, ScriptError, ScriptExecutor, ScriptProgram,
};
pub use store::{MemoryScriptStore, SqliteScriptStore};
pub use traits::{AiExtractor, ScriptRunner, ScriptStore};
pub use types::{EpisodeSubtitle, ExtractionScript, UNKNOWN_SUBTITLE, Work};

use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;

/// Fetcher result type
pub type Result<T> = std::result::Result<T, FetcherError>;

/// Fetcher error types
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Create a fetcher wired to the default collaborators: the SQLite script
/// store, the validating script executor and the OpenRouter extractor
/// (with the browser sidecar when one is configured).
pub async fn create_default_fetcher(
    settings: &Settings,
    pool: sqlx::SqlitePool,
) -> Result<SubtitleFetcher> {
    let store = SqliteScriptStore::new(pool);
    store.init().await?;

    let page_fetcher = settings.browser.endpoint.as_deref().map(|endpoint| {
        Arc::new(BrowserClient::new(
            endpoint,
            Duration::from_secs(settings.browser.timeout_secs),
        )) as Arc<dyn PageFetcher>
    });
    let ai = OpenRouterExtractor::with_page_fetcher(settings.ai.clone(), page_fetcher);
    let runner = ScriptExecutor::with_timeout(Duration::from_millis(
        settings.fetcher.script_timeout_ms,
    ));

    Ok(SubtitleFetcher::new(
        Arc::new(store),
        Arc::new(ai),
        Arc::new(runner),
    ))
}
