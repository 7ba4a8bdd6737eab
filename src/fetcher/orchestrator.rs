use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::fetcher::{
    traits::{AiExtractor, ScriptRunner, ScriptStore},
    types::{EpisodeSubtitle, Work},
};

/// Composes the script cache, the script executor and the AI backend into
/// the cache-first fetch protocol.
///
/// One call handles exactly one `(work, episode)` pair. Concurrent fetches
/// for the same work may race on the store; both sides then do a full AI
/// lookup and the later write-back wins, which is acceptable because the
/// stored script is advisory.
pub struct SubtitleFetcher {
    store: Arc<dyn ScriptStore>,
    ai: Arc<dyn AiExtractor>,
    runner: Arc<dyn ScriptRunner>,
}

impl SubtitleFetcher {
    pub fn new(
        store: Arc<dyn ScriptStore>,
        ai: Arc<dyn AiExtractor>,
        runner: Arc<dyn ScriptRunner>,
    ) -> Self {
        Self { store, ai, runner }
    }

    /// Fetch the subtitle of episode `count` of `work`.
    ///
    /// Order per call: stored script first, AI fallback second, write-back
    /// of any newly generated script detached from the response. `None` is
    /// the only failure signal; collaborator errors never propagate.
    pub async fn fetch(&self, work: &Work, count: u32) -> Option<EpisodeSubtitle> {
        match self.store.get(work.id).await {
            Ok(Some(script)) => {
                if let Some(subtitle) = self.runner.run(&script, work.id, count).await {
                    info!(
                        "Cache hit for work {} episode {count}: {}",
                        work.id, subtitle.subtitle
                    );
                    return Some(subtitle);
                }
                debug!(
                    "Stored script for work {} yielded nothing for episode {count}",
                    work.id
                );
            }
            Ok(None) => debug!("No stored script for work {}", work.id),
            // A broken read path is a cache miss, not a failed fetch.
            Err(e) => warn!("Script lookup failed for work {}: {e}", work.id),
        }

        info!(
            "Falling back to AI lookup for \"{}\" episode {count}",
            work.title
        );
        let (subtitle, script) = self.ai.lookup(work, count).await;

        if let Some(script) = script {
            // Fire and forget: the caller must not wait on persistence, and
            // a failed save only ever shows up in the log.
            let store = Arc::clone(&self.store);
            tokio::spawn(async move {
                if let Err(e) = store.put(&script).await {
                    warn!(
                        "Failed to persist extraction script for work {}: {e}",
                        script.work_id
                    );
                }
            });
        }

        subtitle
    }
}
