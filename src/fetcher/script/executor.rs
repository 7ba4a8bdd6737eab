use std::time::Duration;

use async_trait::async_trait;
use tokio::time;
use tracing::{debug, warn};

use crate::fetcher::{
    script::{ScriptError, program::ScriptProgram},
    traits::ScriptRunner,
    types::{EpisodeSubtitle, ExtractionScript, UNKNOWN_SUBTITLE},
};

/// Default wall-clock bound on program evaluation
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(1);

/// Validates and runs stored extraction scripts.
///
/// Per call: `Parse -> EntryPointLookup -> Execute -> TypeCheck`, each stage
/// collapsing to "no result" on rejection. There are no retries here; the
/// orchestrator retries by falling back to the AI path.
pub struct ScriptExecutor {
    timeout: Duration,
}

impl ScriptExecutor {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_EXECUTION_TIMEOUT)
    }

    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn try_run(
        &self,
        script: &ExtractionScript,
        work_id: i64,
        count: u32,
    ) -> Result<Option<EpisodeSubtitle>, ScriptError> {
        // Parse + entry point + bounds
        let program = ScriptProgram::parse(&script.source)?;

        // Evaluation is CPU-only and isolated from the serving task; the
        // timeout bounds it even if a pathological program stalls.
        let handle = tokio::task::spawn_blocking(move || program.evaluate(work_id, count));
        let result = time::timeout(self.timeout, handle)
            .await
            .map_err(|_| ScriptError::Timeout(self.timeout))?
            .map_err(|e| ScriptError::Execution(e.to_string()))?;

        let Some(subtitle) = result else {
            return Ok(None);
        };

        typecheck(&subtitle)?;

        Ok(Some(subtitle))
    }
}

impl Default for ScriptExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptRunner for ScriptExecutor {
    async fn run(
        &self,
        script: &ExtractionScript,
        work_id: i64,
        count: u32,
    ) -> Option<EpisodeSubtitle> {
        match self.try_run(script, work_id, count).await {
            Ok(Some(subtitle)) => {
                debug!(
                    "Script answered episode {count} of work {work_id}: {}",
                    subtitle.subtitle
                );
                Some(subtitle)
            }
            Ok(None) => {
                debug!("Script for work {work_id} has no rule for episode {count}");
                None
            }
            Err(e) => {
                warn!("Script rejected for work {work_id}: {e}");
                None
            }
        }
    }
}

/// The produced value must be a well-formed `EpisodeSubtitle`; anything else
/// rejects the run. The executor never corrects mismatched episode numbers
/// or work ids.
fn typecheck(subtitle: &EpisodeSubtitle) -> Result<(), ScriptError> {
    if subtitle.episode_count == 0 {
        return Err(ScriptError::TypeCheck(
            "episode number must be positive".to_string(),
        ));
    }
    if subtitle.subtitle.trim().is_empty() {
        return Err(ScriptError::TypeCheck("empty subtitle".to_string()));
    }
    if subtitle.subtitle == UNKNOWN_SUBTITLE {
        return Err(ScriptError::TypeCheck(
            "unknown-subtitle sentinel".to_string(),
        ));
    }
    Ok(())
}
