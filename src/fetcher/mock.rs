//! Test-double collaborators.
//!
//! Fixed-response implementations of the fetcher seams, used by the test
//! suite and handy for running the service without real backends.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::fetcher::{
    FetcherError, Result,
    script::ScriptProgram,
    traits::{AiExtractor, ScriptRunner, ScriptStore},
    types::{EpisodeSubtitle, ExtractionScript, Work},
};

/// Which parts of the lookup pair the mock AI extractor returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockLookup {
    /// Subtitle plus a matching single-rule script
    Found,
    /// Subtitle but no reusable script
    SubtitleOnly,
    /// Script but no subtitle
    ScriptOnly,
    /// Total failure
    Nothing,
}

/// AI extractor with a fixed response and a call counter
pub struct MockAiExtractor {
    subtitle: String,
    behavior: MockLookup,
    calls: AtomicUsize,
}

impl MockAiExtractor {
    pub fn new(subtitle: impl Into<String>, behavior: MockLookup) -> Self {
        Self {
            subtitle: subtitle.into(),
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always succeeds with a subtitle and a matching script
    pub fn found(subtitle: impl Into<String>) -> Self {
        Self::new(subtitle, MockLookup::Found)
    }

    /// Succeeds but produces no reusable script
    pub fn subtitle_only(subtitle: impl Into<String>) -> Self {
        Self::new(subtitle, MockLookup::SubtitleOnly)
    }

    /// Produces only a script, no subtitle
    pub fn script_only(subtitle: impl Into<String>) -> Self {
        Self::new(subtitle, MockLookup::ScriptOnly)
    }

    /// Always fails completely
    pub fn nothing() -> Self {
        Self::new("", MockLookup::Nothing)
    }

    /// How many lookups this mock has served
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiExtractor for MockAiExtractor {
    async fn lookup(
        &self,
        work: &Work,
        count: u32,
    ) -> (Option<EpisodeSubtitle>, Option<ExtractionScript>) {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let subtitle = EpisodeSubtitle::new(work.id, count, self.subtitle.clone());
        let script = ExtractionScript::new(
            work.id,
            ScriptProgram::single(count, self.subtitle.clone()).to_source(),
        );

        match self.behavior {
            MockLookup::Found => (Some(subtitle), Some(script)),
            MockLookup::SubtitleOnly => (Some(subtitle), None),
            MockLookup::ScriptOnly => (None, Some(script)),
            MockLookup::Nothing => (None, None),
        }
    }
}

/// Script runner with a fixed outcome, ignoring the script text
pub struct MockScriptRunner {
    result: Option<EpisodeSubtitle>,
    calls: AtomicUsize,
}

impl MockScriptRunner {
    /// Always produces the given subtitle
    pub fn fixed(result: EpisodeSubtitle) -> Self {
        Self {
            result: Some(result),
            calls: AtomicUsize::new(0),
        }
    }

    /// Rejects every script
    pub fn rejecting() -> Self {
        Self {
            result: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptRunner for MockScriptRunner {
    async fn run(
        &self,
        _script: &ExtractionScript,
        _work_id: i64,
        _count: u32,
    ) -> Option<EpisodeSubtitle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Store whose saves never complete.
///
/// Exists to prove that persistence cannot delay a fetch result.
#[derive(Default)]
pub struct PendingScriptStore;

#[async_trait]
impl ScriptStore for PendingScriptStore {
    async fn put(&self, _script: &ExtractionScript) -> Result<()> {
        std::future::pending().await
    }

    async fn get(&self, _work_id: i64) -> Result<Option<ExtractionScript>> {
        Ok(None)
    }
}

/// Store that errors on every operation
#[derive(Default)]
pub struct FailingScriptStore;

#[async_trait]
impl ScriptStore for FailingScriptStore {
    async fn put(&self, _script: &ExtractionScript) -> Result<()> {
        Err(FetcherError::Cache("store unavailable".to_string()))
    }

    async fn get(&self, _work_id: i64) -> Result<Option<ExtractionScript>> {
        Err(FetcherError::Cache("store unavailable".to_string()))
    }
}
