use serde::{Deserialize, Serialize};

/// Sentinel subtitle value the AI backend returns when a search finds nothing.
pub const UNKNOWN_SUBTITLE: &str = "不明";

/// Basic information about one tracked anime series.
///
/// Supplied by the caller on every request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Work {
    /// Unique identifier of the series
    pub id: i64,
    /// Display title
    pub title: String,
    /// Canonical official site URL, if known
    pub official_url: Option<String>,
}

impl Work {
    /// Create a work; an empty or blank URL is normalized to `None`
    pub fn new(id: i64, title: impl Into<String>, official_url: impl Into<String>) -> Self {
        let url = official_url.into();
        Self {
            id,
            title: title.into(),
            official_url: (!url.trim().is_empty()).then_some(url),
        }
    }
}

/// The resolved subtitle of a single episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSubtitle {
    /// Owning work identifier
    pub work_id: i64,
    /// 1-based episode number within the work
    pub episode_count: u32,
    /// Official subtitle text
    pub subtitle: String,
    /// Free-text additional information
    pub additional_info: Option<String>,
    /// Air date as reported by the source
    pub air_date: Option<String>,
}

impl EpisodeSubtitle {
    pub fn new(work_id: i64, episode_count: u32, subtitle: impl Into<String>) -> Self {
        Self {
            work_id,
            episode_count,
            subtitle: subtitle.into(),
            additional_info: None,
            air_date: None,
        }
    }

    pub fn with_additional_info(mut self, info: impl Into<String>) -> Self {
        self.additional_info = Some(info.into());
        self
    }

    pub fn with_air_date(mut self, date: impl Into<String>) -> Self {
        self.air_date = Some(date.into());
        self
    }
}

/// A persisted extraction procedure for one work.
///
/// `source` is a declarative program (see `script::ScriptProgram`) that can
/// reconstruct an `EpisodeSubtitle` without network access. It is generated
/// text from an external system and is validated on every execution; it is
/// only known to be correct for the single subtitle it was generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionScript {
    /// Owning work identifier (repository key)
    pub work_id: i64,
    /// Program text
    pub source: String,
}

impl ExtractionScript {
    pub fn new(work_id: i64, source: impl Into<String>) -> Self {
        Self {
            work_id,
            source: source.into(),
        }
    }
}
