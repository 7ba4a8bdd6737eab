use serde::{Deserialize, Serialize};

use crate::fetcher::{script::ScriptError, types::EpisodeSubtitle};

/// Schema version accepted by this executor
pub const SCRIPT_VERSION: u32 = 1;
/// Fixed entry point every program must declare
pub const ENTRY_POINT: &str = "extract";
/// Upper bound on program text accepted for parsing
pub const MAX_SCRIPT_BYTES: usize = 64 * 1024;
/// Upper bound on rules per program
pub const MAX_RULES: usize = 512;

/// Declarative extraction program.
///
/// This is the persisted form of a cached answer: a fixed-schema JSON
/// document instead of executable code. Evaluating it against a
/// `(work_id, episode_count)` pair deterministically reconstructs an
/// `EpisodeSubtitle` with no I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptProgram {
    pub version: u32,
    pub entry: String,
    pub rules: Vec<ExtractionRule>,
}

/// One exact-episode extraction rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionRule {
    pub episode: u32,
    pub subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<String>,
}

impl ScriptProgram {
    /// Program with a single rule binding one episode to one subtitle
    pub fn single(episode: u32, subtitle: impl Into<String>) -> Self {
        Self {
            version: SCRIPT_VERSION,
            entry: ENTRY_POINT.to_string(),
            rules: vec![ExtractionRule {
                episode,
                subtitle: subtitle.into(),
                additional_info: None,
                air_date: None,
            }],
        }
    }

    /// Parse and validate untrusted program text.
    ///
    /// Covers the first two stages of the executor state machine: syntactic
    /// validation against the fixed schema, then entry point and bounds
    /// checks. The text is generated by an external system and gets no more
    /// trust than user input.
    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        if source.len() > MAX_SCRIPT_BYTES {
            return Err(ScriptError::TooLarge(source.len()));
        }

        let program: Self = serde_json::from_str(source)?;

        if program.version != SCRIPT_VERSION {
            return Err(ScriptError::Version(program.version));
        }
        if program.entry != ENTRY_POINT {
            return Err(ScriptError::EntryPoint(program.entry.clone()));
        }
        if program.rules.len() > MAX_RULES {
            return Err(ScriptError::RuleCount(program.rules.len()));
        }

        Ok(program)
    }

    /// Evaluate the program for one `(work_id, episode_count)` pair.
    ///
    /// Pure rule lookup. Returns `None` when no rule covers the requested
    /// episode; the caller decides what a miss means.
    pub fn evaluate(&self, work_id: i64, count: u32) -> Option<EpisodeSubtitle> {
        self.rules
            .iter()
            .find(|rule| rule.episode == count)
            .map(|rule| EpisodeSubtitle {
                work_id,
                episode_count: rule.episode,
                subtitle: rule.subtitle.clone(),
                additional_info: rule.additional_info.clone(),
                air_date: rule.air_date.clone(),
            })
    }

    /// Serialize back to persistable program text
    pub fn to_source(&self) -> String {
        serde_json::to_string(self).expect("Failed to serialize script program")
    }
}
