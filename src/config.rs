use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application settings.
///
/// Read from an optional `jimaku.toml` next to the binary, overridden by
/// `JIMAKU__`-prefixed environment variables (`JIMAKU__SERVER__PORT=9000`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub log: LogConfig,
    pub fetcher: FetcherConfig,
    pub ai: AiConfig,
    pub browser: BrowserConfig,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings: Self = Config::builder()
            .add_source(File::with_name("jimaku").required(false))
            .add_source(Environment::with_prefix("JIMAKU").separator("__"))
            .build()?
            .try_deserialize()?;

        // The key the AI backend itself documents takes effect without any
        // jimaku-specific configuration.
        if settings.ai.api_key.is_empty()
            && let Ok(key) = std::env::var("OPENROUTER_API_KEY")
        {
            settings.ai.api_key = key;
        }

        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whole-request bound; must stay above the AI lookup timeout
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 90,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://jimaku.db".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
    /// When set, logs are also written to daily-rolling files here
    pub dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "jimaku=debug,tower_http=info".to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Wall-clock bound on one script execution
    pub script_timeout_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            script_timeout_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// OpenRouter API key; falls back to `OPENROUTER_API_KEY`
    pub api_key: String,
    pub base_url: String,
    /// Model with web search enabled
    pub model: String,
    /// Generous bound, the backend performs live web search
    pub timeout_secs: u64,
    pub search_context_size: String,
    pub max_search_results: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-5-mini:online".to_string(),
            timeout_secs: 60,
            search_context_size: "high".to_string(),
            max_search_results: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Base URL of the headless-browser rendering sidecar; page probing is
    /// skipped entirely when unset
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 30,
        }
    }
}
