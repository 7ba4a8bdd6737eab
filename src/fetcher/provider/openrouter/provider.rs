use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use super::api_types::*;
use crate::config::AiConfig;
use crate::fetcher::{
    Result,
    provider::{browser::PageFetcher, http::HttpClient},
    script::ScriptProgram,
    traits::AiExtractor,
    types::{EpisodeSubtitle, ExtractionScript, UNKNOWN_SUBTITLE, Work},
};

/// Longest page excerpt folded into the prompt
const MAX_PAGE_EXCERPT_CHARS: usize = 4000;

/// AI extractor backed by the OpenRouter web-search API.
///
/// Two-step lookup: when the work has an official URL and a page fetcher is
/// configured, candidate episode pages are rendered first and a page that
/// mentions the target episode is handed to the model as primary evidence;
/// the model then answers with a schema-constrained JSON payload, searching
/// the web itself where the page evidence is missing or insufficient.
///
/// Every failure mode (missing key, transport error, malformed payload,
/// nothing found) collapses to `(None, None)`.
pub struct OpenRouterExtractor {
    http: HttpClient,
    config: AiConfig,
    page_fetcher: Option<Arc<dyn PageFetcher>>,
}

impl OpenRouterExtractor {
    pub fn new(config: AiConfig) -> Self {
        Self::with_page_fetcher(config, None)
    }

    pub fn with_page_fetcher(config: AiConfig, page_fetcher: Option<Arc<dyn PageFetcher>>) -> Self {
        let http = HttpClient::with_timeout(
            config.base_url.as_str(),
            Duration::from_secs(config.timeout_secs),
        );

        Self {
            http,
            config,
            page_fetcher,
        }
    }

    /// Try to read the episode page straight off the official site.
    ///
    /// Returns rendered text of the first candidate page that mentions the
    /// target episode. Probe failures are non-fatal; the web search still
    /// runs without page evidence.
    async fn probe_official_site(&self, base_url: &str, count: u32) -> Option<String> {
        let fetcher = self.page_fetcher.as_ref()?;

        for url in candidate_urls(base_url, count) {
            match fetcher.fetch_page(&url).await {
                Ok(text) if mentions_episode(&text, count) => {
                    info!("Found episode {count} on official site: {url}");
                    let excerpt: String = text.chars().take(MAX_PAGE_EXCERPT_CHARS).collect();
                    return Some(format!("URL: {url}\n{excerpt}"));
                }
                Ok(_) => debug!("No episode {count} mention at {url}"),
                Err(e) => debug!("Page fetch failed for {url}: {e}"),
            }
        }

        None
    }

    async fn search_subtitle(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: json!({
                    "name": "subtitle_response",
                    "strict": true,
                    "schema": {
                        "type": "object",
                        "properties": {
                            "subtitle": { "type": "string" }
                        },
                        "required": ["subtitle"],
                        "additionalProperties": false
                    }
                }),
            },
            web_search_options: WebSearchOptions {
                search_context_size: self.config.search_context_size.clone(),
                max_search_results: self.config.max_search_results,
            },
        };

        let response: ChatResponse = self
            .http
            .post_json_auth("/chat/completions", &request, &self.config.api_key)
            .await?;

        let content = response
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| {
                crate::fetcher::FetcherError::Parse("No choices in response".to_string())
            })?;

        let payload: SubtitlePayload = serde_json::from_str(content).map_err(|e| {
            crate::fetcher::FetcherError::Parse(format!("Malformed subtitle payload: {e}"))
        })?;

        Ok(payload.subtitle)
    }
}

#[async_trait]
impl AiExtractor for OpenRouterExtractor {
    async fn lookup(
        &self,
        work: &Work,
        count: u32,
    ) -> (Option<EpisodeSubtitle>, Option<ExtractionScript>) {
        if self.config.api_key.is_empty() {
            warn!("No OpenRouter API key configured, skipping AI lookup");
            return (None, None);
        }

        let page_evidence = match work.official_url.as_deref() {
            Some(url) => self.probe_official_site(url, count).await,
            None => None,
        };

        let prompt = build_prompt(
            &work.title,
            count,
            work.official_url.as_deref(),
            page_evidence.as_deref(),
        );

        let subtitle = match self.search_subtitle(&prompt).await {
            Ok(subtitle) => subtitle,
            Err(e) => {
                warn!("AI lookup failed for \"{}\" episode {count}: {e}", work.title);
                return (None, None);
            }
        };

        let subtitle = subtitle.trim();
        if subtitle.is_empty() || subtitle == UNKNOWN_SUBTITLE {
            info!(
                "AI could not determine subtitle for \"{}\" episode {count}",
                work.title
            );
            return (None, None);
        }

        let episode = EpisodeSubtitle::new(work.id, count, subtitle);
        let script = ExtractionScript::new(work.id, ScriptProgram::single(count, subtitle).to_source());

        (Some(episode), Some(script))
    }
}

/// Candidate episode page URLs on the official site, most specific first
fn candidate_urls(base_url: &str, count: u32) -> Vec<String> {
    let base = base_url.trim_end_matches('/');

    vec![
        format!("{base}/story/?id={count}"),
        format!("{base}/story/"),
        format!("{base}/episode/{count}/"),
        format!("{base}/ep{count:02}/"),
        base.to_string(),
    ]
}

fn mentions_episode(text: &str, count: u32) -> bool {
    text.contains(&format!("第{count}話")) || text.contains(&format!("{count}話"))
}

/// Build the lookup prompt.
///
/// Steers toward Japanese official sources; that bias lives here in the
/// collaborator, never in the orchestrator.
fn build_prompt(
    title: &str,
    count: u32,
    official_url: Option<&str>,
    page_evidence: Option<&str>,
) -> String {
    let url_text = official_url
        .map(|url| format!("\n- 公式サイト: {url}"))
        .unwrap_or_default();

    match page_evidence {
        Some(page) => format!(
            "アニメ「{title}」の第{count}話の正式なサブタイトルを特定してください。\n\
             - アニメタイトル: {title}\n\
             - エピソード: 第{count}話{url_text}\n\
             \n\
             公式サイトから取得したページ内容:\n\
             ```\n{page}\n```\n\
             \n\
             上記の内容から第{count}話のサブタイトルを特定してください。\
             不十分な場合のみ追加のweb検索を行い、日本語の公式サイトを最優先に\
             複数のソースで照合してください。\n\
             返答は次の形式のJSONで返してください: {{\"subtitle\": \"ここにサブタイトル\"}}\n\
             確実な情報が見つからない場合のみ「{UNKNOWN_SUBTITLE}」としてください。"
        ),
        None => format!(
            "アニメ「{title}」の第{count}話の正式なサブタイトルを、インターネット上の\
             公式情報から調べてください。\n\
             - アニメタイトル: {title}\n\
             - エピソード: 第{count}話{url_text}\n\
             \n\
             検索の優先順位:\n\
             1. 公式サイトのストーリー/エピソード一覧ページ\n\
             2. ja.wikipedia.org のエピソード一覧\n\
             3. 公式SNSでの各話告知、アニメニュースサイト\n\
             \n\
             第{count}話の情報であることを必ず確認し、サブタイトルは日本語で取得し、\
             複数のソースで照合してください。\n\
             返答は次の形式のJSONで返してください: {{\"subtitle\": \"ここにサブタイトル\"}}\n\
             確実な情報が見つからない場合のみ「{UNKNOWN_SUBTITLE}」としてください。"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetcherError;
    use async_trait::async_trait;

    struct StaticPageFetcher {
        content: String,
    }

    #[async_trait]
    impl PageFetcher for StaticPageFetcher {
        async fn fetch_page(&self, _url: &str) -> Result<String> {
            Ok(self.content.clone())
        }
    }

    struct FailingPageFetcher;

    #[async_trait]
    impl PageFetcher for FailingPageFetcher {
        async fn fetch_page(&self, url: &str) -> Result<String> {
            Err(FetcherError::Parse(format!("unreachable: {url}")))
        }
    }

    #[test]
    fn test_candidate_urls_patterns() {
        let urls = candidate_urls("https://example.jp/", 5);

        assert_eq!(urls[0], "https://example.jp/story/?id=5");
        assert_eq!(urls[2], "https://example.jp/episode/5/");
        assert_eq!(urls[3], "https://example.jp/ep05/");
        assert_eq!(urls.last().unwrap(), "https://example.jp");
    }

    #[test]
    fn test_mentions_episode() {
        assert!(mentions_episode("あらすじ 第5話 はじまり", 5));
        assert!(mentions_episode("5話のあらすじ", 5));
        assert!(!mentions_episode("第4話のあらすじ", 5));
    }

    #[test]
    fn test_prompt_includes_work_details() {
        let prompt = build_prompt("薫る花は凛と咲く", 5, Some("https://example.jp"), None);

        assert!(prompt.contains("薫る花は凛と咲く"));
        assert!(prompt.contains("第5話"));
        assert!(prompt.contains("https://example.jp"));
        assert!(prompt.contains(UNKNOWN_SUBTITLE));
    }

    #[test]
    fn test_prompt_prefers_page_evidence() {
        let prompt = build_prompt("Example", 2, None, Some("URL: x\n第2話 タイトル"));

        assert!(prompt.contains("第2話 タイトル"));
    }

    #[tokio::test]
    async fn test_lookup_without_api_key_is_absent() {
        let extractor = OpenRouterExtractor::new(AiConfig::default());
        let work = Work::new(1, "Example", "");

        let (subtitle, script) = extractor.lookup(&work, 1).await;

        assert!(subtitle.is_none());
        assert!(script.is_none());
    }

    #[tokio::test]
    async fn test_probe_finds_episode_mention() {
        let fetcher = StaticPageFetcher {
            content: "ストーリー 第3話 約束の場所".to_string(),
        };
        let extractor = OpenRouterExtractor::with_page_fetcher(
            AiConfig::default(),
            Some(std::sync::Arc::new(fetcher)),
        );

        let evidence = extractor.probe_official_site("https://example.jp", 3).await;

        assert!(evidence.is_some());
        assert!(evidence.unwrap().contains("第3話"));
    }

    #[tokio::test]
    async fn test_probe_survives_fetch_failures() {
        let extractor = OpenRouterExtractor::with_page_fetcher(
            AiConfig::default(),
            Some(std::sync::Arc::new(FailingPageFetcher)),
        );

        let evidence = extractor.probe_official_site("https://example.jp", 3).await;

        assert!(evidence.is_none());
    }
}
