use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::fetcher::{Result, provider::http::HttpClient};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("Invalid regex"));

/// Opaque browser-automation capability: URL in, rendered page text out.
///
/// Official anime sites routinely build their episode lists with
/// JavaScript, so plain HTTP GET is not enough; rendering is delegated to
/// an external service.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// Client for a headless-browser rendering sidecar.
///
/// The sidecar exposes one call: `POST /render {"url": ...}` returning
/// `{"content": ...}` with the page text after scripts have run.
pub struct BrowserClient {
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct RenderResponse {
    content: String,
}

impl BrowserClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: HttpClient::with_timeout(endpoint, timeout),
        }
    }
}

#[async_trait]
impl PageFetcher for BrowserClient {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response: RenderResponse = self.http.post_json("/render", &RenderRequest { url }).await?;
        Ok(strip_markup(&response.content))
    }
}

/// Reduce rendered page output to plain text: drop tags, squeeze whitespace
pub(crate) fn strip_markup(text: &str) -> String {
    let stripped = TAG_RE.replace_all(text, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::strip_markup;

    #[test]
    fn test_strip_markup_drops_tags() {
        let text = "<ul><li>第1話 はじまり</li>\n<li>第2話   つづき</li></ul>";
        assert_eq!(strip_markup(text), "第1話 はじまり 第2話 つづき");
    }

    #[test]
    fn test_strip_markup_keeps_plain_text() {
        assert_eq!(strip_markup("第3話 おわり"), "第3話 おわり");
    }
}
