mod browser;
mod http;
mod openrouter;

pub use browser::{BrowserClient, PageFetcher};
pub use http::HttpClient;
pub use openrouter::OpenRouterExtractor;
