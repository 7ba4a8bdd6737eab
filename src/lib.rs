pub mod config;
pub mod fetcher;
pub mod routes;

use std::sync::Arc;

use serde::Serialize;

use crate::fetcher::SubtitleFetcher;

/// Shared application state
#[derive(Clone)]
pub struct Ctx {
    pub fetcher: Arc<SubtitleFetcher>,
}

/// Standard API response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}
