use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{ApiResponse, Ctx, fetcher::Work};

/// Subtitle fetch request
#[derive(Debug, Deserialize, Validate)]
pub struct FetchRequest {
    /// Work identifier
    pub work_id: i64,
    /// 1-based episode number
    #[validate(range(min = 1))]
    pub count: u32,
    /// Display title of the work
    pub title: String,
    /// Official site URL, may be empty
    #[serde(default)]
    pub official_url: String,
}

/// Subtitle fetch response
#[derive(Debug, Serialize)]
pub struct FetchResponse {
    pub episode_count: u32,
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_date: Option<String>,
}

// ============ Handlers ============

/// Resolve the subtitle of one episode
/// POST /api/subtitle/fetch
async fn fetch_subtitle(
    State(ctx): State<Ctx>,
    Json(req): Json<FetchRequest>,
) -> Result<Json<ApiResponse<FetchResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    req.validate().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse {
                code: 400,
                message: format!("Invalid request: {e}"),
                data: None,
            }),
        )
    })?;

    let work = Work::new(req.work_id, req.title, req.official_url);

    // "Nothing found anywhere" is a legitimate outcome, not a server error.
    let subtitle = ctx.fetcher.fetch(&work, req.count).await.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse {
                code: 404,
                message: "Subtitle not found".to_string(),
                data: None,
            }),
        )
    })?;

    Ok(Json(ApiResponse {
        code: 200,
        message: "Subtitle resolved".to_string(),
        data: Some(FetchResponse {
            episode_count: subtitle.episode_count,
            subtitle: subtitle.subtitle,
            additional_info: subtitle.additional_info,
            air_date: subtitle.air_date,
        }),
    }))
}

/// Mount subtitle routes
pub fn mount() -> Router<Ctx> {
    Router::new().route("/subtitle/fetch", post(fetch_subtitle))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::fetcher::{
        MemoryScriptStore, ScriptExecutor, SubtitleFetcher, mock::MockAiExtractor,
    };

    fn test_app(ai: MockAiExtractor) -> Router {
        let fetcher = SubtitleFetcher::new(
            Arc::new(MemoryScriptStore::new()),
            Arc::new(ai),
            Arc::new(ScriptExecutor::new()),
        );
        let ctx = Ctx {
            fetcher: Arc::new(fetcher),
        };

        Router::new()
            .nest("/api", crate::routes::api::mount())
            .with_state(ctx)
    }

    async fn post_fetch(app: Router, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/subtitle/fetch")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }

    #[tokio::test]
    async fn test_fetch_returns_subtitle() {
        let app = test_app(MockAiExtractor::found("第1話のタイトル"));

        let (status, body) = post_fetch(
            app,
            json!({
                "work_id": 1,
                "count": 1,
                "title": "Example A",
                "official_url": "https://example.jp"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["episode_count"], 1);
        assert_eq!(body["data"]["subtitle"], "第1話のタイトル");
    }

    #[tokio::test]
    async fn test_fetch_miss_is_not_found() {
        let app = test_app(MockAiExtractor::nothing());

        let (status, body) = post_fetch(
            app,
            json!({
                "work_id": 1,
                "count": 3,
                "title": "Example A",
                "official_url": ""
            }),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
    }

    #[tokio::test]
    async fn test_fetch_rejects_zero_episode() {
        let app = test_app(MockAiExtractor::found("unused"));

        let (status, _) = post_fetch(
            app,
            json!({
                "work_id": 1,
                "count": 0,
                "title": "Example A"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
