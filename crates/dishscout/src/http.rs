//! HTTP JSON API.
//!
//! Routes:
//!
//! - `GET /v1/health` - liveness plus loaded record counts
//! - `GET /v1/stats` - the dataset load report
//! - `GET /v1/recommend?dish=..` - search with query-string parameters
//! - `POST /v1/recommend` - search with a JSON [`SearchRequest`] body
//!
//! Searches run on the blocking pool; the dataset is shared read-only.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use dishscout_core::{Dataset, LoadReport, QueryError, SearchDefaults, SearchRequest, run_search};

/// Shared server state.
pub struct AppState {
    dataset: Arc<Dataset>,
    report: LoadReport,
    defaults: SearchDefaults,
}

impl AppState {
    /// Wrap a loaded dataset for serving.
    pub fn new(dataset: Arc<Dataset>, report: LoadReport, defaults: SearchDefaults) -> Self {
        Self {
            dataset,
            report,
            defaults,
        }
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/recommend", get(get_recommend).post(post_recommend))
        .route("/v1/stats", get(handle_stats))
        .route("/v1/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Error response for a failed search or a request axum could not extract.
#[derive(Debug)]
enum ApiError {
    Rejected(StatusCode, String),
    Query(QueryError),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::Rejected(status, msg) => (status, msg),
            Self::Query(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    businesses: usize,
    reviews: usize,
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        businesses: state.dataset.catalog().len(),
        reviews: state.dataset.corpus().len(),
    })
}

async fn handle_stats(State(state): State<Arc<AppState>>) -> Json<LoadReport> {
    Json(state.report.clone())
}

async fn get_recommend(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchRequest>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(request) = query.map_err(|e| ApiError::Rejected(e.status(), e.body_text()))?;
    recommend(state, request).await
}

async fn post_recommend(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::Rejected(e.status(), e.body_text()))?;
    recommend(state, request).await
}

async fn recommend(state: Arc<AppState>, request: SearchRequest) -> Result<Response, ApiError> {
    tracing::debug!(dish = %request.dish, view = ?request.view, "recommend request");

    let outcome = tokio::task::spawn_blocking(move || {
        run_search(&state.dataset, &request, &state.defaults)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("search task failed: {e}")))?
    .map_err(ApiError::Query)?;

    Ok(Json(outcome).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        let businesses = [
            r#"{"business_id":"tt","name":"Taco Town","latitude":33.45,"longitude":-112.07,"open":true}"#,
            r#"{"business_id":"cc","name":"Closed Cantina","latitude":33.4,"longitude":-112.0,"open":false}"#,
        ]
        .join("\n");
        let reviews = [
            r#"{"business_id":"tt","stars":4,"text":"Tacos, tacos, tacos"}"#,
            r#"{"business_id":"tt","stars":1,"text":"bad tacos"}"#,
            r#"{"business_id":"cc","stars":5,"text":"tacos"}"#,
        ]
        .join("\n");
        let (dataset, report) = Dataset::from_readers(businesses.as_bytes(), reviews.as_bytes());
        router(Arc::new(AppState::new(
            Arc::new(dataset),
            report,
            SearchDefaults::default(),
        )))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let (status, json) = get_json("/v1/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["businesses"], 1);
        assert_eq!(json["reviews"], 2);
    }

    #[tokio::test]
    async fn stats_returns_load_report() {
        let (status, json) = get_json("/v1/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["businesses"]["loaded"], 1);
        assert_eq!(json["reviews"]["unknown_business"], 1);
    }

    #[tokio::test]
    async fn get_recommend_uses_query_parameters() {
        let (status, json) =
            get_json("/v1/recommend?dish=Tacos&min_mentions=1&min_reviews=1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["recommendations"][0]["name"], "Taco Town");
        assert_eq!(json["recommendations"][0]["mentions"], 4);
        assert_eq!(json["recommendations"][0]["score"], 13.0);
    }

    #[tokio::test]
    async fn get_recommend_applies_default_thresholds() {
        let (status, json) = get_json("/v1/recommend?dish=tacos").await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["recommendations"].as_array().unwrap().is_empty());
        assert_eq!(json["notices"][0]["kind"], "no_results");
    }

    #[tokio::test]
    async fn post_recommend_with_map_view() {
        let body = serde_json::json!({
            "dish": "tacos",
            "min_mentions": 1,
            "min_reviews": 1,
            "num_display": 900,
            "view": "map"
        });
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/recommend")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["num_display"], 500);
        assert_eq!(json["notices"][0]["kind"], "limit_clamped");
        assert_eq!(json["map"]["markers"][0]["tooltip"], "1. Taco Town");
    }

    #[tokio::test]
    async fn blank_dish_is_bad_request() {
        let (status, json) = get_json("/v1/recommend?dish=%20%20").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Please enter a dish name to search for.");
    }

    #[tokio::test]
    async fn missing_dish_is_bad_request() {
        let (status, json) = get_json("/v1/recommend").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Please enter a dish name to search for.");
    }

    #[tokio::test]
    async fn non_numeric_limit_is_json_bad_request() {
        let (status, json) = get_json("/v1/recommend?dish=tacos&num_display=abc").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn malformed_body_is_json_bad_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/recommend")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"dish\": "))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].is_string());
    }
}
