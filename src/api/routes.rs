//! API routes configuration module

use crate::api::errors::api_error;
use crate::api::handlers::{
    extract_query_metadata, format_sql, list_dialects, optimize_sql, read_root, transpile_sql,
};
use crate::config::ServerConfig;
use crate::engine::SharedEngine;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Router,
};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Creates and configures the API router with all routes
///
/// # Arguments
/// * `engine` - SQL engine shared across handlers
/// * `server` - Prefix and CORS settings
/// * `timeout` - Upper bound on the time spent handling a single request
///
/// # Returns
/// * `Router` - Configured router with all API endpoints and middleware
pub fn app(engine: SharedEngine, server: &ServerConfig, timeout: Duration) -> Router {
    let sql_routes = Router::new()
        .route("/dialects", get(list_dialects))
        .route("/transpile", post(transpile_sql))
        .route("/metadata", post(extract_query_metadata))
        .route("/optimize", post(optimize_sql))
        .route("/format", post(format_sql));

    let router = Router::new().route("/", get(read_root));
    let router = if server.prefix.is_empty() {
        router.merge(sql_routes)
    } else {
        router.nest(&server.prefix, sql_routes)
    };

    let router = with_timeout(router.layer(Extension(engine)), timeout).layer(
        TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                id = %Uuid::new_v4(),
                method = %request.method(),
                uri = %request.uri()
            )
        }),
    );

    if server.cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Bounds request handling time, answering late requests with a 408 `ApiError`
fn with_timeout(router: Router, timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::map_response(timeout_error))
}

async fn timeout_error(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return api_error(StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response();
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SqlParserEngine;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        app(
            SqlParserEngine::shared(),
            &ServerConfig::default(),
            Duration::from_secs(5),
        )
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(test_app(), request).await
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(router, request).await
    }

    #[tokio::test]
    async fn test_root_welcome() {
        let (status, body) = get_json(test_app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Welcome to the SQLBreeze API Service"}));
    }

    #[tokio::test]
    async fn test_list_dialects() {
        let (status, body) = get_json(test_app(), "/sqlbreeze/dialects").await;
        assert_eq!(status, StatusCode::OK);
        let dialects = body["dialects"].as_array().unwrap();
        assert_eq!(dialects.len(), 26);
        assert_eq!(dialects[0], "athena");
    }

    #[tokio::test]
    async fn test_transpile() {
        let (status, body) = post_json(
            "/sqlbreeze/transpile",
            json!({
                "query": "SELECT `id`, IFNULL(name, '') FROM `users`",
                "source_dialect": "mysql",
                "target_dialect": "postgres",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "original_query": "SELECT `id`, IFNULL(name, '') FROM `users`",
                "source_dialect": "mysql",
                "target_dialect": "postgres",
                "transpiled_query": "SELECT \"id\", COALESCE(name, '') FROM \"users\"",
            })
        );
    }

    #[tokio::test]
    async fn test_transpile_unknown_dialect() {
        let (status, body) = post_json(
            "/sqlbreeze/transpile",
            json!({"query": "SELECT 1", "source_dialect": "mysql", "target_dialect": "cobol"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
        assert_eq!(
            body["detail"],
            "Unsupported SQL dialect: Unknown dialect 'cobol'"
        );
        assert_eq!(body["code"], 406);
    }

    #[tokio::test]
    async fn test_transpile_malformed_sql() {
        let (status, body) = post_json(
            "/sqlbreeze/transpile",
            json!({"query": "SELECT * FROM (", "source_dialect": "postgres", "target_dialect": "mysql"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Failed to parse SQL: "));
    }

    #[tokio::test]
    async fn test_missing_field_is_invalid_request() {
        let (status, body) = post_json(
            "/sqlbreeze/transpile",
            json!({"query": "SELECT 1", "source_dialect": "mysql"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Invalid request: "));
        assert!(detail.contains("target_dialect"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/sqlbreeze/format")
            .header("content-type", "application/json")
            .body(Body::from("{\"query\": "))
            .unwrap();
        let (status, body) = send(test_app(), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request: "));
    }

    #[tokio::test]
    async fn test_format_compact() {
        let (status, body) = post_json(
            "/sqlbreeze/format",
            json!({"query": "select a,b from t where a>1", "target": "duckdb", "pretty": false}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["original_query"], "select a,b from t where a>1");
        assert_eq!(body["formatted_query"], "SELECT a, b FROM t WHERE a > 1");
    }

    #[tokio::test]
    async fn test_format_defaults_to_pretty() {
        let (status, body) = post_json(
            "/sqlbreeze/format",
            json!({"query": "select a from t", "target": "postgres"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let formatted = body["formatted_query"].as_str().unwrap();
        assert_eq!(
            formatted.split_whitespace().collect::<Vec<_>>().join(" "),
            "SELECT a FROM t"
        );
    }

    #[tokio::test]
    async fn test_format_unknown_target() {
        let (status, _) = post_json(
            "/sqlbreeze/format",
            json!({"query": "SELECT 1", "target": "excel"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    }

    #[tokio::test]
    async fn test_optimize_with_schema() {
        let (status, body) = post_json(
            "/sqlbreeze/optimize",
            json!({
                "query": "SELECT * FROM users WHERE 1 = 1 AND age > 18",
                "target": "postgres",
                "data_schema": {"users": {"id": "INT", "age": "INT"}},
                "pretty": false,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["optimized_query"],
            "SELECT users.id, users.age FROM users WHERE users.age > 18"
        );
    }

    #[tokio::test]
    async fn test_optimize_invalid_schema() {
        let (status, body) = post_json(
            "/sqlbreeze/optimize",
            json!({"query": "SELECT 1", "target": "postgres", "data_schema": ["users"]}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("An unexpected error occurred: Invalid schema"));
    }

    #[tokio::test]
    async fn test_metadata() {
        let (status, body) = post_json(
            "/sqlbreeze/metadata",
            json!({"query": "SELECT a.x FROM a AS a JOIN b AS bb ON a.id = bb.a_id"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["table_expressions"], json!(["a AS a", "b AS bb"]));
        assert_eq!(body["metadata"]["limits"], json!([]));
        assert_eq!(
            body["join_relationships"],
            json!([{
                "left_table": "a",
                "left_column": "id",
                "right_table": "b",
                "right_column": "a_id",
            }])
        );
    }

    #[tokio::test]
    async fn test_metadata_empty_query() {
        let (status, body) = post_json("/sqlbreeze/metadata", json!({"query": ""})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["detail"],
            "Failed to parse SQL: No expression was parsed from ''"
        );
    }

    #[tokio::test]
    async fn test_timeout_has_error_body() {
        let slow = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "done"
            }),
        );
        let router = with_timeout(slow, Duration::from_millis(20));
        let (status, body) = get_json(router, "/slow").await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body, json!({"detail": "Request timed out", "code": 408}));
    }

    #[tokio::test]
    async fn test_custom_prefix() {
        let server = ServerConfig {
            prefix: "/api".to_string(),
            ..ServerConfig::default()
        };
        let router = app(SqlParserEngine::shared(), &server, Duration::from_secs(5));
        let (status, _) = get_json(router, "/api/dialects").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_empty_prefix_mounts_at_root() {
        let server = ServerConfig {
            prefix: String::new(),
            ..ServerConfig::default()
        };
        let router = app(SqlParserEngine::shared(), &server, Duration::from_secs(5));
        let (status, body) = get_json(router, "/dialects").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dialects"].as_array().unwrap().len(), 26);
    }
}
