use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::constants::WELCOME_MESSAGE;
use crate::dialect::{self, Dialect};
use crate::engine::{extract_metadata, MetadataReport, Schema, SharedEngine};
use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_pretty() -> bool {
    true
}

/// Request payload for translating a query between dialects
#[derive(Deserialize)]
pub struct TranspileRequest {
    pub query: String,
    pub source_dialect: String,
    pub target_dialect: String,
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Serialize)]
pub struct TranspileResponse {
    pub original_query: String,
    pub source_dialect: String,
    pub target_dialect: String,
    pub transpiled_query: String,
}

/// Request payload for metadata extraction
#[derive(Deserialize)]
pub struct QueryInput {
    pub query: String,
    /// Dialect the query is written in; generic SQL when absent
    #[serde(default)]
    pub dialect: Option<String>,
}

#[derive(Deserialize)]
pub struct OptimizationRequest {
    pub query: String,
    pub target: String,
    #[serde(default)]
    pub data_schema: Option<serde_json::Value>,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Serialize)]
pub struct OptimizationResponse {
    pub original_query: String,
    pub optimized_query: String,
}

#[derive(Deserialize)]
pub struct FormatRequest {
    pub query: String,
    pub target: String,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Serialize)]
pub struct FormatResponse {
    pub original_query: String,
    pub formatted_query: String,
}

#[derive(Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct DialectsResponse {
    pub dialects: Vec<&'static str>,
}

/// Greets clients hitting the service root
pub async fn read_root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE,
    })
}

/// Lists every dialect name accepted by the other endpoints
pub async fn list_dialects() -> Json<DialectsResponse> {
    Json(DialectsResponse {
        dialects: Dialect::names().to_vec(),
    })
}

/// Translates a query from `source_dialect` to `target_dialect`
///
/// # Returns
/// * `Result<Json<TranspileResponse>, ApiError>` - Transpiled query, or 406 for an
///   unknown dialect and 422 for SQL that does not parse
#[axum::debug_handler]
pub async fn transpile_sql(
    Extension(engine): Extension<SharedEngine>,
    ApiJson(request): ApiJson<TranspileRequest>,
) -> Result<Json<TranspileResponse>, ApiError> {
    let read: Dialect = request.source_dialect.parse()?;
    let write: Dialect = request.target_dialect.parse()?;
    debug!("Transpiling query from {} to {}", read, write);

    let parsed = engine.parse(&request.query, Some(read))?;
    let transpiled_query = engine.render(&parsed, write, request.pretty)?;

    Ok(Json(TranspileResponse {
        original_query: request.query,
        source_dialect: request.source_dialect,
        target_dialect: request.target_dialect,
        transpiled_query,
    }))
}

/// Extracts tables, columns, clauses and join keys from a query
#[axum::debug_handler]
pub async fn extract_query_metadata(
    Extension(engine): Extension<SharedEngine>,
    ApiJson(request): ApiJson<QueryInput>,
) -> Result<Json<MetadataReport>, ApiError> {
    let read = dialect::parse_optional(request.dialect.as_deref())?;
    let parsed = engine.parse(&request.query, read)?;
    let report = extract_metadata(&parsed.statement);
    debug!(
        "Extracted metadata: {} table(s), {} join key(s)",
        report.metadata.table_expressions.len(),
        report.join_relationships.len()
    );
    Ok(Json(report))
}

/// Optimizes a query against an optional schema and renders it for `target`
#[axum::debug_handler]
pub async fn optimize_sql(
    Extension(engine): Extension<SharedEngine>,
    ApiJson(request): ApiJson<OptimizationRequest>,
) -> Result<Json<OptimizationResponse>, ApiError> {
    let write: Dialect = request.target.parse()?;
    let read = dialect::parse_optional(request.source.as_deref())?;
    let schema = Schema::from_json(request.data_schema.as_ref())?;
    debug!("Optimizing query for {}", write);

    let parsed = engine.parse(&request.query, read)?;
    let optimized = engine.optimize(parsed, &schema)?;
    let optimized_query = engine.render(&optimized, write, request.pretty)?;

    Ok(Json(OptimizationResponse {
        original_query: request.query,
        optimized_query,
    }))
}

/// Re-renders a query for `target`, pretty-printed unless asked otherwise
#[axum::debug_handler]
pub async fn format_sql(
    Extension(engine): Extension<SharedEngine>,
    ApiJson(request): ApiJson<FormatRequest>,
) -> Result<Json<FormatResponse>, ApiError> {
    let write: Dialect = request.target.parse()?;
    let read = dialect::parse_optional(request.source.as_deref())?;
    debug!("Formatting query for {}", write);

    let parsed = engine.parse(&request.query, read)?;
    let formatted_query = engine.render(&parsed, write, request.pretty)?;

    Ok(Json(FormatResponse {
        original_query: request.query,
        formatted_query,
    }))
}
