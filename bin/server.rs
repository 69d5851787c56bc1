// Asset Tracker - Web Server
// JSON API over the same tracker the CLI and TUI use

use anyhow::{Context, Result};
use asset_tracker::{
    logging, AssetId, AssetRecord, AssetTracker, AssetType, CatalogError, CategoryIndicator,
    DynGateway, MutationReport, Settings, TrackerError, ViewState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared application state
///
/// One tracker behind one lock: mutations (and their saves) run one at a time.
#[derive(Clone)]
struct AppState {
    tracker: Arc<Mutex<AssetTracker<DynGateway>>>,
}

impl AppState {
    fn tracker(&self) -> MutexGuard<'_, AssetTracker<DynGateway>> {
        // A panicked handler cannot leave the catalog half-mutated, so a
        // poisoned lock is still safe to use.
        self.tracker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Category names are matched the way the CLI matches them ("electronics" works)
fn deserialize_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AssetType, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(de::Error::custom)
}

fn deserialize_optional_type<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<AssetType>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

/// Request body for create/replace
#[derive(Deserialize)]
struct AssetInput {
    #[serde(rename = "type", deserialize_with = "deserialize_type")]
    asset_type: AssetType,
    value: u64,
    name: String,
    description: String,
}

impl From<AssetInput> for AssetRecord {
    fn from(input: AssetInput) -> Self {
        AssetRecord::new(input.asset_type, input.value, &input.name, &input.description)
    }
}

/// Result of a mutation
#[derive(Serialize)]
struct MutationResponse {
    asset: AssetRecord,
    persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    save_error: Option<String>,
}

impl From<MutationReport> for MutationResponse {
    fn from(report: MutationReport) -> Self {
        Self {
            persisted: report.is_persisted(),
            save_error: report.save_error.map(|e| e.to_string()),
            asset: report.record,
        }
    }
}

#[derive(Serialize)]
struct ViewResponse {
    view: ViewState,
    indicators: Vec<CategoryIndicator>,
}

#[derive(Deserialize)]
struct TypeQuery {
    #[serde(rename = "type", default, deserialize_with = "deserialize_optional_type")]
    asset_type: Option<AssetType>,
}

fn error_response(err: TrackerError) -> Response {
    let status = match &err {
        TrackerError::Catalog(CatalogError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        TrackerError::Catalog(CatalogError::NotFound(_)) => StatusCode::NOT_FOUND,
        TrackerError::Session(_) => StatusCode::CONFLICT,
    };
    (status, Json(ApiResponse::err(err.to_string()))).into_response()
}

fn parse_id(raw: &str) -> Result<AssetId, Response> {
    raw.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err(format!("'{}' is not an asset id", raw))),
        )
            .into_response()
    })
}

fn mutation_response(status: StatusCode, result: Result<MutationReport, TrackerError>) -> Response {
    match result {
        Ok(report) => {
            if let Some(e) = &report.save_error {
                error!("Asset change kept in memory only: {}", e);
            }
            (status, Json(ApiResponse::ok(MutationResponse::from(report)))).into_response()
        }
        Err(e) => error_response(e),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/assets[?type=Electronics] - All assets, or one category
async fn list_assets(State(state): State<AppState>, Query(query): Query<TypeQuery>) -> Response {
    let tracker = state.tracker();
    let assets = match query.asset_type {
        Some(asset_type) => tracker.catalog().all_of_type(asset_type),
        None => tracker.catalog().records().to_vec(),
    };
    Json(ApiResponse::ok(assets)).into_response()
}

/// GET /api/assets/:id
async fn get_asset(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.tracker().catalog().get(id) {
        Some(record) => Json(ApiResponse::ok(record.clone())).into_response(),
        None => error_response(CatalogError::NotFound(id).into()),
    }
}

/// POST /api/assets
async fn create_asset(State(state): State<AppState>, Json(input): Json<AssetInput>) -> Response {
    let result = state.tracker().add_record(input.into());
    mutation_response(StatusCode::CREATED, result)
}

/// PUT /api/assets/:id
async fn replace_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<AssetInput>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let result = state.tracker().replace_record(id, input.into());
    mutation_response(StatusCode::OK, result)
}

/// DELETE /api/assets/:id
async fn delete_asset(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let result = state.tracker().delete_record(id);
    mutation_response(StatusCode::OK, result)
}

/// GET /api/view[?type=Electronics] - List-screen state, optionally selecting a category first
async fn get_view(State(state): State<AppState>, Query(query): Query<TypeQuery>) -> Response {
    let mut tracker = state.tracker();
    let view = match query.asset_type {
        Some(asset_type) => tracker.select_category(asset_type),
        None => tracker.view_state(),
    };
    let indicators = tracker.view().all_indicators(tracker.catalog());
    Json(ApiResponse::ok(ViewResponse { view, indicators })).into_response()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;
    logging::init_stderr(&settings.log_filter)?;

    let gateway = settings.open_gateway()?;
    let tracker = AssetTracker::open(gateway, settings.slot_capacity);
    info!(assets = tracker.catalog().len(), "asset catalog ready");

    // Create shared state
    let state = AppState {
        tracker: Arc::new(Mutex::new(tracker)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/assets", get(list_assets).post(create_asset))
        .route(
            "/assets/:id",
            get(get_asset).put(replace_asset).delete(delete_asset),
        )
        .route("/view", get(get_view))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr)
        .await
        .with_context(|| format!("Binding {}", settings.server_addr))?;

    info!("Server running on http://{}", settings.server_addr);
    println!("\n🚀 Server running on http://{}", settings.server_addr);
    println!("   API: http://{}/api/assets", settings.server_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server stopped")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    fn type_query(uri: &str) -> Option<Option<AssetType>> {
        let uri: Uri = uri.parse().unwrap();
        Query::<TypeQuery>::try_from_uri(&uri)
            .ok()
            .map(|Query(query)| query.asset_type)
    }

    #[test]
    fn test_type_query_ignores_case() {
        assert_eq!(
            type_query("/api/assets?type=electronics"),
            Some(Some(AssetType::Electronics))
        );
        assert_eq!(
            type_query("/api/view?type=ComRealEstate"),
            Some(Some(AssetType::ComRealEstate))
        );
        assert_eq!(type_query("/api/assets"), Some(None));
        assert_eq!(type_query("/api/assets?type="), Some(None));
        assert_eq!(type_query("/api/assets?type=spaceships"), None);
    }

    #[test]
    fn test_asset_body_type_ignores_case() {
        let input: AssetInput = serde_json::from_str(
            r#"{"type": "realestate", "value": 1, "name": "Flat", "description": "City flat"}"#,
        )
        .unwrap();
        assert_eq!(input.asset_type, AssetType::RealEstate);

        let record = AssetRecord::from(input);
        assert!(record.is_valid());

        let unknown = serde_json::from_str::<AssetInput>(
            r#"{"type": "spaceships", "value": 1, "name": "X", "description": "Y"}"#,
        );
        assert!(unknown.is_err());
    }
}
