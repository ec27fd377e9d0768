//! HTTP query surface
//!
//! Exposes the query engine as JSON endpoints. Status codes are decided
//! here; the engine only reports found / not found / missing parameter.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::query::{LowestPrice, PriceComparison, PricePoint, PromotionSummary, QueryEngine};

/// Shared application state (read-only query engine)
#[derive(Clone)]
struct AppState {
    engine: Arc<QueryEngine>,
}

/// `?product=` query parameter
#[derive(Deserialize)]
struct ProductParams {
    product: Option<String>,
}

/// `?min_sites=` query parameter
#[derive(Deserialize)]
struct ComparisonParams {
    #[serde(default = "default_min_sites")]
    min_sites: usize,
}

fn default_min_sites() -> usize {
    2
}

/// API response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

fn bad_request<T>(err: impl std::fmt::Display) -> Reply<T> {
    log::debug!("Rejected query: {}", err);
    (StatusCode::BAD_REQUEST, Json(ApiResponse::failed(err.to_string())))
}

/// GET /lowest_price?product={name}
async fn lowest_price_handler(
    State(state): State<AppState>,
    Query(params): Query<ProductParams>,
) -> Reply<LowestPrice> {
    let product = params.product.unwrap_or_default();

    match state.engine.lowest_price(&product) {
        Ok(Some(found)) => (StatusCode::OK, Json(ApiResponse::ok(found))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failed(format!("Product \"{product}\" not found"))),
        ),
        Err(e) => bad_request(e),
    }
}

/// GET /promotions
async fn promotions_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<BTreeMap<String, Vec<PromotionSummary>>>> {
    Json(ApiResponse::ok(state.engine.promotions_by_category()))
}

/// GET /promotions/counts
async fn promotion_counts_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<BTreeMap<String, usize>>> {
    Json(ApiResponse::ok(state.engine.promotion_counts()))
}

/// GET /price_comparison?min_sites={n}
async fn comparison_handler(
    State(state): State<AppState>,
    params: Result<Query<ComparisonParams>, QueryRejection>,
) -> Reply<Vec<PriceComparison>> {
    match params {
        Ok(Query(params)) => (
            StatusCode::OK,
            Json(ApiResponse::ok(state.engine.compare_prices(params.min_sites))),
        ),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

/// GET /price_history?product={name}
async fn history_handler(
    State(state): State<AppState>,
    Query(params): Query<ProductParams>,
) -> Reply<Vec<PricePoint>> {
    let product = params.product.unwrap_or_default();

    match state.engine.price_history(&product) {
        Ok(points) if points.is_empty() => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failed(format!("No price history for \"{product}\""))),
        ),
        Ok(points) => (StatusCode::OK, Json(ApiResponse::ok(points))),
        Err(e) => bad_request(e),
    }
}

/// Build the web server router
pub fn create_router(engine: Arc<QueryEngine>) -> Router {
    let state = AppState { engine };

    Router::new()
        .route("/lowest_price", get(lowest_price_handler))
        .route("/promotions", get(promotions_handler))
        .route("/promotions/counts", get(promotion_counts_handler))
        .route("/price_comparison", get(comparison_handler))
        .route("/price_history", get(history_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server (async)
///
/// Binds to 0.0.0.0 (all interfaces) to work with Docker port mapping.
pub async fn serve(engine: Arc<QueryEngine>, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(engine);
    let addr = format!("0.0.0.0:{}", port);

    log::info!("Query API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
