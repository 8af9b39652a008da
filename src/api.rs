use axum::{
    extract::{Json, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{error, info};

use crate::{
    app_state::{AppState, Status},
    models::{AggregateRow, ChartArtifact, ChartOutcome, Product},
    search,
};

const CHART_FALLBACK_MESSAGE: &str = "Could not load visualization.";

// --- Payloads y Respuestas de la API ---

#[derive(Deserialize, Default)]
pub struct SearchParams {
    #[serde(default)]
    query: Option<String>,
}

#[derive(Serialize)]
pub struct ListingResponse {
    query: String,
    total: usize,
    products: Vec<Product>,
}

#[derive(Serialize)]
pub struct ChartPayload {
    media_type: &'static str,
    data_uri: String,
    width: u32,
    height: u32,
    generated_at: DateTime<Utc>,
}

impl From<&ChartArtifact> for ChartPayload {
    fn from(artifact: &ChartArtifact) -> Self {
        Self {
            media_type: artifact.media_type,
            data_uri: artifact.to_data_uri(),
            width: artifact.width,
            height: artifact.height,
            generated_at: artifact.generated_at,
        }
    }
}

// El listado y el gráfico son independientes: el gráfico siempre se calcula
// sobre el catálogo completo, sin filtrar.
#[derive(Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    listing: ListingResponse,
    chart: Option<ChartPayload>,
    chart_message: Option<&'static str>,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/products", get(products_handler))
        .route("/api/search", post(search_handler))
        .route("/api/chart", get(chart_handler))
        .route("/api/aggregates", get(aggregates_handler))
        .route("/api/status", get(status_handler))
        .route("/api/shutdown", post(shutdown_handler))
        .with_state(app_state)
}

// --- Handlers ---

#[axum::debug_handler]
async fn products_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<ListingResponse> {
    Json(build_listing(&state, params.query.as_deref().unwrap_or_default()))
}

#[axum::debug_handler]
async fn search_handler(
    State(state): State<AppState>,
    Json(payload): Json<SearchParams>,
) -> Json<DashboardResponse> {
    let listing = build_listing(&state, payload.query.as_deref().unwrap_or_default());
    let outcome = render_chart(&state).await;

    let chart = outcome.artifact().map(ChartPayload::from);
    let chart_message = (!outcome.is_chart()).then_some(CHART_FALLBACK_MESSAGE);

    Json(DashboardResponse {
        listing,
        chart,
        chart_message,
    })
}

#[axum::debug_handler]
async fn chart_handler(State(state): State<AppState>) -> Response {
    match render_chart(&state).await {
        ChartOutcome::Chart(artifact) => {
            ([(header::CONTENT_TYPE, artifact.media_type)], artifact.bytes).into_response()
        }
        ChartOutcome::NoChart => StatusCode::NO_CONTENT.into_response(),
    }
}

#[axum::debug_handler]
async fn aggregates_handler(State(state): State<AppState>) -> Json<Vec<AggregateRow>> {
    Json(state.renderer.aggregate(state.catalog.all_records()))
}

#[axum::debug_handler]
async fn status_handler(State(state): State<AppState>) -> Json<Status> {
    let settings = &state.config.chart;
    Json(Status {
        products: state.catalog.len(),
        categories: state.catalog.categories().len(),
        chart_format: settings.format.media_type(),
        category_order: settings.category_order.as_str(),
    })
}

// --- Handler de Apagado y Utilidades ---

#[axum::debug_handler]
async fn shutdown_handler(
    State(state): State<AppState>,
) -> impl IntoResponse {
    info!("Petición de apagado recibida.");
    let sender = match state.shutdown_sender.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    };
    if let Some(sender) = sender {
        let _ = sender.send(());
    }
    StatusCode::OK
}

fn build_listing(state: &AppState, raw_query: &str) -> ListingResponse {
    let query = search::normalize_query(raw_query).unwrap_or_default();
    let products: Vec<Product> = search::filter_products(state.catalog.all_records(), &query)
        .into_iter()
        .cloned()
        .collect();
    info!("Búsqueda '{}': {} productos", query, products.len());

    ListingResponse {
        query,
        total: products.len(),
        products,
    }
}

/// Renderiza el gráfico del catálogo completo en un hilo bloqueante.
async fn render_chart(state: &AppState) -> ChartOutcome {
    let catalog = state.catalog.clone();
    let renderer = state.renderer.clone();
    match task::spawn_blocking(move || renderer.render(catalog.all_records())).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("La tarea de renderizado terminó de forma anómala: {err}");
            ChartOutcome::NoChart
        }
    }
}
