//! HTTP front end of the Network Prioritisation Tool.
//!
//! Serves the single-page dashboard and a small JSON API over the datasets
//! loaded at startup.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::{Analysis, Config, DashboardView, DataSelection, DatasetStore, NptError, RawTable, TileLayer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

pub struct AppState {
    pub store: DatasetStore,
    pub tiles: TileLayer,
}

impl AppState {
    pub fn new(store: DatasetStore, config: &Config) -> Self {
        Self {
            store,
            tiles: TileLayer {
                url: config.map_tiles.clone(),
                attribution: config.map_attribution.clone(),
            },
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/health", get(health_check))
        .route("/api/options", get(get_options))
        .route("/api/view", get(get_view))
        .route("/api/raw", get(get_raw))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

// --- ERRORS ---

/// Library errors mapped onto HTTP status codes.
pub struct ApiError(NptError);

impl From<NptError> for ApiError {
    fn from(e: NptError) -> Self {
        ApiError(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            NptError::UnknownAnalysis(_) | NptError::UnknownDataSelection(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("❌ {}", self.0);
        }
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

// --- HANDLERS ---

async fn dashboard_page() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

#[derive(Serialize)]
struct DatasetStatus {
    name: String,
    features: usize,
}

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    datasets_loaded: bool,
    datasets: Vec<DatasetStatus>,
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "OK".to_string(),
        datasets_loaded: !state.store.is_empty(),
        datasets: state
            .store
            .counts()
            .into_iter()
            .map(|(id, features)| DatasetStatus {
                name: id.to_string(),
                features,
            })
            .collect(),
    })
}

#[derive(Serialize)]
struct OptionEntry {
    value: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct Options {
    analysis: Vec<OptionEntry>,
    default_analysis: &'static str,
    data: Vec<OptionEntry>,
    default_data: &'static str,
}

async fn get_options() -> Json<Options> {
    Json(Options {
        analysis: Analysis::ALL
            .iter()
            .map(|a| OptionEntry { value: a.slug(), label: a.label() })
            .collect(),
        default_analysis: Analysis::default().slug(),
        data: DataSelection::ALL
            .iter()
            .map(|d| OptionEntry { value: d.slug(), label: d.label() })
            .collect(),
        default_data: DataSelection::default().slug(),
    })
}

/// `?analysis=..&data=..`; either may be omitted to use the widget default.
#[derive(Debug, Deserialize)]
pub struct SelectionQuery {
    pub analysis: Option<String>,
    pub data: Option<String>,
}

impl SelectionQuery {
    fn parse(&self) -> Result<(Analysis, DataSelection), NptError> {
        let analysis = match &self.analysis {
            Some(raw) => raw.parse()?,
            None => Analysis::default(),
        };
        let data = match &self.data {
            Some(raw) => raw.parse()?,
            None => DataSelection::default(),
        };
        Ok((analysis, data))
    }
}

async fn get_view(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelectionQuery>,
) -> Result<Response, ApiError> {
    let (analysis, data) = query.parse()?;
    let view = DashboardView::build(&state.store, analysis, data, state.tiles.clone())?;
    info!(
        "📍 View requested: {} / {} ({} layers)",
        analysis,
        data,
        view.layers.len()
    );
    Ok(Json(view).into_response())
}

async fn get_raw(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<RawTable>, ApiError> {
    let (analysis, data) = query.parse()?;
    let table = RawTable::build(&state.store, analysis, data)?;
    info!("📋 Raw data requested: {} / {} ({} rows)", analysis, data, table.rows.len());
    Ok(Json(table))
}
