// =============================================================================
// HTTP Endpoints — Axum 0.7
// =============================================================================
//
// `/` serves the HTML battle page (GET with query string, POST with the form).
// JSON endpoints live under `/api/v1/`. Nothing here requires authentication:
// the service only reads public market data.
//
// CORS is configured permissively so the JSON endpoints can back other
// dashboards.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Form, Json, Query, State},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use super::page::render_page;
use crate::app_state::AppState;
use crate::battle::{run_battle, BattleOutcome, BattleRequest};
use crate::market_data::MarketSource;
use crate::types::Timeframe;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full router with CORS middleware and shared state.
pub fn router<S: MarketSource + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Page ────────────────────────────────────────────────────
        .route("/", get(page_get::<S>).post(page_post::<S>))
        // ── JSON ────────────────────────────────────────────────────
        .route("/api/v1/reports", get(reports::<S>))
        .route("/api/v1/timeframes", get(timeframes::<S>))
        .route("/api/v1/health", get(health::<S>))
        // ── Middleware & State ───────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

/// Raw user input, shared by the form, the query string and the JSON
/// endpoint. Kept as strings so validation can report what was wrong.
#[derive(Debug, Default, Deserialize)]
pub struct BattleForm {
    pub timeframe: Option<String>,
    pub limit: Option<String>,
}

async fn battle<S: MarketSource>(state: &AppState<S>, form: &BattleForm) -> BattleOutcome {
    let (request, warnings) = BattleRequest::from_inputs(
        form.timeframe.as_deref(),
        form.limit.as_deref(),
        &state.runtime_config,
    );
    info!(timeframe = %request.timeframe, limit = request.limit, "battle requested");

    let outcome = run_battle(&state.source, &request, warnings).await;
    state.record_outcome(&outcome);
    outcome
}

// =============================================================================
// Battle page
// =============================================================================

async fn page_get<S: MarketSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(form): Query<BattleForm>,
) -> Html<String> {
    Html(render_page(&battle(&state, &form).await))
}

async fn page_post<S: MarketSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Form(form): Form<BattleForm>,
) -> Html<String> {
    Html(render_page(&battle(&state, &form).await))
}

// =============================================================================
// Reports (JSON)
// =============================================================================

async fn reports<S: MarketSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(form): Query<BattleForm>,
) -> impl IntoResponse {
    Json(battle(&state, &form).await)
}

// =============================================================================
// Timeframes
// =============================================================================

#[derive(Serialize)]
struct TimeframesResponse {
    timeframes: Vec<&'static str>,
    default_timeframe: Timeframe,
    default_limit: u32,
}

async fn timeframes<S: MarketSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    Json(TimeframesResponse {
        timeframes: Timeframe::ALL.iter().map(Timeframe::as_str).collect(),
        default_timeframe: state.runtime_config.default_timeframe,
        default_limit: state.runtime_config.default_limit,
    })
}

// =============================================================================
// Health
// =============================================================================

async fn health<S: MarketSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    Json(state.health())
}
