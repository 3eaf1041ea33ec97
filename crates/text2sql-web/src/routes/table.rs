//! Route table handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use text2sql_router::{HistoryMode, RouteInfo, RouteMatch};

use crate::state::AppState;

#[derive(Serialize)]
pub struct RouteListing {
    pub mode: HistoryMode,
    pub base: String,
    pub routes: Vec<RouteInfo>,
}

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub path: String,
}

/// GET /routes.json - The flattened route table.
pub async fn list_routes(State(state): State<AppState>) -> Json<RouteListing> {
    Json(RouteListing {
        mode: state.table.mode(),
        base: state.table.base().to_string(),
        routes: state.table.routes().cloned().collect(),
    })
}

/// GET /routes/resolve?path=... - Resolve a path the way the front end would.
pub async fn resolve_route(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<RouteMatch>, (StatusCode, String)> {
    state
        .table
        .resolve(&query.path)
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No route for {}", query.path)))
}
