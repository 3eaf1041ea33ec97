//! Text2SQL Web Host
//!
//! Axum server for the single-page front end: static assets plus a
//! history-mode fallback driven by the route table.

pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let assets = ServeDir::new(state.dist_dir.join("assets"));
    // A bundle built for a base path requests its assets under that base.
    let assets_path = format!("{}/assets", state.table.base());

    Router::new()
        .route("/routes.json", get(routes::table::list_routes))
        .route("/routes/resolve", get(routes::table::resolve_route))
        .nest_service(&assets_path, assets)
        .fallback(routes::shell::spa_fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}
