//! SPA shell handler.
//!
//! In history mode the browser requests route paths like
//! `/vector/insert/orders` directly, so every path known to the route table
//! must be answered with `index.html`.

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use tracing::debug;

use crate::state::AppState;

/// Served when the dist directory has no `index.html`.
const DEFAULT_SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Text2SQL</title>
</head>
<body>
  <div id="app"></div>
  <noscript>The front-end bundle has not been built.</noscript>
</body>
</html>
"#;

/// Fallback for every path without an explicit route.
pub async fn spa_fallback(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = uri.path();
    let Some(route) = state.table.resolve(path) else {
        return (StatusCode::NOT_FOUND, format!("No route for {}", path)).into_response();
    };

    debug!(path = %path, route = %route.name, view = %route.view, "Serving SPA shell");

    match tokio::fs::read_to_string(state.dist_dir.join("index.html")).await {
        Ok(html) => Html(html).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Html(DEFAULT_SHELL).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
