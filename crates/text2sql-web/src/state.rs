//! Application state.

use std::path::PathBuf;
use std::sync::Arc;
use text2sql_router::RouteTable;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    /// Built front-end bundle (`index.html` plus `assets/`).
    pub dist_dir: PathBuf,
}

impl AppState {
    pub fn new(table: RouteTable, dist_dir: PathBuf) -> Self {
        Self {
            table: Arc::new(table),
            dist_dir,
        }
    }
}
