//! # Text2SQL Router
//!
//! Declarative route table for the single-page front end: maps URL paths to
//! views, including the parameterized `insert/:collection` and
//! `search/:collection` children of `/vector`.

pub mod error;
pub mod table;
pub mod views;

pub use error::{RouteError, RouteResult};
pub use table::{HistoryMode, RouteEntry, RouteInfo, RouteMatch, RouteTable};
pub use views::{app_routes, View};

/// The application's route table in history mode.
pub fn app_table() -> RouteResult<RouteTable> {
    RouteTable::new(app_routes(), HistoryMode::History)
}
