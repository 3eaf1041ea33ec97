//! Views of the front end and the application's route declarations.

use serde::Serialize;
use std::fmt;

use crate::table::RouteEntry;

/// View components a route can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum View {
    Home,
    Database,
    LlmDescription,
    VectorDb,
    VectorInsert,
    VectorSearch,
    GraphDb,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Home => "HomeView",
            View::Database => "DatabaseView",
            View::LlmDescription => "LLMDescriptionView",
            View::VectorDb => "VectorDBView",
            View::VectorInsert => "VectorInsertView",
            View::VectorSearch => "VectorSearchView",
            View::GraphDb => "GraphDBView",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The application's routes, in declaration order.
pub fn app_routes() -> Vec<RouteEntry> {
    vec![
        RouteEntry::new("/", "Home", View::Home),
        RouteEntry::new("/database", "Database", View::Database),
        RouteEntry::new("/llm", "LLM Description", View::LlmDescription),
        RouteEntry::new("/vector", "Vector DB", View::VectorDb).children(vec![
            RouteEntry::new("insert/:collection", "VectorInsert", View::VectorInsert).props(),
            RouteEntry::new("search/:collection", "VectorSearch", View::VectorSearch).props(),
        ]),
        RouteEntry::new("/graph", "Graph DB", View::GraphDb),
    ]
}
