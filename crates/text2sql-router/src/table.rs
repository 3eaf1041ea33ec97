//! Route entries, the compiled route table and path resolution.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::error::{RouteError, RouteResult};
use crate::views::View;

/// One declared route. Child paths without a leading `/` are relative to the
/// parent's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: String,
    pub name: String,
    pub view: View,
    /// Forward path parameters to the view as input properties.
    pub props: bool,
    pub children: Vec<RouteEntry>,
}

impl RouteEntry {
    pub fn new(path: &str, name: &str, view: View) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            view,
            props: false,
            children: Vec::new(),
        }
    }

    pub fn props(mut self) -> Self {
        self.props = true;
        self
    }

    pub fn children(mut self, children: Vec<RouteEntry>) -> Self {
        self.children = children;
        self
    }
}

/// How routes appear in the browser's address bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Plain paths (`/vector/insert/orders`); the server must answer every
    /// route path with the SPA shell.
    #[default]
    History,
    /// Paths behind a fragment (`/#/vector/insert/orders`).
    Hash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// Flattened view of one route, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    /// Full path pattern, e.g. `/vector/insert/:collection`.
    pub path: String,
    pub name: String,
    pub view: View,
    pub props: bool,
    /// Nesting depth; top-level routes are 0.
    pub depth: usize,
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    info: RouteInfo,
    segments: Vec<Segment>,
    /// Views from the outermost parent down to this route.
    chain: Vec<View>,
}

/// Result of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub name: String,
    pub view: View,
    /// Pattern that matched.
    pub path: String,
    pub params: BTreeMap<String, String>,
    /// Inputs forwarded to the view. Empty unless the route sets `props`.
    pub props: BTreeMap<String, String>,
    /// Rendered views, parent first.
    pub matched: Vec<View>,
}

/// Ordered, immutable route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    mode: HistoryMode,
    base: String,
    routes: Vec<CompiledRoute>,
    // Indices into `routes`; children are tried before their parent.
    match_order: Vec<usize>,
}

impl RouteTable {
    /// Compile `entries`.
    ///
    /// Fails on duplicate paths within one nesting level, duplicate names,
    /// and malformed parameters.
    pub fn new(entries: Vec<RouteEntry>, mode: HistoryMode) -> RouteResult<Self> {
        let mut routes = Vec::new();
        let mut match_order = Vec::new();
        compile(&entries, "/", &[], 0, &mut routes, &mut match_order)?;

        let mut names = HashSet::new();
        for route in &routes {
            if !names.insert(route.info.name.as_str()) {
                return Err(RouteError::DuplicateName(route.info.name.clone()));
            }
        }

        Ok(Self {
            mode,
            base: String::new(),
            routes,
            match_order,
        })
    }

    /// Mount the application under `base` (e.g. `/app`).
    pub fn with_base(mut self, base: &str) -> Self {
        let trimmed = base.trim_matches('/');
        self.base = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        };
        self
    }

    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Routes in declaration order, parents before their children.
    pub fn routes(&self) -> impl Iterator<Item = &RouteInfo> {
        self.routes.iter().map(|r| &r.info)
    }

    /// Resolve a location path. Query string and fragment are ignored, and
    /// the base prefix is stripped when present.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = self.strip_base(path);
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        for &index in &self.match_order {
            let route = &self.routes[index];
            if let Some(params) = match_segments(&route.segments, &parts) {
                let props = if route.info.props { params.clone() } else { BTreeMap::new() };
                return Some(RouteMatch {
                    name: route.info.name.clone(),
                    view: route.info.view,
                    path: route.info.path.clone(),
                    params,
                    props,
                    matched: route.chain.clone(),
                });
            }
        }

        debug!(path = %path, "No route matched");
        None
    }

    /// Build the path of a named route, percent-encoding parameters.
    pub fn href(&self, name: &str, params: &[(&str, &str)]) -> RouteResult<String> {
        let route = self
            .routes
            .iter()
            .find(|r| r.info.name == name)
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?;

        let mut path = String::new();
        for segment in &route.segments {
            path.push('/');
            match segment {
                Segment::Static(s) => path.push_str(s),
                Segment::Param(param) => {
                    let value = params
                        .iter()
                        .find(|(k, _)| k == param)
                        .map(|(_, v)| *v)
                        .filter(|v| !v.is_empty())
                        .ok_or_else(|| RouteError::MissingParam {
                            route: name.to_string(),
                            param: param.clone(),
                        })?;
                    path.push_str(&urlencoding::encode(value));
                }
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }

    /// Browser URL for a route path under this table's mode and base.
    pub fn link(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        match self.mode {
            HistoryMode::History => {
                if self.base.is_empty() {
                    path
                } else if path == "/" {
                    self.base.clone()
                } else {
                    format!("{}{}", self.base, path)
                }
            }
            HistoryMode::Hash => format!("{}/#{}", self.base, path),
        }
    }

    fn strip_base<'a>(&self, path: &'a str) -> &'a str {
        if self.base.is_empty() {
            return path;
        }
        match path.strip_prefix(self.base.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        }
    }
}

fn compile(
    entries: &[RouteEntry],
    parent_path: &str,
    parent_chain: &[View],
    depth: usize,
    routes: &mut Vec<CompiledRoute>,
    match_order: &mut Vec<usize>,
) -> RouteResult<()> {
    let mut seen = HashSet::new();

    for entry in entries {
        if !seen.insert(entry.path.as_str()) {
            return Err(RouteError::DuplicatePath(entry.path.clone()));
        }

        let full_path = join_path(parent_path, &entry.path);
        let segments = parse_pattern(&full_path)?;
        let mut chain = parent_chain.to_vec();
        chain.push(entry.view);

        let index = routes.len();
        routes.push(CompiledRoute {
            info: RouteInfo {
                path: full_path.clone(),
                name: entry.name.clone(),
                view: entry.view,
                props: entry.props,
                depth,
            },
            segments,
            chain: chain.clone(),
        });

        compile(&entry.children, &full_path, &chain, depth + 1, routes, match_order)?;
        match_order.push(index);
    }

    Ok(())
}

fn join_path(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        return child.to_string();
    }
    if child.is_empty() {
        return parent.to_string();
    }
    format!("{}/{}", parent.trim_end_matches('/'), child)
}

fn parse_pattern(pattern: &str) -> RouteResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut params = HashSet::new();

    for part in pattern.split('/').filter(|s| !s.is_empty()) {
        match part.strip_prefix(':') {
            Some("") => {
                return Err(RouteError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: "empty parameter name".to_string(),
                })
            }
            Some(name) => {
                if !params.insert(name) {
                    return Err(RouteError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: format!("parameter '{}' appears twice", name),
                    });
                }
                segments.push(Segment::Param(name.to_string()));
            }
            None => segments.push(Segment::Static(part.to_string())),
        }
    }

    Ok(segments)
}

fn match_segments(segments: &[Segment], parts: &[&str]) -> Option<BTreeMap<String, String>> {
    if segments.len() != parts.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (segment, part) in segments.iter().zip(parts) {
        match segment {
            Segment::Static(s) => {
                if !s.eq_ignore_ascii_case(part) {
                    return None;
                }
            }
            Segment::Param(name) => {
                let value = urlencoding::decode(part)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| part.to_string());
                params.insert(name.clone(), value);
            }
        }
    }
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::app_routes;

    fn table() -> RouteTable {
        RouteTable::new(app_routes(), HistoryMode::History).unwrap()
    }

    #[test]
    fn test_top_level_routes() {
        let table = table();
        let cases = [
            ("/", View::Home, "Home"),
            ("/database", View::Database, "Database"),
            ("/llm", View::LlmDescription, "LLM Description"),
            ("/vector", View::VectorDb, "Vector DB"),
            ("/graph", View::GraphDb, "Graph DB"),
        ];
        for (path, view, name) in cases {
            let m = table.resolve(path).unwrap_or_else(|| panic!("no match for {path}"));
            assert_eq!(m.view, view);
            assert_eq!(m.name, name);
            assert!(m.params.is_empty());
        }
    }

    #[test]
    fn test_vector_insert_forwards_collection() {
        let m = table().resolve("/vector/insert/orders").unwrap();
        assert_eq!(m.name, "VectorInsert");
        assert_eq!(m.view, View::VectorInsert);
        assert_eq!(m.path, "/vector/insert/:collection");
        assert_eq!(m.props.get("collection").map(String::as_str), Some("orders"));
        assert_eq!(m.matched, vec![View::VectorDb, View::VectorInsert]);
    }

    #[test]
    fn test_vector_search_forwards_collection() {
        let m = table().resolve("/vector/search/faq").unwrap();
        assert_eq!(m.view, View::VectorSearch);
        assert_eq!(m.props["collection"], "faq");
    }

    #[test]
    fn test_params_are_decoded() {
        let m = table().resolve("/vector/insert/sales%20q1").unwrap();
        assert_eq!(m.params["collection"], "sales q1");
    }

    #[test]
    fn test_query_fragment_and_trailing_slash_ignored() {
        let table = table();
        assert_eq!(table.resolve("/graph/").unwrap().view, View::GraphDb);
        assert_eq!(table.resolve("/database?db=sales").unwrap().view, View::Database);
        assert_eq!(table.resolve("/vector/search/faq#top").unwrap().props["collection"], "faq");
    }

    #[test]
    fn test_unknown_paths() {
        let table = table();
        assert!(table.resolve("/nope").is_none());
        assert!(table.resolve("/vector/insert").is_none());
        assert!(table.resolve("/vector/insert/a/b").is_none());
    }

    #[test]
    fn test_no_props_without_flag() {
        let entries = vec![RouteEntry::new("/db/:name", "Db", View::Database)];
        let table = RouteTable::new(entries, HistoryMode::History).unwrap();
        let m = table.resolve("/db/sales").unwrap();
        assert_eq!(m.params["name"], "sales");
        assert!(m.props.is_empty());
    }

    #[test]
    fn test_duplicate_path_same_level_rejected() {
        let entries = vec![
            RouteEntry::new("/graph", "A", View::GraphDb),
            RouteEntry::new("/graph", "B", View::GraphDb),
        ];
        let err = RouteTable::new(entries, HistoryMode::History).unwrap_err();
        assert_eq!(err, RouteError::DuplicatePath("/graph".into()));
    }

    #[test]
    fn test_same_path_different_levels_allowed() {
        let entries = vec![
            RouteEntry::new("/a", "A", View::Home).children(vec![RouteEntry::new("x", "AX", View::Database)]),
            RouteEntry::new("/b", "B", View::Home).children(vec![RouteEntry::new("x", "BX", View::Database)]),
        ];
        let table = RouteTable::new(entries, HistoryMode::History).unwrap();
        assert_eq!(table.resolve("/b/x").unwrap().name, "BX");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let entries = vec![
            RouteEntry::new("/a", "Same", View::Home),
            RouteEntry::new("/b", "Same", View::Home),
        ];
        let err = RouteTable::new(entries, HistoryMode::History).unwrap_err();
        assert_eq!(err, RouteError::DuplicateName("Same".into()));
    }

    #[test]
    fn test_bad_patterns_rejected() {
        let err = RouteTable::new(vec![RouteEntry::new("/a/:", "A", View::Home)], HistoryMode::History)
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));

        let err = RouteTable::new(
            vec![RouteEntry::new("/a/:id/:id", "A", View::Home)],
            HistoryMode::History,
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
    }

    #[test]
    fn test_href() {
        let table = table();
        assert_eq!(table.href("Home", &[]).unwrap(), "/");
        assert_eq!(table.href("Graph DB", &[]).unwrap(), "/graph");
        assert_eq!(
            table.href("VectorInsert", &[("collection", "orders")]).unwrap(),
            "/vector/insert/orders"
        );
        assert_eq!(
            table.href("VectorSearch", &[("collection", "a/b")]).unwrap(),
            "/vector/search/a%2Fb"
        );
    }

    #[test]
    fn test_href_errors() {
        let table = table();
        assert_eq!(
            table.href("VectorInsert", &[]).unwrap_err(),
            RouteError::MissingParam { route: "VectorInsert".into(), param: "collection".into() }
        );
        assert_eq!(table.href("Nope", &[]).unwrap_err(), RouteError::UnknownRoute("Nope".into()));
    }

    #[test]
    fn test_href_resolves_back() {
        let table = table();
        let path = table.href("VectorInsert", &[("collection", "q1 sales")]).unwrap();
        assert_eq!(table.resolve(&path).unwrap().props["collection"], "q1 sales");
    }

    #[test]
    fn test_history_links_have_no_fragment() {
        let table = table();
        assert_eq!(table.link("/vector/insert/orders"), "/vector/insert/orders");
        assert!(!table.link("/graph").contains('#'));

        let table = table.with_base("/app/");
        assert_eq!(table.link("/graph"), "/app/graph");
        assert_eq!(table.link("/"), "/app");
        assert_eq!(table.resolve("/app/graph").unwrap().view, View::GraphDb);
        assert_eq!(table.resolve("/app").unwrap().view, View::Home);
    }

    #[test]
    fn test_hash_links() {
        let table = RouteTable::new(app_routes(), HistoryMode::Hash).unwrap();
        assert_eq!(table.link("/graph"), "/#/graph");
    }

    #[test]
    fn test_listing_order() {
        let names: Vec<_> = table().routes().map(|r| r.name.clone()).collect();
        assert_eq!(
            names,
            vec!["Home", "Database", "LLM Description", "Vector DB", "VectorInsert", "VectorSearch", "Graph DB"]
        );
        let depths: Vec<_> = table().routes().map(|r| r.depth).collect();
        assert_eq!(depths, vec![0, 0, 0, 0, 1, 1, 0]);
    }

    #[test]
    fn test_route_info_serializes() {
        let info = table().routes().nth(4).cloned().unwrap();
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["path"], "/vector/insert/:collection");
        assert_eq!(value["view"], "VectorInsert");
        assert_eq!(value["props"], true);
    }
}
