//! Route table inspection commands.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use text2sql_router::{HistoryMode, RouteInfo, RouteTable};

use crate::output::{self, Output};

#[derive(Subcommand)]
pub enum RouteCommands {
    /// List every route, parents before children
    List(TableArgs),

    /// Show which view renders a path
    Resolve {
        /// Location path, e.g. /vector/search/faq
        path: String,

        #[command(flatten)]
        table: TableArgs,
    },

    /// Build the URL of a named route
    Href {
        /// Route name, e.g. VectorSearch
        name: String,

        /// Path parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        #[command(flatten)]
        table: TableArgs,
    },
}

#[derive(Args)]
pub struct TableArgs {
    /// Use hash-mode URLs
    #[arg(long)]
    pub hash: bool,

    /// Base path the app is mounted under
    #[arg(long)]
    pub base: Option<String>,
}

impl TableArgs {
    fn build(&self) -> Result<RouteTable> {
        let mode = if self.hash { HistoryMode::Hash } else { HistoryMode::History };
        let mut table = RouteTable::new(text2sql_router::app_routes(), mode)
            .context("Invalid route table")?;
        if let Some(base) = &self.base {
            table = table.with_base(base);
        }
        Ok(table)
    }
}

#[derive(Serialize)]
struct RouteListing<'a> {
    mode: HistoryMode,
    base: &'a str,
    routes: Vec<&'a RouteInfo>,
}

#[derive(Serialize)]
struct Href {
    path: String,
    url: String,
}

pub fn execute(cmd: RouteCommands, output: Output) -> Result<()> {
    match cmd {
        RouteCommands::List(args) => {
            let table = args.build()?;
            let listing = RouteListing {
                mode: table.mode(),
                base: table.base(),
                routes: table.routes().collect(),
            };
            output.emit(&listing, |_| output::print_routes(&table))?;
        }

        RouteCommands::Resolve { path, table } => {
            let table = table.build()?;
            let Some(route) = table.resolve(&path) else {
                bail!("No route matches '{}'", path);
            };
            output.emit(&route, output::print_route_match)?;
        }

        RouteCommands::Href { name, params, table } => {
            let table = table.build()?;
            let pairs: Vec<(&str, &str)> = params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            let path = table.href(&name, &pairs)?;
            let href = Href {
                url: table.link(&path),
                path,
            };
            output.emit(&href, |href| println!("{}", href.url.cyan()))?;
        }
    }

    Ok(())
}

/// Parse a `key=value` argument.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("missing key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
