//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use text2sql_client::{ApiClients, ApiConfig};

use crate::output::Output;

pub mod database;
pub mod graph;
pub mod health;
pub mod llm;
pub mod routes;
pub mod serve;
pub mod vector;

/// Text2SQL - database, graph, LLM and vector tooling for text-to-SQL
#[derive(Parser)]
#[command(name = "text2sql")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend URL (overrides the config file)
    #[arg(long, global = true, env = "TEXT2SQL_API_URL")]
    pub api_url: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print raw JSON responses
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Database introspection
    #[command(subcommand)]
    Db(database::DbCommands),

    /// Graph database operations
    #[command(subcommand)]
    Graph(graph::GraphCommands),

    /// LLM-generated table descriptions
    #[command(subcommand)]
    Llm(llm::LlmCommands),

    /// Vector collections and similarity search
    #[command(subcommand)]
    Vector(vector::VectorCommands),

    /// Inspect the front-end route table
    #[command(subcommand)]
    Routes(routes::RouteCommands),

    /// Serve the front-end bundle
    Serve(serve::ServeArgs),

    /// Check that the backend is up
    Health,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let output = Output { json: self.json };

        match self.command {
            Commands::Db(cmd) => database::execute(cmd, &clients(self.config.as_deref(), self.api_url.as_deref())?, output).await,
            Commands::Graph(cmd) => graph::execute(cmd, &clients(self.config.as_deref(), self.api_url.as_deref())?, output).await,
            Commands::Llm(cmd) => llm::execute(cmd, &clients(self.config.as_deref(), self.api_url.as_deref())?, output).await,
            Commands::Vector(cmd) => vector::execute(cmd, &clients(self.config.as_deref(), self.api_url.as_deref())?, output).await,
            Commands::Health => health::execute(&clients(self.config.as_deref(), self.api_url.as_deref())?, output).await,
            Commands::Routes(cmd) => routes::execute(cmd, output),
            Commands::Serve(args) => serve::execute(args).await,
        }
    }
}

/// Build the backend clients once for this invocation.
fn clients(config_path: Option<&Path>, api_url: Option<&str>) -> Result<ApiClients> {
    let mut config = ApiConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(url) = api_url {
        config = config.with_base_url(url);
    }
    tracing::debug!(base_url = %config.base_url, "Using backend");

    ApiClients::new(&config).context("Failed to create HTTP client")
}

/// Read a text file given on the command line.
pub(crate) fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write `content` to `path`, or to stdout when no path is given.
pub(crate) fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
