//! Web server command.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use text2sql_web::AppState;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "8081")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the built front end (index.html and assets/)
    #[arg(long, default_value = "dist")]
    pub dist: PathBuf,

    /// Base path the app is mounted under
    #[arg(long)]
    pub base: Option<String>,

    /// Also append logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let mut table = text2sql_router::app_table().context("Invalid route table")?;
    if let Some(base) = &args.base {
        table = table.with_base(base);
    }

    if !args.dist.join("index.html").exists() {
        tracing::warn!(dist = %args.dist.display(), "No index.html found, serving the placeholder shell");
    }

    println!();
    println!("  {} {}", "Text2SQL".cyan().bold(), "Web Server".bold());
    println!();
    println!("  {}     http://{}:{}{}", "App".green(), args.host, args.port, table.link("/"));
    println!(
        "  {}  http://{}:{}/routes.json",
        "Routes".green(),
        args.host,
        args.port
    );
    println!("  {}    {}", "Dist".green(), args.dist.display());
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    text2sql_web::run_server(AppState::new(table, args.dist), &args.host, args.port).await
}
