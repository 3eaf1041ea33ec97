//! Graph database commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;
use text2sql_client::graph::DEFAULT_QUERY_LIMIT;
use text2sql_client::{ApiClients, ClientResult, GraphClient, GraphQuery, InsertSummary};

use super::{read_input, write_output};
use crate::output::{self, Output};

#[derive(Subcommand)]
pub enum GraphCommands {
    /// Convert SQL DDL into Cypher
    SqlToCypher {
        /// File with CREATE TABLE statements
        file: PathBuf,

        /// Write the Cypher here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Execute a Cypher script
    Insert {
        /// Cypher script
        file: PathBuf,
    },

    /// Convert SQL DDL and load the result into the graph
    Load {
        /// File with CREATE TABLE statements
        file: PathBuf,
    },

    /// Look up nodes matching a string
    Query {
        /// Text to search for
        input: String,

        /// Maximum rows to return
        #[arg(short, long, default_value_t = DEFAULT_QUERY_LIMIT)]
        limit: u32,

        /// Only return the generated query, not the data
        #[arg(long)]
        count_only: bool,
    },

    /// Delete every node and relationship
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn execute(cmd: GraphCommands, clients: &ApiClients, output: Output) -> Result<()> {
    let graph = &clients.graph;

    match cmd {
        GraphCommands::SqlToCypher { file, output: out } => {
            let sql = read_input(&file)?;
            let script = graph.sql_to_cypher(&sql).await?;
            if output.json {
                output.emit(&script, |_| {})?;
            } else {
                write_output(out.as_deref(), &script.cypher)?;
            }
        }

        GraphCommands::Insert { file } => {
            let cypher = read_input(&file)?;
            let pb = output::spinner("Executing Cypher...");
            let summary = graph.insert_cypher(&cypher).await;
            pb.finish_and_clear();
            output.emit(&summary?, print_insert_summary)?;
        }

        GraphCommands::Load { file } => {
            let sql = read_input(&file)?;
            let pb = output::spinner("Loading DDL into the graph...");
            let summary = load_ddl(graph, &sql).await;
            pb.finish_and_clear();
            output.emit(&summary?, print_insert_summary)?;
        }

        GraphCommands::Query { input, limit, count_only } => {
            let query = GraphQuery::new(input).limit(limit).return_data(!count_only);
            let result = graph.query_graph(&query).await?;
            output.emit(&result, |result| {
                println!("{}", result.query.dimmed());
                if !result.data.is_null() {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&result.data).unwrap_or_default()
                    );
                }
            })?;
        }

        GraphCommands::Clear { yes } => {
            let confirmed = output::confirm("Delete every node and relationship in the graph?", yes)?;
            clear(graph, confirmed, output).await?;
        }
    }

    Ok(())
}

/// Convert DDL to Cypher and insert exactly the returned script.
async fn load_ddl(graph: &GraphClient, sql: &str) -> ClientResult<InsertSummary> {
    let script = graph.sql_to_cypher(sql).await?;
    graph.insert_cypher(&script.cypher).await
}

/// Clear the graph if the user agreed; otherwise send nothing.
async fn clear(graph: &GraphClient, confirmed: bool, output: Output) -> Result<()> {
    if !confirmed {
        println!("{}", "Aborted.".dimmed());
        return Ok(());
    }
    let message = graph.clear_graph(true).await?;
    output.emit(&message, |m| output::print_message(&m.message))
}

fn print_insert_summary(summary: &InsertSummary) {
    println!(
        "{} {} of {} statements succeeded",
        "✓".green().bold(),
        summary.success.to_string().green(),
        summary.total
    );
    if !summary.failed.is_empty() {
        println!("{} {} failed:", "✗".red().bold(), summary.failed.len());
        for failure in &summary.failed {
            println!("  {}", failure);
        }
    }
}
