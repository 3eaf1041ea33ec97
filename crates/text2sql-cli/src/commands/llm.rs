//! LLM description commands.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;
use text2sql_client::{ApiClients, DescribeQuery, VectorItem};

use super::{read_input, write_output};
use crate::output::{self, Output};

#[derive(Subcommand)]
pub enum LlmCommands {
    /// Generate descriptions for a database's tables
    Describe {
        /// Database name
        database: String,

        /// Restrict to these tables (repeatable)
        #[arg(short, long = "table")]
        tables: Vec<String>,

        /// Save the descriptions as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Turn saved descriptions into vector items
    Format {
        /// JSON array produced by `llm describe --output`
        file: PathBuf,

        /// Save the items as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Cancel a running generation task
    Cancel {
        /// Task identifier
        task_id: String,
    },
}

pub async fn execute(cmd: LlmCommands, clients: &ApiClients, output: Output) -> Result<()> {
    let llm = &clients.llm;

    match cmd {
        LlmCommands::Describe { database, tables, output: out } => {
            let query = DescribeQuery::new(&database).tables(tables);
            let pb = output::spinner(&format!("Describing tables in {}...", database));
            let descriptions = llm.generate_table_descriptions(&query).await;
            pb.finish_and_clear();
            let descriptions = descriptions?;

            if let Some(path) = out {
                write_output(Some(&path), &serde_json::to_string_pretty(&descriptions)?)?;
                output::print_message(&format!(
                    "Saved {} descriptions to {}",
                    descriptions.len(),
                    path.display()
                ));
            } else {
                output.emit(&descriptions, |d| output::print_descriptions(d))?;
            }
        }

        LlmCommands::Format { file, output: out } => {
            let content = read_input(&file)?;
            let metadata: Vec<serde_json::Value> = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a JSON array", file.display()))?;

            let pb = output::spinner("Formatting vector items...");
            let items = llm.format_vector_items(&metadata).await;
            pb.finish_and_clear();
            let items = items?;

            if let Some(path) = out {
                write_output(Some(&path), &serde_json::to_string_pretty(&items)?)?;
                output::print_message(&format!("Saved {} items to {}", items.len(), path.display()));
            } else {
                output.emit(&items, |items| print_items(items))?;
            }
        }

        LlmCommands::Cancel { task_id } => {
            let message = llm.cancel_task(&task_id).await?;
            output.emit(&message, |m| output::print_message(&m.message))?;
        }
    }

    Ok(())
}

fn print_items(items: &[VectorItem]) {
    for item in items {
        println!("{} {}", format!("[{}]", item.kind).dimmed(), item.content);
    }
    println!();
    println!("{} items", items.len());
}
