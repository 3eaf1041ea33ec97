//! Vector database commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use text2sql_client::{ApiClients, MultipartForm, VectorClient};

use super::read_input;
use crate::output::{self, Output};

#[derive(Subcommand)]
pub enum VectorCommands {
    /// Embed a piece of text
    Embed {
        /// Text to embed
        text: String,
    },

    /// Similarity search over metadata collections
    Search(SearchArgs),

    /// Similarity search over question/answer collections
    SearchQa(SearchArgs),

    /// List collections
    Collections,

    /// Create a metadata collection
    Create {
        /// Collection name
        name: String,
    },

    /// Create a question/answer collection
    CreateQa {
        /// Collection name
        name: String,
    },

    /// Drop all data and indexes of a collection
    Clear {
        /// Collection name
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Insert records from a JSON array; each needs a `content` field
    Insert {
        /// Collection name
        name: String,

        /// JSON file
        file: PathBuf,
    },

    /// Import a question/answer CSV into a QA collection
    InsertCsv {
        /// Collection name
        name: String,

        /// CSV file
        file: PathBuf,
    },

    /// Build the similarity index of a collection
    Index {
        /// Collection name
        name: String,
    },
}

#[derive(Args)]
pub struct SearchArgs {
    /// Query text
    pub query: String,

    /// Collection to search (repeatable)
    #[arg(short = 'C', long = "collection", required = true)]
    pub collections: Vec<String>,

    /// Hits per collection
    #[arg(short = 'k', long, default_value_t = 5)]
    pub top_k: u32,
}

pub async fn execute(cmd: VectorCommands, clients: &ApiClients, output: Output) -> Result<()> {
    let vector = &clients.vector;

    match cmd {
        VectorCommands::Embed { text } => {
            let embedding = vector.generate_embedding(&text).await?;
            output.emit(&embedding, |e| {
                let preview: Vec<String> = e.embedding.iter().take(8).map(|v| format!("{:.4}", v)).collect();
                println!("{} {}", "Dimensions:".bold(), e.embedding.len());
                println!("[{}{}]", preview.join(", "), if e.embedding.len() > 8 { ", ..." } else { "" });
            })?;
        }

        VectorCommands::Search(args) => {
            let pb = output::spinner("Searching...");
            let results = vector.search_vector(&args.query, &args.collections, args.top_k).await;
            pb.finish_and_clear();
            output.emit(&results?, output::print_vector_hits)?;
        }

        VectorCommands::SearchQa(args) => {
            let pb = output::spinner("Searching...");
            let results = vector.search_qa_vector(&args.query, &args.collections, args.top_k).await;
            pb.finish_and_clear();
            output.emit(&results?, output::print_qa_hits)?;
        }

        VectorCommands::Collections => {
            let list = vector.list_collections().await?;
            output.emit(&list, |l| output::print_names("Collections", &l.collections))?;
        }

        VectorCommands::Create { name } => {
            let message = vector.create_collection(&name).await?;
            output.emit(&message, |m| output::print_message(&m.message))?;
        }

        VectorCommands::CreateQa { name } => {
            let message = vector.create_qa_collection(&name).await?;
            output.emit(&message, |m| output::print_message(&m.message))?;
        }

        VectorCommands::Clear { name, yes } => {
            let prompt = format!("Drop all data and indexes in '{}'?", name);
            let confirmed = output::confirm(&prompt, yes)?;
            clear(vector, &name, confirmed, output).await?;
        }

        VectorCommands::Insert { name, file } => {
            let content = read_input(&file)?;
            let records: Vec<serde_json::Value> = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a JSON array", file.display()))?;

            let pb = output::spinner(&format!("Inserting {} records into {}...", records.len(), name));
            let summary = vector.insert_data(&name, &records).await;
            pb.finish_and_clear();
            output.emit(&summary?, |s| {
                output::print_message(&s.message);
                println!("  {} processed", s.processed_count);
            })?;
        }

        VectorCommands::InsertCsv { name, file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "data.csv".to_string());

            let pb = output::spinner(&format!("Importing {} into {}...", file_name, name));
            let summary = vector.insert_qa_csv(&name, MultipartForm::csv_file(&file_name, bytes)).await;
            pb.finish_and_clear();
            output.emit(&summary?, |s| {
                output::print_message(&s.message);
                println!(
                    "  {} processed, {} failed",
                    s.processed_count.to_string().green(),
                    if s.failed_count > 0 { s.failed_count.to_string().red() } else { "0".normal() }
                );
            })?;
        }

        VectorCommands::Index { name } => {
            let pb = output::spinner(&format!("Building index for {}...", name));
            let reply = vector.create_index(&name).await;
            pb.finish_and_clear();
            output.emit(&reply?, |reply| match reply.get("message").and_then(|m| m.as_str()) {
                Some(message) => output::print_message(message),
                None => println!("{}", reply),
            })?;
        }
    }

    Ok(())
}

/// Clear `name` if the user agreed; otherwise send nothing.
async fn clear(vector: &VectorClient, name: &str, confirmed: bool, output: Output) -> Result<()> {
    if !confirmed {
        println!("{}", "Aborted.".dimmed());
        return Ok(());
    }
    let message = vector.clear_collection(name).await?;
    output.emit(&message, |m| output::print_message(&m.message))
}
