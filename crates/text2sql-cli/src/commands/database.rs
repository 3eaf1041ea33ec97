//! Database introspection commands.

use anyhow::Result;
use clap::Subcommand;
use text2sql_client::ApiClients;

use crate::output::{self, Output};

#[derive(Subcommand)]
pub enum DbCommands {
    /// List databases
    List,

    /// List tables in a database
    Tables {
        /// Database name
        database: String,
    },

    /// Print CREATE TABLE statements
    Schema {
        /// Database name
        database: String,

        /// Only show this table
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Show the entity-relationship structure
    Er {
        /// Database name
        database: String,
    },
}

pub async fn execute(cmd: DbCommands, clients: &ApiClients, output: Output) -> Result<()> {
    let db = &clients.database;

    match cmd {
        DbCommands::List => {
            let databases = db.list_databases().await?;
            output.emit(&databases, |names| output::print_names("Databases", names))?;
        }

        DbCommands::Tables { database } => {
            let tables = db.list_tables(&database).await?;
            output.emit(&tables, |names| output::print_names("Tables", names))?;
        }

        DbCommands::Schema { database, table } => {
            let mut schemas = db.get_all_schemas(&database).await?;
            if let Some(table) = table {
                schemas.retain(|name, _| *name == table);
                if schemas.is_empty() {
                    anyhow::bail!("Table '{}' not found in '{}'", table, database);
                }
            }
            output.emit(&schemas, output::print_schemas)?;
        }

        DbCommands::Er { database } => {
            let er = db.generate_er_diagram(&database).await?;
            output.emit(&er, output::print_er)?;
        }
    }

    Ok(())
}
