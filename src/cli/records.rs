//! Record command handlers
//!
//! Each command drives one store action and prints the resulting state as
//! JSON. A failed action is reported with its error payload.

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use std::path::PathBuf;

use appconfig_store::{AppConfigCreateInput, ConfigStore, FindManyParams, ServiceResult};

/// Record subcommands
#[derive(Subcommand, Debug)]
pub enum RecordCommand {
    /// List one page of records
    List {
        /// Offset of the page
        #[arg(long)]
        skip: Option<u64>,
        /// Page size (defaults to the last used page size)
        #[arg(long)]
        take: Option<u64>,
    },
    /// Show one record
    Get {
        /// Record id
        id: String,
    },
    /// Create a record
    Create {
        #[arg(long)]
        key: String,
        #[arg(long)]
        value: String,
    },
    /// Create records from a JSON array of {"key", "value"} objects
    CreateMany {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Edit a record; omitted fields keep their current values
    Update {
        /// Record id
        id: String,
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        value: Option<String>,
    },
    /// Permanently delete a record
    Delete {
        /// Record id
        id: String,
    },
    /// Mark a record as deleted
    SoftDelete {
        /// Record id
        id: String,
    },
    /// Download the export file
    Export {
        /// Write the file here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle record commands against `store`
pub async fn handle_record_command(store: &ConfigStore, cmd: RecordCommand) -> Result<()> {
    match cmd {
        RecordCommand::List { skip, take } => {
            let take = take.or(Some(store.pagination().take));
            check(store.list(FindManyParams { skip, take }).await)?;

            print_json(&serde_json::json!({
                "pagination": store.pagination(),
                "records": store.records(),
            }))?;
        }
        RecordCommand::Get { id } => {
            check(store.get_by_id(&id).await)?;
            print_json(&store.selection())?;
        }
        RecordCommand::Create { key, value } => {
            check(store.create(Some(AppConfigCreateInput::new(key, value))).await)?;
            if let Some(created) = store.records().last() {
                print_json(created)?;
            }
        }
        RecordCommand::CreateMany { file } => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let items: Vec<AppConfigCreateInput> = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            let count = items.len();

            check(store.create_many(items).await)?;
            println!("Created {} records", count);
        }
        RecordCommand::Update { id, key, value } => {
            // Load the record into the selection, edit it like a form, send it
            check(store.get_by_id(&id).await)?;
            store.edit_selection(|selection| {
                if let Some(key) = key {
                    selection.set_key(key);
                }
                if let Some(value) = value {
                    selection.set_value(value);
                }
            });
            check(store.update(&id, None).await)?;
            print_json(&store.selection())?;
        }
        RecordCommand::Delete { id } => {
            check(store.delete(&id).await)?;
            println!("Deleted {}", id);
        }
        RecordCommand::SoftDelete { id } => {
            check(store.soft_delete(&id).await)?;
            println!("Soft deleted {}", id);
        }
        RecordCommand::Export { output } => {
            check(store.list_for_export().await)?;
            let file = store.export_file().unwrap_or_default();

            match output {
                Some(path) => {
                    std::fs::write(&path, file)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Export written to {}", path.display());
                }
                None => print!("{}", file),
            }
        }
    }

    Ok(())
}

/// Turn a store action failure into a CLI error that includes the payload
fn check(result: ServiceResult<()>) -> Result<()> {
    result.map_err(|err| {
        let payload = serde_json::to_string_pretty(&err.error).unwrap_or_default();
        anyhow::anyhow!("{}\n{}", err.message, payload)
    })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
