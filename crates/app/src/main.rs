use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tally_store::{EntityStore, SnapshotStore};

mod commands;

#[derive(Parser)]
#[command(name = "tally", version, about = "CSV transaction grouping and rule-based categorization")]
struct Cli {
    /// Snapshot database location (defaults to the platform data dir).
    #[arg(long, env = "TALLY_DB", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest CSV exports and categorize them against the active rules.
    Ingest {
        /// Files to upload; non-.csv files are tracked but the batch needs
        /// at least one CSV.
        files: Vec<PathBuf>,
    },
    /// List transactions with their group memberships.
    Transactions,
    /// List groups.
    Groups,
    /// Create a group.
    AddGroup {
        name: String,
        #[arg(long, default_value = "#888888")]
        color: String,
    },
    /// Delete a group (cascades to its rules).
    DeleteGroup { id: String },
    /// List rules.
    Rules,
    /// Create a rule and recategorize everything.
    AddRule {
        name: String,
        /// Comma-separated keywords, e.g. "UBER, LYFT".
        contains: String,
        /// Target group id.
        #[arg(long)]
        group: String,
    },
    /// Delete a rule and recategorize everything.
    DeleteRule { id: String },
    /// Flip a rule's active flag and recategorize everything.
    ToggleRule { id: String },
    /// Replace the rule set from a TOML file.
    ImportRules { file: PathBuf },
}

fn default_db_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "tally", "Tally")
        .context("could not determine app data directory")?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("could not create {}", data_dir.display()))?;
    Ok(data_dir.join("snapshots.db"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let db_path = match cli.db {
        Some(path) => path,
        None => default_db_path()?,
    };
    tracing::debug!("snapshot store at {}", db_path.display());
    let snapshots = SnapshotStore::open(&db_path)
        .await
        .with_context(|| format!("could not open snapshot store at {}", db_path.display()))?;
    let mut store = EntityStore::init(snapshots).await;

    match cli.command {
        Command::Ingest { files } => commands::ingest(&mut store, files).await?,
        Command::Transactions => commands::list_transactions(&store),
        Command::Groups => commands::list_groups(&store),
        Command::AddGroup { name, color } => commands::add_group(&mut store, &name, &color).await,
        Command::DeleteGroup { id } => commands::delete_group(&mut store, &id).await,
        Command::Rules => commands::list_rules(&store),
        Command::AddRule {
            name,
            contains,
            group,
        } => commands::add_rule(&mut store, &name, &contains, &group).await?,
        Command::DeleteRule { id } => commands::delete_rule(&mut store, &id).await,
        Command::ToggleRule { id } => commands::toggle_rule(&mut store, &id).await,
        Command::ImportRules { file } => commands::import_rules(&mut store, &file).await?,
    }

    store.dispose().await;
    Ok(())
}
