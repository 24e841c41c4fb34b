//! sheetd_init - One-time database initialization tool
//!
//! Creates a fresh character database from a character definition file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheetd::model::CharacterData;

/// sheetd database initialization tool
#[derive(Parser, Debug)]
#[command(
    name = "sheetd_init",
    version,
    about = "Initialize a new sheetd character database"
)]
struct Args {
    /// Path to SQLite database file to create (must not exist)
    #[arg(short, long)]
    database: PathBuf,

    /// Path to a character definition JSON file (sheet, class, race, background)
    #[arg(short, long)]
    character: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetd=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let args = Args::parse();

    if !args.character.exists() {
        bail!("Character file not found: {}", args.character.display());
    }

    let source = std::fs::read_to_string(&args.character)
        .with_context(|| format!("Failed to read {}", args.character.display()))?;
    let data: CharacterData = serde_json::from_str(&source)
        .with_context(|| format!("Invalid character file {}", args.character.display()))?;

    let id = sheetd::init::init_database(&args.database, &data).await?;
    println!("{}", id);

    Ok(())
}
