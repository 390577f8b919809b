//! `snowflake`: inspect and evolve a document fact stored in SQLite.
//!
//! Reads `snowflake.toml` (or the path given with `--config`), binds to the
//! configured fact, and either prints the schema model or applies a batch of
//! change requests from a JSON file.

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use snowflake_core::{ChangeRequest, naming::GUID};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use settings::SnowflakeConfig;

#[derive(Parser)]
#[command(author, version, about = "Document-to-relational schema manager")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "snowflake.toml")]
  config: PathBuf,

  /// SQLite database file; overrides the config file.
  #[arg(long)]
  database: Option<PathBuf>,

  /// Fact name; overrides the config file.
  #[arg(long)]
  fact: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the schema model as JSON.
  Show,
  /// Apply a JSON array of change requests, then print the model.
  Apply {
    /// File holding the change requests.
    file: PathBuf,
  },
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let mut cfg = SnowflakeConfig::load(&cli.config)?;
  if let Some(database) = cli.database {
    cfg.database = database;
  }
  if let Some(fact) = cli.fact {
    cfg.fact = fact;
  }
  if cfg.id_fields.is_empty() {
    cfg.id_fields.push(GUID.to_owned());
  }

  let mut snowflake =
    snowflake_sqlite::open(&cfg.database, &cfg.fact, &cfg.id_fields)
      .with_context(|| {
        format!("failed to open fact {:?} in {:?}", cfg.fact, cfg.database)
      })?;

  if let Command::Apply { file } = cli.command {
    let raw = std::fs::read_to_string(&file)
      .with_context(|| format!("reading {}", file.display()))?;
    let changes: Vec<ChangeRequest> = serde_json::from_str(&raw)
      .with_context(|| format!("parsing change requests in {}", file.display()))?;

    let count = changes.len();
    snowflake
      .apply_changes(changes)
      .context("failed to apply change requests")?;
    tracing::info!(count, "applied change requests");
  }

  println!("{}", serde_json::to_string_pretty(&snowflake.snapshot())?);
  Ok(())
}
