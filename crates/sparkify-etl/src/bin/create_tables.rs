//! `create-tables`: drop the Sparkify database and recreate it with an empty
//! schema.
//!
//! Destructive: every row loaded so far is lost. Reads `config.toml` (or the
//! path given with `--config`) for the database location.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use sparkify_etl::EtlConfig;
use sparkify_store_sqlite::{create_database, create_tables, drop_tables};

#[derive(Parser)]
#[command(author, version, about = "Drop and recreate the Sparkify database")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

fn main() -> anyhow::Result<()> {
  sparkify_etl::init_tracing();

  let cli = Cli::parse();
  let cfg = EtlConfig::load(&cli.config).context("failed to load configuration")?;

  let path = cfg.database.path();
  let conn = create_database(&cfg.database)
    .with_context(|| format!("failed to create database at {path:?}"))?;

  drop_tables(&conn).context("failed to drop tables")?;
  create_tables(&conn).context("failed to create tables")?;

  tracing::info!("schema ready in {}", path.display());
  Ok(())
}
