//! `etl`: load the song metadata and event log trees into the Sparkify
//! database.
//!
//! The schema must already exist (run `create-tables` first). Song files are
//! loaded before log files so plays can be matched against the catalog.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use sparkify_etl::{EtlConfig, process_directory, process_log_file, process_song_file};
use sparkify_store_sqlite::SqliteWarehouse;

#[derive(Parser)]
#[command(author, version, about = "Load Sparkify song and log data")]
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
  let store = SqliteWarehouse::open(&path)
    .with_context(|| format!("failed to open database at {path:?}"))?;

  let songs = process_directory(&store, &cfg.song_data, process_song_file)
    .with_context(|| format!("failed to load song data from {:?}", cfg.song_data))?;
  tracing::info!(
    files = songs.files,
    artists = songs.artists,
    songs = songs.songs,
    "song data loaded"
  );

  let logs = process_directory(&store, &cfg.log_data, process_log_file)
    .with_context(|| format!("failed to load log data from {:?}", cfg.log_data))?;
  tracing::info!(
    files = logs.files,
    songplays = logs.songplays,
    matched = logs.matched,
    "log data loaded"
  );

  for (table, rows) in store.row_counts().context("failed to count rows")? {
    tracing::info!(table, rows, "row count");
  }

  Ok(())
}
