//! Runtime configuration shared by both binaries.
//!
//! Layered with the `config` crate: built-in defaults, then the optional TOML
//! file, then `SPARKIFY_*` environment variables (`__` separates nested keys,
//! e.g. `SPARKIFY_DATABASE__NAME`).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use sparkify_store_sqlite::DatabaseConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct EtlConfig {
  pub database:  DatabaseConfig,
  /// Root of the song metadata tree.
  pub song_data: PathBuf,
  /// Root of the event log tree.
  pub log_data:  PathBuf,
}

impl EtlConfig {
  /// Load from `path` if it exists, falling back to the defaults below.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("database.data_dir", ".")?
      .set_default("database.name", "sparkifydb")?
      .set_default("song_data", "data/song_data")?
      .set_default("log_data", "data/log_data")?
      .add_source(config::File::from(path.as_ref()).required(false))
      .add_source(
        config::Environment::with_prefix("SPARKIFY")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?
      .try_deserialize()
  }
}
