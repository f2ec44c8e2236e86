//! Error type for `sparkify-etl`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to read {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    source: std::io::Error,
  },

  #[error("failed to walk directory: {0}")]
  Walk(#[from] walkdir::Error),

  #[error("{}:{line}: invalid record: {source}", path.display())]
  Json {
    path:   PathBuf,
    line:   usize,
    source: serde_json::Error,
  },

  /// A song file with no record in it.
  #[error("no records in {}", .0.display())]
  EmptyFile(PathBuf),

  #[error("core error: {0}")]
  Core(#[from] sparkify_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
