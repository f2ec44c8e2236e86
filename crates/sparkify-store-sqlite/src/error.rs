//! Error type for `sparkify-store-sqlite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// The directory that should hold the database file does not exist.
  #[error("data directory unavailable: {}", .0.display())]
  DataDirUnavailable(PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
