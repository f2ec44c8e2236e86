//! Schema manager: destroys and recreates the warehouse database and its
//! tables.
//!
//! For SQLite the "server" is a data directory and the target database is a
//! single file inside it. Everything here is destructive and asks for no
//! confirmation.

use std::{
  ffi::OsString,
  fs, io,
  path::{Path, PathBuf},
};

use rusqlite::Connection;
use serde::Deserialize;

use crate::{
  Error, Result,
  catalog::{CONNECTION_PRAGMAS, CREATE_ORDER, DATABASE_PRAGMAS, DROP_ORDER},
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Where the warehouse database lives.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
  /// Directory holding the database file. Must already exist.
  pub data_dir: PathBuf,
  /// Database name; the file is `<data_dir>/<name>.db`.
  pub name:     String,
}

impl DatabaseConfig {
  pub fn path(&self) -> PathBuf { self.data_dir.join(format!("{}.db", self.name)) }
}

// ─── Database ─────────────────────────────────────────────────────────────────

/// Drop the target database if present, recreate it empty with UTF-8
/// encoding, and return a connection to it.
pub fn create_database(config: &DatabaseConfig) -> Result<Connection> {
  if !config.data_dir.is_dir() {
    return Err(Error::DataDirUnavailable(config.data_dir.clone()));
  }

  let path = config.path();
  for suffix in ["", "-wal", "-shm", "-journal"] {
    remove_if_present(&with_suffix(&path, suffix))?;
  }

  let conn = Connection::open(&path)?;
  conn.execute_batch(DATABASE_PRAGMAS)?;
  conn.execute_batch(CONNECTION_PRAGMAS)?;

  tracing::info!(path = %path.display(), "created database");
  Ok(conn)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
  let mut name = OsString::from(path.as_os_str());
  name.push(suffix);
  PathBuf::from(name)
}

fn remove_if_present(path: &Path) -> Result<()> {
  match fs::remove_file(path) {
    Ok(()) => {
      tracing::debug!(path = %path.display(), "removed existing database file");
      Ok(())
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e.into()),
  }
}

// ─── Tables ───────────────────────────────────────────────────────────────────

/// Drop every table, dependents first, committing after each statement.
/// Missing tables are not an error.
pub fn drop_tables(conn: &Connection) -> Result<()> {
  for table in DROP_ORDER {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(table.drop)?;
    tx.commit()?;
    tracing::debug!(table = table.name, "dropped table");
  }
  Ok(())
}

/// Create every table, dependencies first, committing after each statement.
/// Fails if a table already exists.
pub fn create_tables(conn: &Connection) -> Result<()> {
  for table in CREATE_ORDER {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(table.create)?;
    tx.commit()?;
    tracing::debug!(table = table.name, "created table");
  }
  Ok(())
}

/// [`drop_tables`] followed by [`create_tables`].
pub fn reset(conn: &Connection) -> Result<()> {
  drop_tables(conn)?;
  create_tables(conn)
}
