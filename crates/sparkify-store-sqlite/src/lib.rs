//! SQLite backend for the Sparkify warehouse.
//!
//! Holds the statement catalog, the schema manager that (re)creates the
//! database, and [`SqliteWarehouse`], the blocking [`rusqlite`] implementation
//! of [`Warehouse`](sparkify_core::store::Warehouse).

pub mod catalog;
pub mod error;
pub mod manager;
mod store;

pub use error::{Error, Result};
pub use manager::{DatabaseConfig, create_database, create_tables, drop_tables, reset};
pub use store::SqliteWarehouse;

#[cfg(test)]
mod tests;
