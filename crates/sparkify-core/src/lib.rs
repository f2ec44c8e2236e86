//! Core types and trait definitions for the Sparkify ETL pipeline.
//!
//! This crate is deliberately free of database and filesystem dependencies.
//! It describes the source records as they appear in the JSON files, the
//! typed rows of the five warehouse tables, and the [`store::Warehouse`]
//! seam that storage backends implement.

pub mod error;
pub mod model;
pub mod record;
pub mod store;

pub use error::{Error, Result};
