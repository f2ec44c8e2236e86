//! Loader for the Sparkify warehouse.
//!
//! Walks the song metadata and event log trees, turns every JSON file into
//! warehouse rows and writes them through a [`Warehouse`], one committed
//! transaction per file. The `create-tables` and `etl` binaries are thin
//! wrappers around this crate and [`sparkify_store_sqlite`].
//!
//! [`Warehouse`]: sparkify_core::store::Warehouse

pub mod error;
pub mod loader;
pub mod settings;

pub use error::{Error, Result};
pub use loader::{
  LoadStats, discover_files, process_directory, process_log_file, process_song_file,
};
pub use settings::EtlConfig;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber, honouring `RUST_LOG` and defaulting to `info`.
pub fn init_tracing() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();
}
