//! Error types for `sparkify-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The millisecond timestamp falls outside the range chrono can represent.
  #[error("timestamp out of range: {0} ms")]
  InvalidTimestamp(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
