//! The `Warehouse` trait: the connection seam between the loader and a
//! database backend.
//!
//! The trait is implemented by storage backends (e.g. `sparkify-store-sqlite`).
//! The loader in `sparkify-etl` depends on this abstraction, not on any
//! concrete backend.

use crate::model::{Artist, Song, SongMatch, SongPlay, TimeBucket, User};

/// A single open connection to the warehouse database.
///
/// Writes join an implicit transaction that stays open until [`commit`] is
/// called; dropping the connection with uncommitted writes discards them.
/// All calls block until the database answers.
///
/// [`commit`]: Warehouse::commit
pub trait Warehouse {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Dimensions ────────────────────────────────────────────────────────

  /// Insert an artist unless one with the same id exists.
  /// Returns `true` if a row was written.
  fn insert_artist(&self, artist: &Artist) -> Result<bool, Self::Error>;

  /// Insert a song unless one with the same id exists.
  /// Returns `true` if a row was written.
  fn insert_song(&self, song: &Song) -> Result<bool, Self::Error>;

  /// Insert a user, or overwrite only `level` if the id is already present.
  fn upsert_user(&self, user: &User) -> Result<(), Self::Error>;

  /// Insert a time bucket unless one with the same timestamp exists.
  /// Returns `true` if a row was written.
  fn insert_time_bucket(&self, bucket: &TimeBucket) -> Result<bool, Self::Error>;

  // ── Facts ─────────────────────────────────────────────────────────────

  /// Append a song play and return its generated `songplay_id`.
  fn insert_songplay(&self, play: &SongPlay) -> Result<i64, Self::Error>;

  // ── Lookups ───────────────────────────────────────────────────────────

  /// Find the song with exactly this title and duration by an artist with
  /// exactly this name.
  fn find_song(
    &self,
    title: &str,
    duration: f64,
    artist_name: &str,
  ) -> Result<Option<SongMatch>, Self::Error>;

  // ── Transactions ──────────────────────────────────────────────────────

  /// Make every write since the previous commit durable.
  fn commit(&self) -> Result<(), Self::Error>;
}
