//! Row types for the five warehouse tables.
//!
//! `songplays` is the fact table; `artists`, `songs`, `users` and `time` are
//! the dimensions it references. Every row is built once from a source record
//! and handed to a [`Warehouse`](crate::store::Warehouse) unchanged.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Dimensions ──────────────────────────────────────────────────────────────

/// A row of `artists`. Immutable once inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
  pub artist_id: String,
  pub name:      String,
  pub location:  Option<String>,
  pub latitude:  Option<f64>,
  pub longitude: Option<f64>,
}

/// A row of `songs`. Immutable once inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
  pub song_id:   String,
  pub title:     String,
  pub artist_id: String,
  pub year:      Option<i32>,
  /// Track length in seconds.
  pub duration:  Option<f64>,
}

/// A row of `users`. Only `level` changes after the first insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    String,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub gender:     Option<String>,
  /// Subscription plan, `free` or `paid` in the source data.
  pub level:      Option<String>,
}

/// A row of `time`: the UTC calendar decomposition of one event timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBucket {
  /// Milliseconds since the Unix epoch.
  pub start_time: i64,
  pub hour:       u32,
  /// Day of the month, 1-based.
  pub day:        u32,
  /// ISO 8601 week number.
  pub week:       u32,
  pub month:      u32,
  pub year:       i32,
  /// Monday is 0, Sunday is 6.
  pub weekday:    u32,
}

impl TimeBucket {
  /// Decompose a millisecond epoch timestamp in UTC.
  pub fn from_millis(start_time: i64) -> Result<Self> {
    let at = DateTime::<Utc>::from_timestamp_millis(start_time)
      .ok_or(Error::InvalidTimestamp(start_time))?;

    Ok(Self {
      start_time,
      hour:    at.hour(),
      day:     at.day(),
      week:    at.iso_week().week(),
      month:   at.month(),
      year:    at.year(),
      weekday: at.weekday().num_days_from_monday(),
    })
  }
}

// ─── Facts ───────────────────────────────────────────────────────────────────

/// A row of `songplays`. The key is assigned by the database on insert and
/// rows are never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPlay {
  pub start_time: i64,
  pub user_id:    String,
  pub level:      Option<String>,
  /// `None` when the played song is not in the catalog.
  pub artist_id:  Option<String>,
  /// `None` when the played song is not in the catalog.
  pub song_id:    Option<String>,
  pub session_id: Option<String>,
  pub location:   Option<String>,
  pub user_agent: Option<String>,
}

/// The `(song_id, artist_id)` pair found for a played song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMatch {
  pub song_id:   String,
  pub artist_id: String,
}
