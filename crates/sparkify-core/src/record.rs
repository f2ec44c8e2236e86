//! Source records as they appear, one JSON object per line, in the song
//! metadata and event log files.
//!
//! Records are converted into [`model`](crate::model) rows once, right after
//! parsing; nothing downstream looks at the raw field names.

use serde::{Deserialize, Deserializer};

use crate::{
  Result,
  model::{Artist, Song, SongMatch, SongPlay, TimeBucket, User},
};

/// `page` value of the events that record a song being played.
pub const NEXT_SONG: &str = "NextSong";

// ─── Song metadata ───────────────────────────────────────────────────────────

/// One record of the song metadata dataset: a song and the artist who
/// performed it.
#[derive(Debug, Clone, Deserialize)]
pub struct SongRecord {
  pub artist_id:        String,
  pub artist_name:      String,
  pub artist_location:  Option<String>,
  pub artist_latitude:  Option<f64>,
  pub artist_longitude: Option<f64>,
  pub song_id:          String,
  pub title:            String,
  pub year:             Option<i32>,
  pub duration:         Option<f64>,
}

impl SongRecord {
  pub fn artist(&self) -> Artist {
    Artist {
      artist_id: self.artist_id.clone(),
      name:      self.artist_name.clone(),
      location:  self.artist_location.clone(),
      latitude:  self.artist_latitude,
      longitude: self.artist_longitude,
    }
  }

  pub fn song(&self) -> Song {
    Song {
      song_id:   self.song_id.clone(),
      title:     self.title.clone(),
      artist_id: self.artist_id.clone(),
      year:      self.year,
      duration:  self.duration,
    }
  }
}

// ─── Event log ───────────────────────────────────────────────────────────────

/// One user-activity event. Only the fields the warehouse uses are kept.
///
/// Events other than [`NEXT_SONG`] (logins, page views, ...) usually carry
/// nulls for the song fields and an empty `userId`, hence the options.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
  pub page:       String,
  /// Milliseconds since the Unix epoch.
  pub ts:         i64,
  #[serde(default, deserialize_with = "string_or_number")]
  pub user_id:    Option<String>,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub gender:     Option<String>,
  pub level:      Option<String>,
  pub song:       Option<String>,
  pub length:     Option<f64>,
  pub artist:     Option<String>,
  #[serde(default, deserialize_with = "string_or_number")]
  pub session_id: Option<String>,
  pub location:   Option<String>,
  pub user_agent: Option<String>,
}

impl LogEvent {
  /// Whether this event records a song being played.
  pub fn is_song_play(&self) -> bool { self.page == NEXT_SONG }

  pub fn time_bucket(&self) -> Result<TimeBucket> { TimeBucket::from_millis(self.ts) }

  /// The user dimension row, keyed by `userId` (empty when absent).
  pub fn user(&self) -> User {
    User {
      user_id:    self.user_id.clone().unwrap_or_default(),
      first_name: self.first_name.clone(),
      last_name:  self.last_name.clone(),
      gender:     self.gender.clone(),
      level:      self.level.clone(),
    }
  }

  /// The `(title, duration, artist name)` triple used to look the played song
  /// up in the catalog, if the event carries all three.
  pub fn song_key(&self) -> Option<(&str, f64, &str)> {
    Some((self.song.as_deref()?, self.length?, self.artist.as_deref()?))
  }

  /// Build the fact row for this event; `found` is the catalog lookup result.
  pub fn song_play(&self, found: Option<SongMatch>) -> SongPlay {
    let (song_id, artist_id) = match found {
      Some(m) => (Some(m.song_id), Some(m.artist_id)),
      None => (None, None),
    };

    SongPlay {
      start_time: self.ts,
      user_id: self.user_id.clone().unwrap_or_default(),
      level: self.level.clone(),
      artist_id,
      song_id,
      session_id: self.session_id.clone(),
      location: self.location.clone(),
      user_agent: self.user_agent.clone(),
    }
  }
}

/// Identifiers show up both as JSON strings (`"userId": "39"`) and as numbers
/// (`"sessionId": 38`); both are stored as text. An empty string means absent.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Id {
    Text(String),
    Int(i64),
    Float(f64),
  }

  Ok(match Option::<Id>::deserialize(deserializer)? {
    Some(Id::Text(s)) if s.is_empty() => None,
    Some(Id::Text(s)) => Some(s),
    Some(Id::Int(n)) => Some(n.to_string()),
    Some(Id::Float(f)) => Some(f.to_string()),
    None => None,
  })
}
