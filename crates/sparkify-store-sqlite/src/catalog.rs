//! The statement catalog: DDL for the five warehouse tables and the
//! parameterised statements the store runs against them.
//!
//! Static text only. Each [`Statement`] declares its positional parameters,
//! and executing it takes an array of exactly that many values, so a
//! parameter-count mismatch is a compile error rather than a runtime one.

use rusqlite::{Connection, OptionalExtension as _, Row, ToSql};

// ─── Tables ──────────────────────────────────────────────────────────────────

/// DDL for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
  pub name:   &'static str,
  pub create: &'static str,
  pub drop:   &'static str,
}

pub const USERS: TableDef = TableDef {
  name:   "users",
  create: "
CREATE TABLE users (
    user_id    TEXT PRIMARY KEY,
    first_name TEXT,
    last_name  TEXT,
    gender     TEXT,
    level      TEXT
)",
  drop:   "DROP TABLE IF EXISTS users",
};

pub const ARTISTS: TableDef = TableDef {
  name:   "artists",
  create: "
CREATE TABLE artists (
    artist_id TEXT PRIMARY KEY,
    name      TEXT NOT NULL,
    location  TEXT,
    latitude  REAL,
    longitude REAL
)",
  drop:   "DROP TABLE IF EXISTS artists",
};

pub const SONGS: TableDef = TableDef {
  name:   "songs",
  create: "
CREATE TABLE songs (
    song_id   TEXT PRIMARY KEY,
    title     TEXT NOT NULL,
    artist_id TEXT REFERENCES artists(artist_id),
    year      INTEGER,
    duration  REAL
)",
  drop:   "DROP TABLE IF EXISTS songs",
};

/// One row per distinct event timestamp (milliseconds since the epoch).
pub const TIME: TableDef = TableDef {
  name:   "time",
  create: "
CREATE TABLE time (
    start_time INTEGER PRIMARY KEY,
    hour       INTEGER NOT NULL,
    day        INTEGER NOT NULL,
    week       INTEGER NOT NULL,
    month      INTEGER NOT NULL,
    year       INTEGER NOT NULL,
    weekday    INTEGER NOT NULL
)",
  drop:   "DROP TABLE IF EXISTS time",
};

/// Append-only. `artist_id` and `song_id` are NULL when the played song is not
/// in the catalog.
pub const SONGPLAYS: TableDef = TableDef {
  name:   "songplays",
  create: "
CREATE TABLE songplays (
    songplay_id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_time  INTEGER NOT NULL REFERENCES time(start_time),
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    level       TEXT,
    artist_id   TEXT REFERENCES artists(artist_id),
    song_id     TEXT REFERENCES songs(song_id),
    session_id  TEXT,
    location    TEXT,
    user_agent  TEXT
)",
  drop:   "DROP TABLE IF EXISTS songplays",
};

/// Referenced tables come before the tables that reference them.
pub const CREATE_ORDER: [TableDef; 5] = [USERS, ARTISTS, SONGS, TIME, SONGPLAYS];

/// Referencing tables come before the tables they reference.
pub const DROP_ORDER: [TableDef; 5] = [SONGPLAYS, SONGS, USERS, ARTISTS, TIME];

// ─── Pragmas ─────────────────────────────────────────────────────────────────

/// Run once on a freshly created database file, before any table exists.
pub const DATABASE_PRAGMAS: &str = "
PRAGMA encoding = 'UTF-8';
PRAGMA journal_mode = WAL;
";

/// Run on every connection; SQLite enforces foreign keys per connection.
pub const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

// ─── Statements ──────────────────────────────────────────────────────────────

/// What an insert does when the key is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
  /// Keep the existing row untouched.
  Ignore,
  /// Overwrite the `level` column of the existing row.
  UpdateLevel,
  /// The key is generated by the database, so there is never a conflict.
  GeneratedKey,
  /// Not a write.
  ReadOnly,
}

/// A parameterised statement taking exactly `N` positional parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement<const N: usize> {
  pub sql:    &'static str,
  /// Parameter names, in `?1..?N` order.
  pub params: [&'static str; N],
  pub policy: ConflictPolicy,
}

impl<const N: usize> Statement<N> {
  /// Execute through the connection's statement cache and return the number
  /// of rows changed.
  pub fn execute(&self, conn: &Connection, args: [&dyn ToSql; N]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached(self.sql)?;
    stmt.execute(&args[..])
  }

  /// Run a query expected to produce at most one row.
  pub fn query_optional<T, F>(
    &self,
    conn: &Connection,
    args: [&dyn ToSql; N],
    map: F,
  ) -> rusqlite::Result<Option<T>>
  where
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
  {
    let mut stmt = conn.prepare_cached(self.sql)?;
    stmt.query_row(&args[..], map).optional()
  }
}

pub const ARTIST_INSERT: Statement<5> = Statement {
  sql:    "
INSERT INTO artists (artist_id, name, location, latitude, longitude)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (artist_id) DO NOTHING",
  params: ["artist_id", "name", "location", "latitude", "longitude"],
  policy: ConflictPolicy::Ignore,
};

pub const SONG_INSERT: Statement<5> = Statement {
  sql:    "
INSERT INTO songs (song_id, title, artist_id, year, duration)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (song_id) DO NOTHING",
  params: ["song_id", "title", "artist_id", "year", "duration"],
  policy: ConflictPolicy::Ignore,
};

pub const USER_INSERT: Statement<5> = Statement {
  sql:    "
INSERT INTO users (user_id, first_name, last_name, gender, level)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (user_id) DO UPDATE SET level = excluded.level",
  params: ["user_id", "first_name", "last_name", "gender", "level"],
  policy: ConflictPolicy::UpdateLevel,
};

pub const TIME_INSERT: Statement<7> = Statement {
  sql:    "
INSERT INTO time (start_time, hour, day, week, month, year, weekday)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
ON CONFLICT (start_time) DO NOTHING",
  params: ["start_time", "hour", "day", "week", "month", "year", "weekday"],
  policy: ConflictPolicy::Ignore,
};

pub const SONGPLAY_INSERT: Statement<8> = Statement {
  sql:    "
INSERT INTO songplays (
    start_time, user_id, level, artist_id, song_id,
    session_id, location, user_agent
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
  params: [
    "start_time",
    "user_id",
    "level",
    "artist_id",
    "song_id",
    "session_id",
    "location",
    "user_agent",
  ],
  policy: ConflictPolicy::GeneratedKey,
};

/// `(title, duration, artist_name)` → `(song_id, artist_id)`, exact match.
pub const SONG_SELECT: Statement<3> = Statement {
  sql:    "
SELECT s.song_id, s.artist_id
FROM songs s
INNER JOIN artists a ON s.artist_id = a.artist_id
WHERE s.title    = ?1
  AND s.duration = ?2
  AND a.name     = ?3
LIMIT 1",
  params: ["title", "duration", "artist_name"],
  policy: ConflictPolicy::ReadOnly,
};
