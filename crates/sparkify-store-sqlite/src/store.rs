//! [`SqliteWarehouse`] — the SQLite implementation of [`Warehouse`].

use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension as _};

use sparkify_core::{
  model::{Artist, Song, SongMatch, SongPlay, TimeBucket, User},
  store::Warehouse,
};

use crate::{
  Error, Result,
  catalog::{
    ARTIST_INSERT, CONNECTION_PRAGMAS, CREATE_ORDER, SONG_INSERT, SONG_SELECT,
    SONGPLAY_INSERT, TIME_INSERT, TableDef, USER_INSERT,
  },
  manager,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A warehouse backed by a single SQLite connection.
///
/// The first write after a commit opens a transaction; [`Warehouse::commit`]
/// closes it. Writes still pending when the store is dropped are rolled back.
pub struct SqliteWarehouse {
  conn: Connection,
}

impl SqliteWarehouse {
  /// Open an existing database. Never creates the file: the schema manager
  /// must have run first.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open_with_flags(
      path,
      OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Self::from_connection(conn)
  }

  /// Open an in-memory store with all tables created — useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    let store = Self::from_connection(Connection::open_in_memory()?)?;
    manager::create_tables(&store.conn)?;
    Ok(store)
  }

  /// Wrap a connection handed over by [`manager::create_database`] or opened
  /// elsewhere.
  pub fn from_connection(conn: Connection) -> Result<Self> {
    conn.execute_batch(CONNECTION_PRAGMAS)?;
    Ok(Self { conn })
  }

  pub fn connection(&self) -> &Connection { &self.conn }

  pub fn into_connection(self) -> Connection { self.conn }

  fn begin(&self) -> Result<()> {
    if self.conn.is_autocommit() {
      self.conn.execute_batch("BEGIN")?;
    }
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub fn get_artist(&self, artist_id: &str) -> Result<Option<Artist>> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT artist_id, name, location, latitude, longitude
           FROM artists WHERE artist_id = ?1",
          rusqlite::params![artist_id],
          |row| {
            Ok(Artist {
              artist_id: row.get(0)?,
              name:      row.get(1)?,
              location:  row.get(2)?,
              latitude:  row.get(3)?,
              longitude: row.get(4)?,
            })
          },
        )
        .optional()?,
    )
  }

  pub fn get_song(&self, song_id: &str) -> Result<Option<Song>> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT song_id, title, artist_id, year, duration
           FROM songs WHERE song_id = ?1",
          rusqlite::params![song_id],
          |row| {
            Ok(Song {
              song_id:   row.get(0)?,
              title:     row.get(1)?,
              artist_id: row.get(2)?,
              year:      row.get(3)?,
              duration:  row.get(4)?,
            })
          },
        )
        .optional()?,
    )
  }

  pub fn get_user(&self, user_id: &str) -> Result<Option<User>> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT user_id, first_name, last_name, gender, level
           FROM users WHERE user_id = ?1",
          rusqlite::params![user_id],
          |row| {
            Ok(User {
              user_id:    row.get(0)?,
              first_name: row.get(1)?,
              last_name:  row.get(2)?,
              gender:     row.get(3)?,
              level:      row.get(4)?,
            })
          },
        )
        .optional()?,
    )
  }

  pub fn get_time_bucket(&self, start_time: i64) -> Result<Option<TimeBucket>> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT start_time, hour, day, week, month, year, weekday
           FROM time WHERE start_time = ?1",
          rusqlite::params![start_time],
          |row| {
            Ok(TimeBucket {
              start_time: row.get(0)?,
              hour:       row.get(1)?,
              day:        row.get(2)?,
              week:       row.get(3)?,
              month:      row.get(4)?,
              year:       row.get(5)?,
              weekday:    row.get(6)?,
            })
          },
        )
        .optional()?,
    )
  }

  /// All song plays with their generated ids, in insertion order.
  pub fn songplays(&self) -> Result<Vec<(i64, SongPlay)>> {
    let mut stmt = self.conn.prepare(
      "SELECT songplay_id, start_time, user_id, level, artist_id, song_id,
              session_id, location, user_agent
       FROM songplays ORDER BY songplay_id",
    )?;

    let rows = stmt
      .query_map([], |row| {
        Ok((row.get(0)?, SongPlay {
          start_time: row.get(1)?,
          user_id:    row.get(2)?,
          level:      row.get(3)?,
          artist_id:  row.get(4)?,
          song_id:    row.get(5)?,
          session_id: row.get(6)?,
          location:   row.get(7)?,
          user_agent: row.get(8)?,
        }))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
  }

  pub fn count(&self, table: &TableDef) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.name);
    Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
  }

  /// Row count of every table, in creation order.
  pub fn row_counts(&self) -> Result<Vec<(&'static str, i64)>> {
    CREATE_ORDER
      .iter()
      .map(|table| Ok((table.name, self.count(table)?)))
      .collect()
  }
}

// ─── Warehouse impl ──────────────────────────────────────────────────────────

impl Warehouse for SqliteWarehouse {
  type Error = Error;

  // ── Dimensions ────────────────────────────────────────────────────────────

  fn insert_artist(&self, artist: &Artist) -> Result<bool> {
    self.begin()?;
    let changed = ARTIST_INSERT.execute(&self.conn, [
      &artist.artist_id,
      &artist.name,
      &artist.location,
      &artist.latitude,
      &artist.longitude,
    ])?;
    Ok(changed > 0)
  }

  fn insert_song(&self, song: &Song) -> Result<bool> {
    self.begin()?;
    let changed = SONG_INSERT.execute(&self.conn, [
      &song.song_id,
      &song.title,
      &song.artist_id,
      &song.year,
      &song.duration,
    ])?;
    Ok(changed > 0)
  }

  fn upsert_user(&self, user: &User) -> Result<()> {
    self.begin()?;
    USER_INSERT.execute(&self.conn, [
      &user.user_id,
      &user.first_name,
      &user.last_name,
      &user.gender,
      &user.level,
    ])?;
    Ok(())
  }

  fn insert_time_bucket(&self, bucket: &TimeBucket) -> Result<bool> {
    self.begin()?;
    let changed = TIME_INSERT.execute(&self.conn, [
      &bucket.start_time,
      &bucket.hour,
      &bucket.day,
      &bucket.week,
      &bucket.month,
      &bucket.year,
      &bucket.weekday,
    ])?;
    Ok(changed > 0)
  }

  // ── Facts ─────────────────────────────────────────────────────────────────

  fn insert_songplay(&self, play: &SongPlay) -> Result<i64> {
    self.begin()?;
    SONGPLAY_INSERT.execute(&self.conn, [
      &play.start_time,
      &play.user_id,
      &play.level,
      &play.artist_id,
      &play.song_id,
      &play.session_id,
      &play.location,
      &play.user_agent,
    ])?;
    Ok(self.conn.last_insert_rowid())
  }

  // ── Lookups ───────────────────────────────────────────────────────────────

  fn find_song(
    &self,
    title: &str,
    duration: f64,
    artist_name: &str,
  ) -> Result<Option<SongMatch>> {
    Ok(SONG_SELECT.query_optional(
      &self.conn,
      [&title, &duration, &artist_name],
      |row| {
        Ok(SongMatch {
          song_id:   row.get(0)?,
          artist_id: row.get(1)?,
        })
      },
    )?)
  }

  // ── Transactions ──────────────────────────────────────────────────────────

  fn commit(&self) -> Result<()> {
    if !self.conn.is_autocommit() {
      self.conn.execute_batch("COMMIT")?;
    }
    Ok(())
  }
}
