//! Integration tests for `SqliteWarehouse` and the schema manager.

use sparkify_core::{
  model::{Artist, Song, SongMatch, SongPlay, TimeBucket, User},
  store::Warehouse,
};

use crate::{
  DatabaseConfig, Error, SqliteWarehouse,
  catalog::{ARTISTS, SONGPLAYS, SONGS, TIME, USERS},
  create_database, create_tables, drop_tables, reset,
};

fn store() -> SqliteWarehouse {
  SqliteWarehouse::open_in_memory().expect("in-memory store")
}

fn artist() -> Artist {
  Artist {
    artist_id: "Art1".into(),
    name:      "Artist A".into(),
    location:  Some("Memphis, TN".into()),
    latitude:  Some(35.14968),
    longitude: Some(-90.04892),
  }
}

fn song() -> Song {
  Song {
    song_id:   "SOSong1".into(),
    title:     "Title A".into(),
    artist_id: "Art1".into(),
    year:      Some(2000),
    duration:  Some(210.5),
  }
}

fn user(level: &str) -> User {
  User {
    user_id:    "26".into(),
    first_name: Some("Ryan".into()),
    last_name:  Some("Smith".into()),
    gender:     Some("M".into()),
    level:      Some(level.into()),
  }
}

fn play(start_time: i64, found: Option<SongMatch>) -> SongPlay {
  SongPlay {
    start_time,
    user_id: "26".into(),
    level: Some("free".into()),
    artist_id: found.as_ref().map(|m| m.artist_id.clone()),
    song_id: found.map(|m| m.song_id),
    session_id: Some("583".into()),
    location: Some("San Jose-Sunnyvale-Santa Clara, CA".into()),
    user_agent: Some("Mozilla/5.0".into()),
  }
}

/// Insert one row into every table.
fn populate(s: &SqliteWarehouse) {
  s.insert_artist(&artist()).unwrap();
  s.insert_song(&song()).unwrap();
  s.upsert_user(&user("free")).unwrap();
  let bucket = TimeBucket::from_millis(1_541_121_934_796).unwrap();
  s.insert_time_bucket(&bucket).unwrap();
  let found = s.find_song("Title A", 210.5, "Artist A").unwrap();
  s.insert_songplay(&play(bucket.start_time, found)).unwrap();
  s.commit().unwrap();
}

// ─── Dimensions ──────────────────────────────────────────────────────────────

#[test]
fn artist_and_song_roundtrip_exactly() {
  let s = store();
  assert!(s.insert_artist(&artist()).unwrap());
  assert!(s.insert_song(&song()).unwrap());
  s.commit().unwrap();

  assert_eq!(s.get_artist("Art1").unwrap(), Some(artist()));
  assert_eq!(s.get_song("SOSong1").unwrap(), Some(song()));
}

#[test]
fn artist_and_song_inserts_ignore_conflicts() {
  let s = store();
  s.insert_artist(&artist()).unwrap();
  s.insert_song(&song()).unwrap();

  let mut renamed = artist();
  renamed.name = "Someone Else".into();
  let mut retitled = song();
  retitled.title = "Other Title".into();

  assert!(!s.insert_artist(&renamed).unwrap());
  assert!(!s.insert_song(&retitled).unwrap());
  s.commit().unwrap();

  assert_eq!(s.count(&ARTISTS).unwrap(), 1);
  assert_eq!(s.count(&SONGS).unwrap(), 1);
  assert_eq!(s.get_artist("Art1").unwrap().unwrap().name, "Artist A");
  assert_eq!(s.get_song("SOSong1").unwrap().unwrap().title, "Title A");
}

#[test]
fn user_upsert_overwrites_only_level() {
  let s = store();
  s.upsert_user(&user("free")).unwrap();

  let mut changed = user("paid");
  changed.first_name = Some("Renamed".into());
  s.upsert_user(&changed).unwrap();
  s.commit().unwrap();

  let stored = s.get_user("26").unwrap().unwrap();
  assert_eq!(s.count(&USERS).unwrap(), 1);
  assert_eq!(stored.level.as_deref(), Some("paid"));
  assert_eq!(stored.first_name.as_deref(), Some("Ryan"));
}

#[test]
fn time_bucket_is_stored_once() {
  let s = store();
  let bucket = TimeBucket::from_millis(1_541_121_934_796).unwrap();

  assert!(s.insert_time_bucket(&bucket).unwrap());
  assert!(!s.insert_time_bucket(&bucket).unwrap());
  s.commit().unwrap();

  assert_eq!(s.count(&TIME).unwrap(), 1);
  assert_eq!(s.get_time_bucket(bucket.start_time).unwrap(), Some(bucket));
}

// ─── Lookups and facts ───────────────────────────────────────────────────────

#[test]
fn find_song_matches_title_duration_and_artist_name() {
  let s = store();
  s.insert_artist(&artist()).unwrap();
  s.insert_song(&song()).unwrap();

  let found = s.find_song("Title A", 210.5, "Artist A").unwrap();
  assert_eq!(found, Some(SongMatch {
    song_id:   "SOSong1".into(),
    artist_id: "Art1".into(),
  }));
}

#[test]
fn find_song_is_exact() {
  let s = store();
  s.insert_artist(&artist()).unwrap();
  s.insert_song(&song()).unwrap();

  assert_eq!(s.find_song("Unknown", 210.5, "Artist A").unwrap(), None);
  assert_eq!(s.find_song("title a", 210.5, "Artist A").unwrap(), None);
  assert_eq!(s.find_song("Title A", 210.50001, "Artist A").unwrap(), None);
  assert_eq!(s.find_song("Title A", 210.5, "Artist B").unwrap(), None);
}

#[test]
fn songplays_append_with_generated_ids() {
  let s = store();
  s.upsert_user(&user("free")).unwrap();
  s.insert_time_bucket(&TimeBucket::from_millis(1_000).unwrap()).unwrap();

  let first = s.insert_songplay(&play(1_000, None)).unwrap();
  let second = s.insert_songplay(&play(1_000, None)).unwrap();
  s.commit().unwrap();

  assert!(second > first);
  let plays = s.songplays().unwrap();
  assert_eq!(plays.len(), 2);
  assert_eq!(plays[0].0, first);
  assert_eq!(plays[0].1.song_id, None);
  assert_eq!(plays[0].1.artist_id, None);
}

#[test]
fn songplay_requires_known_user_and_time() {
  let s = store();
  let err = s.insert_songplay(&play(1_000, None)).unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}

// ─── Transactions ────────────────────────────────────────────────────────────

#[test]
fn uncommitted_writes_are_rolled_back_on_drop() {
  let dir = tempfile::tempdir().unwrap();
  let config = DatabaseConfig {
    data_dir: dir.path().to_path_buf(),
    name:     "sparkifydb".into(),
  };
  let conn = create_database(&config).unwrap();
  create_tables(&conn).unwrap();
  drop(conn);

  {
    let s = SqliteWarehouse::open(config.path()).unwrap();
    s.insert_artist(&artist()).unwrap();
    s.commit().unwrap();
    s.insert_song(&song()).unwrap();
  }

  let s = SqliteWarehouse::open(config.path()).unwrap();
  assert_eq!(s.count(&ARTISTS).unwrap(), 1);
  assert_eq!(s.count(&SONGS).unwrap(), 0);
}

#[test]
fn commit_without_writes_is_a_no_op() {
  let s = store();
  s.commit().unwrap();
  s.commit().unwrap();
}

// ─── Schema manager ──────────────────────────────────────────────────────────

#[test]
fn drop_then_create_from_empty_database() {
  let s = store();
  drop_tables(s.connection()).unwrap();
  drop_tables(s.connection()).unwrap();
  create_tables(s.connection()).unwrap();
  assert_eq!(s.count(&SONGPLAYS).unwrap(), 0);
}

#[test]
fn drop_then_create_from_populated_database() {
  let s = store();
  populate(&s);
  assert_eq!(s.count(&SONGPLAYS).unwrap(), 1);
  assert_eq!(s.songplays().unwrap()[0].1.song_id.as_deref(), Some("SOSong1"));

  reset(s.connection()).unwrap();

  for (_, rows) in s.row_counts().unwrap() {
    assert_eq!(rows, 0);
  }
}

#[test]
fn create_tables_fails_when_tables_exist() {
  let s = store();
  let err = create_tables(s.connection()).unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}

#[test]
fn create_database_replaces_existing_file() {
  let dir = tempfile::tempdir().unwrap();
  let config = DatabaseConfig {
    data_dir: dir.path().to_path_buf(),
    name:     "sparkifydb".into(),
  };

  let s = SqliteWarehouse::from_connection(create_database(&config).unwrap()).unwrap();
  create_tables(s.connection()).unwrap();
  populate(&s);
  drop(s);

  let conn = create_database(&config).unwrap();
  let tables: i64 = conn
    .query_row(
      "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
      [],
      |row| row.get(0),
    )
    .unwrap();
  assert_eq!(tables, 0);

  let encoding: String = conn
    .query_row("PRAGMA encoding", [], |row| row.get(0))
    .unwrap();
  assert_eq!(encoding, "UTF-8");
}

#[test]
fn create_database_requires_data_dir() {
  let dir = tempfile::tempdir().unwrap();
  let config = DatabaseConfig {
    data_dir: dir.path().join("missing"),
    name:     "sparkifydb".into(),
  };
  assert!(matches!(
    create_database(&config),
    Err(Error::DataDirUnavailable(_))
  ));
}

#[test]
fn open_does_not_create_missing_database() {
  let dir = tempfile::tempdir().unwrap();
  assert!(SqliteWarehouse::open(dir.path().join("absent.db")).is_err());
}
