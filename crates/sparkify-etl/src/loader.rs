//! File discovery and the per-file transforms for song metadata and event
//! logs.

use std::{
  collections::{BTreeMap, btree_map::Entry},
  ffi::OsStr,
  fs,
  ops::AddAssign,
  path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use sparkify_core::{
  model::User,
  record::{LogEvent, SongRecord},
  store::Warehouse,
};
use walkdir::WalkDir;

use crate::{Error, Result};

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Rows written while loading one file or a whole directory.
///
/// `artists`, `songs` and `time_buckets` count new rows only; rows skipped by
/// the ignore-on-conflict policy are not included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
  pub files:        usize,
  pub artists:      usize,
  pub songs:        usize,
  pub users:        usize,
  pub time_buckets: usize,
  pub songplays:    usize,
  /// Song plays whose song was found in the catalog.
  pub matched:      usize,
}

impl AddAssign for LoadStats {
  fn add_assign(&mut self, rhs: Self) {
    self.files += rhs.files;
    self.artists += rhs.artists;
    self.songs += rhs.songs;
    self.users += rhs.users;
    self.time_buckets += rhs.time_buckets;
    self.songplays += rhs.songplays;
    self.matched += rhs.matched;
  }
}

fn store_err<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}

// ─── Discovery ───────────────────────────────────────────────────────────────

/// Every `*.json` file below `root`, as absolute paths in lexicographic order.
pub fn discover_files(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
  let root = root.as_ref();
  let root = std::path::absolute(root).map_err(|source| Error::Io {
    path: root.to_path_buf(),
    source,
  })?;

  let mut files = Vec::new();
  for entry in WalkDir::new(&root).follow_links(true) {
    let entry = entry?;
    if entry.file_type().is_file() && entry.path().extension() == Some(OsStr::new("json")) {
      files.push(entry.into_path());
    }
  }

  files.sort();
  Ok(files)
}

/// Parse a newline-delimited JSON file, skipping blank lines.
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
  let text = fs::read_to_string(path).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })?;

  text
    .lines()
    .enumerate()
    .filter(|(_, line)| !line.trim().is_empty())
    .map(|(idx, line)| {
      serde_json::from_str(line).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        line: idx + 1,
        source,
      })
    })
    .collect()
}

// ─── Song metadata ───────────────────────────────────────────────────────────

/// Load the artist and then the song described by the first record of a song
/// metadata file.
pub fn process_song_file<W: Warehouse>(store: &W, path: &Path) -> Result<LoadStats> {
  let records: Vec<SongRecord> = read_records(path)?;
  let record = records
    .first()
    .ok_or_else(|| Error::EmptyFile(path.to_path_buf()))?;

  let artists = store.insert_artist(&record.artist()).map_err(store_err)?;
  let songs = store.insert_song(&record.song()).map_err(store_err)?;

  Ok(LoadStats {
    files: 1,
    artists: artists.into(),
    songs: songs.into(),
    ..LoadStats::default()
  })
}

// ─── Event logs ──────────────────────────────────────────────────────────────

/// Load the time buckets, users and song plays of every `NextSong` event in
/// an event log file. Other events are ignored.
pub fn process_log_file<W: Warehouse>(store: &W, path: &Path) -> Result<LoadStats> {
  let plays: Vec<LogEvent> = read_records::<LogEvent>(path)?
    .into_iter()
    .filter(LogEvent::is_song_play)
    .collect();

  let mut stats = LoadStats { files: 1, ..LoadStats::default() };

  // All timestamps are decomposed before anything is written.
  let mut buckets = BTreeMap::new();
  for event in &plays {
    if let Entry::Vacant(slot) = buckets.entry(event.ts) {
      slot.insert(event.time_bucket()?);
    }
  }
  for bucket in buckets.values() {
    stats.time_buckets += usize::from(store.insert_time_bucket(bucket).map_err(store_err)?);
  }

  // Later events for the same user replace earlier ones.
  let mut users: BTreeMap<String, User> = BTreeMap::new();
  for event in &plays {
    let user = event.user();
    users.insert(user.user_id.clone(), user);
  }
  for user in users.values() {
    store.upsert_user(user).map_err(store_err)?;
  }
  stats.users = users.len();

  for event in &plays {
    let found = match event.song_key() {
      Some((title, duration, artist)) => {
        store.find_song(title, duration, artist).map_err(store_err)?
      }
      None => None,
    };
    stats.matched += usize::from(found.is_some());

    store.insert_songplay(&event.song_play(found)).map_err(store_err)?;
    stats.songplays += 1;
  }

  Ok(stats)
}

// ─── Directories ─────────────────────────────────────────────────────────────

/// Run `handler` on every JSON file below `root`, committing after each file.
///
/// Files are processed in order and the first failure stops the run; files
/// committed before it stay committed.
pub fn process_directory<W, F>(store: &W, root: impl AsRef<Path>, mut handler: F) -> Result<LoadStats>
where
  W: Warehouse,
  F: FnMut(&W, &Path) -> Result<LoadStats>,
{
  let root = root.as_ref();
  let files = discover_files(root)?;
  let total = files.len();
  tracing::info!("{total} files found in {}", root.display());

  let mut stats = LoadStats::default();
  for (done, path) in files.iter().enumerate() {
    let file_stats = handler(store, path).inspect_err(|e| {
      tracing::error!(path = %path.display(), "failed to load file: {e}");
    })?;
    store.commit().map_err(store_err)?;

    tracing::debug!(path = %path.display(), ?file_stats, "loaded file");
    tracing::info!("{}/{total} files processed.", done + 1);
    stats += file_stats;
  }

  Ok(stats)
}
