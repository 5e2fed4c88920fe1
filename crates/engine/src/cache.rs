//! Persisted neighbor cache
//!
//! Maps a user identifier to that user's full sorted neighbor list. The
//! cache is loaded once at construction, consulted before any similarity
//! computation, and rewritten whole whenever a new user's neighborhood is
//! stored. A present entry is authoritative: it is never recomputed or
//! invalidated by later rating changes unless the engine is configured to
//! refresh.
//!
//! On-disk schema (versioned structured text): a header line identifying
//! the format, then one line per user holding the identifier and the JSON
//! array of its neighbor records, tab-separated. Storing then reloading
//! reproduces the mapping exactly.

use dashmap::DashMap;
use recommender_core::{NeighborRecord, RecommenderError, Result};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// First line of every cache file
const HEADER: &str = "#neighbor-cache v1";

/// On-disk cache of computed neighborhoods
///
/// The in-memory mapping is concurrent; the whole-file rewrite performed by
/// `store` is serialized by an exclusive persist lock.
#[derive(Debug)]
pub struct NeighborCache {
    path: PathBuf,
    entries: DashMap<u32, Vec<NeighborRecord>>,
    persist_lock: Mutex<()>,
    skipped_lines: usize,
}

impl NeighborCache {
    /// Open the cache file, loading every parseable line
    ///
    /// A missing file yields an empty cache (it will be created on the first
    /// `store`). Malformed lines are skipped and counted rather than
    /// aborting the load.
    ///
    /// # Errors
    ///
    /// Returns a `Cache` error when the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = DashMap::new();
        let mut skipped = 0usize;

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                for line in text.lines() {
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    match parse_line(line) {
                        Some((user_id, records)) => {
                            entries.insert(user_id, records);
                        }
                        None => {
                            skipped += 1;
                            warn!(path = %path.display(), "skipping malformed cache line");
                        }
                    }
                }
                info!(
                    path = %path.display(),
                    users = entries.len(),
                    skipped,
                    "neighbor cache loaded"
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no neighbor cache file, starting empty");
            }
            Err(e) => {
                return Err(RecommenderError::cache(
                    &path,
                    format!("cannot read cache file: {}", e),
                ));
            }
        }

        Ok(Self {
            path,
            entries,
            persist_lock: Mutex::new(()),
            skipped_lines: skipped,
        })
    }

    /// The full neighbor list stored for a user, if any
    pub fn lookup(&self, user_id: u32) -> Option<Vec<NeighborRecord>> {
        self.entries.get(&user_id).map(|records| records.value().clone())
    }

    /// Whether the cache holds an entry for the user
    pub fn contains(&self, user_id: u32) -> bool {
        self.entries.contains_key(&user_id)
    }

    /// Insert a user's full neighbor list and persist the whole mapping
    ///
    /// The entire file is rewritten under the persist lock; concurrent
    /// stores for different users serialize here. The write goes through a
    /// temporary file and rename so an interrupted rewrite never truncates
    /// the existing cache.
    pub fn store(&self, user_id: u32, records: Vec<NeighborRecord>) -> Result<()> {
        self.entries.insert(user_id, records);

        let _guard = self
            .persist_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.persist()
    }

    /// Number of users currently cached
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of malformed lines skipped while loading
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    fn persist(&self) -> Result<()> {
        let mut lines = Vec::with_capacity(self.entries.len() + 1);
        lines.push(HEADER.to_string());

        // File order is sorted by user id
        let mut user_ids: Vec<u32> = self.entries.iter().map(|entry| *entry.key()).collect();
        user_ids.sort_unstable();

        for user_id in user_ids {
            if let Some(records) = self.entries.get(&user_id) {
                let payload = serde_json::to_string(records.value()).map_err(|e| {
                    RecommenderError::cache(&self.path, format!("cannot serialize entry: {}", e))
                })?;
                lines.push(format!("{}\t{}", user_id, payload));
            }
        }

        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, lines.join("\n") + "\n")?;
        std::fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), users = self.entries.len(), "neighbor cache persisted");
        Ok(())
    }
}

fn parse_line(line: &str) -> Option<(u32, Vec<NeighborRecord>)> {
    let (id_part, payload) = line.split_once('\t')?;
    let user_id = id_part.parse().ok()?;
    let records = serde_json::from_str(payload).ok()?;
    Some((user_id, records))
}
