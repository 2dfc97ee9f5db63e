//! Per-subject score persistence.
//!
//! Scores are one JSON object (`{"physics": 100, "math": 67}`) stored under the
//! fixed key [`QUIZ_SCORES_KEY`] in a [`KeyValueStore`]. Reads fail soft: a
//! missing or corrupt value is "no scores yet".

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::error::ScoreError;
use crate::model::SubjectSlug;

/// Storage key holding the score mapping.
pub const QUIZ_SCORES_KEY: &str = "quizScores";

/// Stored percentage per subject.
pub type Scores = BTreeMap<SubjectSlug, u8>;

/// Minimal string key-value storage that outlives the process.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Writes to a temp file in the same directory, then renames it over the
    /// target, so readers never see a half-written value.
    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

/// In-process store, mostly for tests and practice sessions.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Persistence port for quiz scores.
pub trait ScoreStore: Send + Sync {
    /// All stored scores. Never fails; broken storage reads as empty.
    fn load(&self) -> Scores;

    /// Store `percentage` for `subject`, keeping every other entry.
    fn save(&self, subject: SubjectSlug, percentage: u8) -> Result<(), ScoreError>;

    /// Whether a score record exists at all, even one without a known subject.
    fn has_record(&self) -> bool {
        !self.load().is_empty()
    }
}

/// [`ScoreStore`] over any [`KeyValueStore`].
pub struct KvScoreStore<S> {
    kv: S,
}

impl<S: KeyValueStore> KvScoreStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn inner(&self) -> &S {
        &self.kv
    }

    /// The raw JSON object, or `None` when absent, unreadable or not an object.
    fn read_raw(&self) -> Option<Map<String, Value>> {
        let content = match self.kv.get(QUIZ_SCORES_KEY) {
            Ok(Some(content)) => content,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("failed to read scores: {e}");
                return None;
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Some(map),
            Ok(other) => {
                tracing::warn!("ignoring stored scores: expected object, found {other}");
                None
            }
            Err(e) => {
                tracing::warn!("failed to parse stored scores: {e}");
                None
            }
        }
    }
}

impl KvScoreStore<FileKeyValueStore> {
    /// File-backed store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::new(FileKeyValueStore::new(dir))
    }
}

impl KvScoreStore<MemoryKeyValueStore> {
    pub fn in_memory() -> Self {
        Self::new(MemoryKeyValueStore::new())
    }
}

impl<S: KeyValueStore> ScoreStore for KvScoreStore<S> {
    fn load(&self) -> Scores {
        let Some(raw) = self.read_raw() else {
            return Scores::new();
        };

        raw.iter()
            .filter_map(|(key, value)| {
                let slug = SubjectSlug::from_key(key)?;
                let pct = value.as_u64().filter(|p| *p <= 100)?;
                Some((slug, pct as u8))
            })
            .collect()
    }

    fn has_record(&self) -> bool {
        self.read_raw().is_some()
    }

    fn save(&self, subject: SubjectSlug, percentage: u8) -> Result<(), ScoreError> {
        if percentage > 100 {
            return Err(ScoreError::OutOfRange(percentage));
        }

        // Unknown keys survive the rewrite untouched.
        let mut raw = self.read_raw().unwrap_or_default();
        raw.insert(subject.to_string(), Value::from(percentage));

        let encoded = serde_json::to_string(&Value::Object(raw))?;
        self.kv.set(QUIZ_SCORES_KEY, &encoded)?;
        tracing::debug!(%subject, percentage, "saved quiz score");
        Ok(())
    }
}
