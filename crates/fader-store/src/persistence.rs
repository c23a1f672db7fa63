#![forbid(unsafe_code)]

//! Scenario persistence for save/restore across sessions.
//!
//! This module provides the [`SavedScenario`] wire format and the
//! [`StorageBackend`] infrastructure for persisting one scenario snapshot.
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: Storage failures never panic; operations return `Result`.
//! 2. **Atomic writes**: File storage uses write-rename pattern to prevent corruption.
//! 3. **Trust nothing loaded**: Persisted data is revalidated (lengths, sum,
//!    entity count) before it becomes a live [`Scenario`].
//! 4. **Version gate**: A schema version mismatch discards the stored data
//!    rather than guessing at a migration.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `ScenarioError::Io` | File I/O failure | Returns error |
//! | `ScenarioError::Serialization` | JSON encode/decode | Returns error |
//! | `ScenarioError::LengthMismatch` | Hand-edited file | Load rejected |
//! | `ScenarioError::BadSum` | Hand-edited file | Load rejected |
//! | `ScenarioError::BadEntityCount` | Hand-edited file | Load rejected |
//! | Version mismatch | Older/newer format | Treated as no saved state |

use fader_core::{MAX_ENTITIES, MIN_ENTITIES, Scenario};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u32 = 1;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur loading or saving a scenario.
#[derive(Debug)]
pub enum ScenarioError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    Serialization(String),
    /// Entity arrays in the stored data have different lengths.
    LengthMismatch {
        values: usize,
        locks: usize,
        labels: usize,
        colors: usize,
    },
    /// Stored values do not sum to the budget.
    BadSum { sum: u32, expected: u32 },
    /// Entity count outside the supported range.
    BadEntityCount(usize),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioError::Io(e) => write!(f, "I/O error: {e}"),
            ScenarioError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            ScenarioError::LengthMismatch {
                values,
                locks,
                labels,
                colors,
            } => write!(
                f,
                "entity array length mismatch: {values} values, {locks} locks, \
                 {labels} labels, {colors} colors"
            ),
            ScenarioError::BadSum { sum, expected } => {
                write!(f, "stored values sum to {sum}, expected {expected}")
            }
            ScenarioError::BadEntityCount(n) => write!(
                f,
                "unsupported entity count {n} (expected {MIN_ENTITIES}..={MAX_ENTITIES})"
            ),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ScenarioError {
    fn from(e: std::io::Error) -> Self {
        ScenarioError::Io(e)
    }
}

/// Result type for scenario storage operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

// ─────────────────────────────────────────────────────────────────────────────
// Wire Format
// ─────────────────────────────────────────────────────────────────────────────

/// The serialized form of one scenario.
///
/// Kept separate from [`Scenario`] so the live type can evolve without
/// silently changing the on-disk format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedScenario {
    /// Format version for future migrations.
    pub schema_version: u32,
    pub values: Vec<u32>,
    pub locks: Vec<bool>,
    pub labels: Vec<String>,
    pub colors: Vec<String>,
    pub unit: String,
}

impl SavedScenario {
    /// Capture a live scenario for storage.
    #[must_use]
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            values: scenario.values.clone(),
            locks: scenario.locks.clone(),
            labels: scenario.labels.clone(),
            colors: scenario.colors.clone(),
            unit: scenario.unit.clone(),
        }
    }

    /// Validate and convert back into a live scenario.
    ///
    /// The stored arrays must have equal lengths, an entity count inside
    /// the supported range, and values summing exactly to the budget.
    pub fn into_scenario(self) -> ScenarioResult<Scenario> {
        let n = self.values.len();
        if self.locks.len() != n || self.labels.len() != n || self.colors.len() != n {
            return Err(ScenarioError::LengthMismatch {
                values: n,
                locks: self.locks.len(),
                labels: self.labels.len(),
                colors: self.colors.len(),
            });
        }
        if !(MIN_ENTITIES..=MAX_ENTITIES).contains(&n) {
            return Err(ScenarioError::BadEntityCount(n));
        }

        let scenario = Scenario::new(self.values, self.locks, self.labels, self.colors, self.unit);
        let sum: u32 = scenario.values.iter().sum();
        if sum != scenario.total {
            return Err(ScenarioError::BadSum {
                sum,
                expected: scenario.total,
            });
        }
        Ok(scenario)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Storage Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for pluggable scenario storage backends.
///
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Implementation Notes
///
/// - `load` returns `Ok(None)` when nothing is stored (first run) or when
///   the stored format version is unrecognized.
/// - `save` should be atomic (write-then-rename pattern for files).
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Load the stored scenario, if any.
    fn load(&self) -> ScenarioResult<Option<SavedScenario>>;

    /// Save the scenario, replacing any previous one.
    fn save(&self, saved: &SavedScenario) -> ScenarioResult<()>;

    /// Remove any stored scenario.
    fn clear(&self) -> ScenarioResult<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory storage backend for testing and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    slot: RwLock<Option<SavedScenario>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn load(&self) -> ScenarioResult<Option<SavedScenario>> {
        let guard = self
            .slot
            .read()
            .map_err(|_| ScenarioError::Serialization("lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, saved: &SavedScenario) -> ScenarioResult<()> {
        let mut guard = self
            .slot
            .write()
            .map_err(|_| ScenarioError::Serialization("lock poisoned".into()))?;
        *guard = Some(saved.clone());
        Ok(())
    }

    fn clear(&self) -> ScenarioResult<()> {
        let mut guard = self
            .slot
            .write()
            .map_err(|_| ScenarioError::Serialization("lock poisoned".into()))?;
        *guard = None;
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let occupied = self.slot.read().map(|g| g.is_some()).unwrap_or(false);
        f.debug_struct("MemoryStorage")
            .field("occupied", &occupied)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage
// ─────────────────────────────────────────────────────────────────────────────

/// File-based storage backend using JSON.
///
/// # Atomic Writes
///
/// Writes use a temporary file + rename pattern to prevent corruption:
/// 1. Write to `{path}.tmp`
/// 2. Flush and sync
/// 3. Rename `{path}.tmp` -> `{path}`
/// 4. Sync the parent directory (unix), making the rename durable
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a file storage at the given path.
    ///
    /// The file does not need to exist; it will be created on first save.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create storage at the default location for the application.
    ///
    /// Uses `$XDG_STATE_HOME/fader/{app_name}/scenario.json` on Linux,
    /// falling back to `~/.local/state` and finally the current directory.
    #[must_use]
    pub fn default_for_app(app_name: &str) -> Self {
        let base = state_dir_or_fallback();
        let path = base.join("fader").join(app_name).join("scenario.json");
        Self { path }
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        tmp
    }
}

fn state_dir_or_fallback() -> PathBuf {
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(state_home);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("state");
    }
    PathBuf::from(".")
}

impl StorageBackend for FileStorage {
    fn name(&self) -> &str {
        "FileStorage"
    }

    fn load(&self) -> ScenarioResult<Option<SavedScenario>> {
        if !self.path.exists() {
            // First run - no scenario yet
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let saved: SavedScenario = serde_json::from_reader(reader).map_err(|e| {
            ScenarioError::Serialization(format!("failed to parse scenario file: {e}"))
        })?;

        if saved.schema_version != SCHEMA_VERSION {
            tracing::warn!(
                stored = saved.schema_version,
                expected = SCHEMA_VERSION,
                "scenario schema version mismatch, ignoring stored scenario"
            );
            return Ok(None);
        }

        Ok(Some(saved))
    }

    fn save(&self, saved: &SavedScenario) -> ScenarioResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.temp_path();
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, saved).map_err(|e| {
                ScenarioError::Serialization(format!("failed to serialize scenario: {e}"))
            })?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        // The rename itself is durable only once the parent directory
        // entry is synced.
        #[cfg(unix)]
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                File::open(parent)?.sync_all()?;
            }
        }

        tracing::debug!(path = %self.path.display(), "saved scenario");
        Ok(())
    }

    fn clear(&self) -> ScenarioResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Scenario {
        Scenario::default()
            .with_label(0, "Work")
            .toggle_lock(1)
    }

    #[test]
    fn round_trip_through_wire_format() {
        let scenario = sample();
        let saved = SavedScenario::from_scenario(&scenario);
        assert_eq!(saved.schema_version, SCHEMA_VERSION);
        let restored = saved.into_scenario().unwrap();
        assert_eq!(restored, scenario);
    }

    #[test]
    fn memory_storage_round_trips() {
        let storage = MemoryStorage::new();
        assert!(storage.load().unwrap().is_none());

        let saved = SavedScenario::from_scenario(&sample());
        storage.save(&saved).unwrap();
        assert_eq!(storage.load().unwrap(), Some(saved));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn load_rejects_length_mismatch() {
        let mut saved = SavedScenario::from_scenario(&sample());
        saved.locks.pop();
        assert!(matches!(
            saved.into_scenario(),
            Err(ScenarioError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn load_rejects_bad_sum() {
        let mut saved = SavedScenario::from_scenario(&sample());
        saved.values[0] = 99;
        assert!(matches!(
            saved.into_scenario(),
            Err(ScenarioError::BadSum { sum: 174, expected: 100 })
        ));
    }

    #[test]
    fn load_rejects_bad_entity_count() {
        let saved = SavedScenario {
            schema_version: SCHEMA_VERSION,
            values: vec![],
            locks: vec![],
            labels: vec![],
            colors: vec![],
            unit: "Time".into(),
        };
        assert!(matches!(
            saved.into_scenario(),
            Err(ScenarioError::BadEntityCount(0))
        ));
    }

    #[test]
    fn error_display_is_informative() {
        let err = ScenarioError::BadSum { sum: 90, expected: 100 };
        assert_eq!(err.to_string(), "stored values sum to 90, expected 100");
    }
}
