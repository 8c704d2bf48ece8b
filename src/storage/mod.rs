//! Storage layer for Replicator data.
//!
//! Records are JSON documents kept under string keys by a pluggable
//! [`StorageBackend`]. The default backend writes one file per key under the
//! data directory:
//!
//! ```text
//! ~/.local/share/replicator/
//! ├── replicator_run_<runId>.json     # One document per deployed run
//! ├── replicator_latest_run.json      # ID of the most recent run
//! ├── replicator_board.json           # Planning board before deployment
//! ├── replicator_risk.json            # Risk appetite slider
//! ├── replicator_tempo.json           # Execution tempo slider
//! ├── replicator_latest_brief.json    # Last transmitted brief
//! ├── replicator_receptionist_runs.json
//! └── replicator_contacts.json
//! ```

pub mod backend;
pub mod migrate;

pub use backend::{BackendType, FileBackend, MemoryBackend, StorageBackend};
pub use migrate::migrate_run;

use crate::gui::view::RunPersister;
use crate::models::receptionist::ReceptionRun;
use crate::models::{Board, Brief, Run, RunSettings};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "RP_DATA_DIR";

/// Storage keys.
pub mod keys {
    pub const RUN_PREFIX: &str = "replicator_run_";
    pub const LATEST_RUN: &str = "replicator_latest_run";
    pub const RISK: &str = "replicator_risk";
    pub const TEMPO: &str = "replicator_tempo";
    pub const LATEST_BRIEF: &str = "replicator_latest_brief";
    pub const LAST_TRANSMIT: &str = "replicator_last_transmit";
    pub const RECEPTIONIST_RUNS: &str = "replicator_receptionist_runs";
    pub const CONTACTS: &str = "replicator_contacts";
    pub const BOARD: &str = "replicator_board";

    /// Key of a run document.
    pub fn run(run_id: &str) -> String {
        format!("{}{}", RUN_PREFIX, run_id)
    }
}

/// Main storage interface for Replicator data.
pub struct Storage {
    backend: Box<dyn StorageBackend>,
}

impl Storage {
    /// Open file-backed storage rooted at `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let backend = FileBackend::open(data_dir)?;
        debug!(root = %data_dir.display(), "opened file storage");
        Ok(Self::with_backend(Box::new(backend)))
    }

    /// Storage that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self::with_backend(Box::new(MemoryBackend::new()))
    }

    pub fn with_backend(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    pub fn backend_type(&self) -> &'static str {
        self.backend.backend_type()
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.read(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string_pretty(value)?;
        self.backend.write(key, &raw)
    }

    // === Runs ===

    /// Resolve the run to show: `query_run_id` when given, else the latest
    /// run pointer.
    ///
    /// Returns `Ok(None)` when no ID is available, the document is missing,
    /// or it cannot be parsed. Callers treat that as "redirect to deploy".
    pub fn resolve_run(&self, query_run_id: Option<&str>) -> Result<Option<Run>> {
        let run_id = match query_run_id.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => match self.latest_run_id()? {
                Some(id) => id,
                None => {
                    debug!("no run id in query and no latest run");
                    return Ok(None);
                }
            },
        };
        self.load_run(&run_id)
    }

    /// Load and migrate a run document by ID.
    pub fn load_run(&self, run_id: &str) -> Result<Option<Run>> {
        let key = keys::run(run_id);
        let Some(raw) = self.backend.read(&key)? else {
            debug!(run_id, "run document missing");
            return Ok(None);
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(run_id, error = %e, "run document is not valid JSON");
                return Ok(None);
            }
        };
        match serde_json::from_value(migrate_run(value, Utc::now())) {
            Ok(run) => Ok(Some(run)),
            Err(e) => {
                warn!(run_id, error = %e, "run document has an unexpected shape");
                Ok(None)
            }
        }
    }

    /// Like [`Storage::resolve_run`], but a missing run is an error.
    pub fn require_run(&self, query_run_id: Option<&str>) -> Result<Run> {
        match self.resolve_run(query_run_id)? {
            Some(run) => Ok(run),
            None => match query_run_id {
                Some(id) => Err(Error::NotFound(format!("Run {}", id))),
                None => Err(Error::NoRun),
            },
        }
    }

    /// Write a run document. Does not move the latest pointer.
    pub fn save_run(&mut self, run: &Run) -> Result<()> {
        self.write_json(&keys::run(&run.run_id), run)
    }

    /// Save a freshly deployed run and make it the latest.
    pub fn store_deployed_run(&mut self, run: &Run) -> Result<()> {
        self.save_run(run)?;
        self.set_latest_run(&run.run_id)?;
        info!(run_id = %run.run_id, tasks = run.tasks.len(), "deployed run");
        Ok(())
    }

    pub fn latest_run_id(&self) -> Result<Option<String>> {
        Ok(self
            .backend
            .read(keys::LATEST_RUN)?
            .map(|raw| raw.trim().to_string())
            .filter(|id| !id.is_empty()))
    }

    pub fn set_latest_run(&mut self, run_id: &str) -> Result<()> {
        self.backend.write(keys::LATEST_RUN, run_id)
    }

    /// IDs of every stored run, sorted.
    pub fn run_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .backend
            .keys()?
            .into_iter()
            .filter_map(|key| key.strip_prefix(keys::RUN_PREFIX).map(str::to_string))
            .collect())
    }

    // === Operator settings ===

    /// Risk and tempo sliders. Unreadable values fall back to defaults.
    pub fn settings(&self) -> Result<RunSettings> {
        let defaults = RunSettings::default();
        Ok(RunSettings {
            risk: self.read_scalar(keys::RISK)?.unwrap_or(defaults.risk),
            tempo: self.read_scalar(keys::TEMPO)?.unwrap_or(defaults.tempo),
        })
    }

    pub fn set_settings(&mut self, settings: &RunSettings) -> Result<()> {
        self.backend.write(keys::RISK, &settings.risk.to_string())?;
        self.backend.write(keys::TEMPO, &settings.tempo.to_string())
    }

    fn read_scalar(&self, key: &str) -> Result<Option<u8>> {
        let Some(raw) = self.backend.read(key)? else {
            return Ok(None);
        };
        match raw.trim().trim_matches('"').parse::<u8>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                warn!(key, value = %raw, "ignoring unreadable slider value");
                Ok(None)
            }
        }
    }

    pub fn latest_brief(&self) -> Result<Option<Brief>> {
        self.read_json(keys::LATEST_BRIEF)
    }

    /// Store the brief and stamp the transmit time.
    pub fn transmit_brief(&mut self, brief: &Brief, now: DateTime<Utc>) -> Result<()> {
        self.write_json(keys::LATEST_BRIEF, brief)?;
        self.backend.write(keys::LAST_TRANSMIT, &now.to_rfc3339())
    }

    pub fn last_transmit(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.backend.read(keys::LAST_TRANSMIT)? else {
            return Ok(None);
        };
        Ok(DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc)))
    }

    // === Planning board ===

    /// The planning board, or the default board when none is stored.
    pub fn load_board(&self) -> Result<Board> {
        Ok(self.read_json(keys::BOARD)?.unwrap_or_default())
    }

    pub fn save_board(&mut self, board: &Board) -> Result<()> {
        self.write_json(keys::BOARD, board)
    }

    pub fn clear_board(&mut self) -> Result<()> {
        self.backend.remove(keys::BOARD)
    }

    // === Receptionist ===

    /// Receptionist runs, newest first.
    pub fn receptionist_runs(&self) -> Result<Vec<ReceptionRun>> {
        Ok(self.read_json(keys::RECEPTIONIST_RUNS)?.unwrap_or_default())
    }

    pub fn receptionist_run(&self, run_id: &str) -> Result<Option<ReceptionRun>> {
        Ok(self
            .receptionist_runs()?
            .into_iter()
            .find(|r| r.run_id == run_id))
    }

    /// Record a new receptionist run at the front of the list.
    pub fn add_receptionist_run(&mut self, run: &ReceptionRun) -> Result<()> {
        let mut runs = self.receptionist_runs()?;
        runs.retain(|r| r.run_id != run.run_id);
        runs.insert(0, run.clone());
        self.write_json(keys::RECEPTIONIST_RUNS, &runs)
    }

    /// Replace a stored receptionist run with the same ID.
    pub fn update_receptionist_run(&mut self, run: &ReceptionRun) -> Result<()> {
        let mut runs = self.receptionist_runs()?;
        let slot = runs
            .iter_mut()
            .find(|r| r.run_id == run.run_id)
            .ok_or_else(|| Error::NotFound(format!("Receptionist run {}", run.run_id)))?;
        *slot = run.clone();
        self.write_json(keys::RECEPTIONIST_RUNS, &runs)
    }

    /// Contacts list. Read-only from this crate's point of view.
    pub fn contacts(&self) -> Result<Vec<serde_json::Value>> {
        Ok(self.read_json(keys::CONTACTS)?.unwrap_or_default())
    }
}

impl RunPersister for Storage {
    fn persist(&mut self, run: &Run) -> Result<()> {
        self.save_run(run)
    }
}

/// Resolve the data directory.
///
/// Precedence: explicit override, then `RP_DATA_DIR`, then the platform data
/// directory joined with `replicator`.
pub fn get_data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("replicator"))
}

/// Generate an ID for a board task.
///
/// Format: `<prefix>-<4 hex chars>`
pub fn generate_id(prefix: &str, seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or(0)
            .to_le_bytes(),
    );
    let hash = hasher.finalize();
    let hash_hex = format!("{:x}", hash);
    format!("{}-{}", prefix, &hash_hex[..4])
}

/// Generate an ID not present in `taken`.
pub fn generate_unique_id(prefix: &str, seed: &str, taken: &[&str]) -> String {
    let mut attempt = 0u32;
    loop {
        let id = generate_id(prefix, &format!("{}:{}", seed, attempt));
        if !taken.contains(&id.as_str()) {
            return id;
        }
        attempt += 1;
    }
}
