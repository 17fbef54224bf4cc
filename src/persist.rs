//! Flat-file persistence of the shell state between runs.
//!
//! Layout: the current node uuid on the first line (empty for root), a blank
//! separator line, then the command history with the newest entry last.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use directories::BaseDirs;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::{HISTORY_LIMIT, ROOT_NODE_UUID};

const STATE_FILE_NAME: &str = ".antbox-cli";

/// Every save takes a generation when it is requested. Writes to one path are
/// serialized, and a save older than the last one written is dropped.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);
static WRITTEN: Lazy<Mutex<HashMap<PathBuf, u64>>> = Lazy::new(|| Mutex::new(HashMap::new()));

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to resolve home directory")]
    NoHomeDir,
    #[error("failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedState {
    pub current_node_uuid: String,
    pub history: Vec<String>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            current_node_uuid: ROOT_NODE_UUID.to_string(),
            history: Vec::new(),
        }
    }
}

impl PersistedState {
    pub fn new(current_node_uuid: impl Into<String>, history: Vec<String>) -> Self {
        Self {
            current_node_uuid: current_node_uuid.into(),
            history,
        }
    }

    pub fn encode(&self) -> String {
        let current = if self.current_node_uuid == ROOT_NODE_UUID {
            ""
        } else {
            self.current_node_uuid.as_str()
        };
        let skip = self.history.len().saturating_sub(HISTORY_LIMIT);

        let mut out = String::with_capacity(64 + self.history.len() * 16);
        out.push_str(current);
        out.push_str("\n\n");
        for entry in &self.history[skip..] {
            out.push_str(entry);
            out.push('\n');
        }
        out
    }

    pub fn decode(data: &str) -> Self {
        let mut lines = data.lines();
        let current = lines.next().map(str::trim).unwrap_or("");
        let current_node_uuid = if current.is_empty() {
            ROOT_NODE_UUID.to_string()
        } else {
            current.to_string()
        };

        let mut history: Vec<String> = lines
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        let skip = history.len().saturating_sub(HISTORY_LIMIT);
        history.drain(..skip);

        Self {
            current_node_uuid,
            history,
        }
    }

    /// A missing file is a fresh start, not an error.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        match fs::read_to_string(path) {
            Ok(data) => Ok(Self::decode(&data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(StateError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            warn!("{err}; starting at root with an empty history");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        self.save_generation(path, NEXT_GENERATION.fetch_add(1, Ordering::SeqCst))
    }

    /// Writes on a detached thread; failures are logged and otherwise dropped.
    pub fn save_in_background(self, path: PathBuf) -> JoinHandle<()> {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::SeqCst);
        thread::spawn(move || {
            if let Err(err) = self.save_generation(&path, generation) {
                debug!("ignoring state save failure: {err}");
            }
        })
    }

    fn save_generation(&self, path: &Path, generation: u64) -> Result<(), StateError> {
        let mut written = WRITTEN.lock();
        if written.get(path).is_some_and(|&last| last > generation) {
            debug!(generation, "skipping stale state save");
            return Ok(());
        }
        self.write_atomically(path)?;
        written.insert(path.to_path_buf(), generation);
        Ok(())
    }

    /// Writes a sibling temp file and renames it over `path`, so readers see
    /// either the old contents or the new ones.
    fn write_atomically(&self, path: &Path) -> Result<(), StateError> {
        let to_write_error = |source| StateError::Write {
            path: path.to_path_buf(),
            source,
        };
        let temp = path.with_extension("tmp");
        fs::write(&temp, self.encode()).map_err(to_write_error)?;
        fs::rename(&temp, path).map_err(|source| {
            let _ = fs::remove_file(&temp);
            to_write_error(source)
        })
    }
}

pub fn state_path() -> Result<PathBuf, StateError> {
    let base = BaseDirs::new().ok_or(StateError::NoHomeDir)?;
    Ok(base.home_dir().join(STATE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn sample() -> PersistedState {
        PersistedState::new(
            "node-42",
            vec!["ls".to_string(), "cd a".to_string(), "cd ..".to_string()],
        )
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");

        sample().save(&path).unwrap();
        assert_eq!(PersistedState::load(&path).unwrap(), sample());
    }

    #[test]
    fn layout_is_uuid_blank_line_then_history() {
        assert_eq!(sample().encode(), "node-42\n\nls\ncd a\ncd ..\n");
    }

    #[test]
    fn root_is_written_as_an_empty_first_line() {
        let state = PersistedState::new(ROOT_NODE_UUID, vec!["ls".to_string()]);
        assert_eq!(state.encode(), "\n\nls\n");
        assert_eq!(PersistedState::decode(&state.encode()), state);
    }

    #[test]
    fn writes_keep_only_the_newest_entries() {
        let history: Vec<String> = (0..25).map(|i| format!("ls {i}")).collect();
        let state = PersistedState::new("n", history);

        let reloaded = PersistedState::decode(&state.encode());
        assert_eq!(reloaded.history.len(), HISTORY_LIMIT);
        assert_eq!(reloaded.history[0], "ls 5");
        assert_eq!(reloaded.history[HISTORY_LIMIT - 1], "ls 24");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let state = PersistedState::load(&dir.path().join("absent")).unwrap();
        assert_eq!(state, PersistedState::default());
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        assert!(PersistedState::load(dir.path()).is_err());
        assert_eq!(
            PersistedState::load_or_default(dir.path()),
            PersistedState::default()
        );
    }

    #[test]
    fn write_failures_are_swallowed_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("state");
        sample().save_in_background(path.clone()).join().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn overlapping_saves_leave_the_newest_whole_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        let states: Vec<PersistedState> = (0..16)
            .map(|n| {
                let history = (0..(16 - n)).map(|i| format!("cd folder-{i}")).collect();
                PersistedState::new(format!("node-{n}"), history)
            })
            .collect();

        let handles: Vec<_> = states
            .iter()
            .cloned()
            .map(|state| state.save_in_background(path.clone()))
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(PersistedState::load(&path).unwrap(), states[15]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn background_save_eventually_lands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state");
        drop(sample().save_in_background(path.clone()));

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Ok(state) = PersistedState::load(&path) {
                if state == sample() {
                    break;
                }
            }
            assert!(Instant::now() < deadline, "state never reached disk");
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}
