//! JSON file store
//!
//! Keeps the ledger in a single pretty-printed JSON document. Saving writes a
//! sibling temporary file and renames it over the target, so readers only
//! ever see the previous or the new state.

use super::{LedgerSnapshot, LedgerStore};
use crate::core::Ledger;
use crate::types::SplitError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Ledger store backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<Option<Ledger>, SplitError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file, starting empty");
                return Ok(None);
            }
            Err(e) => {
                return Err(SplitError::storage(format!(
                    "failed to read '{}': {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let snapshot: LedgerSnapshot = serde_json::from_str(&contents).map_err(|e| {
            SplitError::storage(format!("failed to parse '{}': {}", self.path.display(), e))
        })?;
        let ledger = snapshot.into_ledger()?;

        info!(
            path = %self.path.display(),
            participants = ledger.list_participants().len(),
            orders = ledger.list_orders().len(),
            "state loaded"
        );
        Ok(Some(ledger))
    }

    fn save(&mut self, ledger: &Ledger) -> Result<(), SplitError> {
        let snapshot = LedgerSnapshot::capture(ledger);
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| SplitError::storage(format!("failed to serialise state: {}", e)))?;

        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|e| {
            SplitError::storage(format!("failed to write '{}': {}", temp.display(), e))
        })?;
        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(SplitError::storage(format!(
                "failed to replace '{}': {}",
                self.path.display(),
                e
            )));
        }

        debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}
