//! JSON file checkpoint store.
//!
//! A flat JSON array of completed symbol identifiers. A missing or malformed
//! file reads as an empty set; saving rewrites the whole array, sorted for
//! stable diffs.

use crate::domain::error::MasweepError;
use crate::ports::checkpoint_port::CheckpointPort;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

pub struct JsonCheckpointAdapter {
    path: PathBuf,
}

impl JsonCheckpointAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CheckpointPort for JsonCheckpointAdapter {
    fn load(&self) -> HashSet<String> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return HashSet::new();
        };
        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(symbols) => symbols.into_iter().collect(),
            Err(e) => {
                eprintln!(
                    "Warning: ignoring malformed checkpoint {} ({e})",
                    self.path.display()
                );
                HashSet::new()
            }
        }
    }

    fn save(&self, completed: &HashSet<String>) -> Result<(), MasweepError> {
        let mut symbols: Vec<&String> = completed.iter().collect();
        symbols.sort();
        let content =
            serde_json::to_string_pretty(&symbols).map_err(|e| MasweepError::Checkpoint {
                reason: e.to_string(),
            })?;
        fs::write(&self.path, content).map_err(|e| MasweepError::Checkpoint {
            reason: format!("{}: {e}", self.path.display()),
        })
    }
}
