//! Checkpoint persistence port trait.

use crate::domain::error::MasweepError;
use std::collections::HashSet;

/// Durable store of symbols whose sweeps have completed in some prior run.
pub trait CheckpointPort {
    /// Load the completed set. A missing or unreadable store means no
    /// symbols completed yet, never an error.
    fn load(&self) -> HashSet<String>;

    /// Persist the updated set, replacing any previous contents.
    fn save(&self, completed: &HashSet<String>) -> Result<(), MasweepError>;
}
