//! Group progress bookkeeping and its on-disk JSON mirror

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::Result;
use crate::GROUP_COUNT;

/// Progress of one consumer group.
///
/// Persisted as the pair `[last_served_at, batch_index]` to stay compatible
/// with the historical state-file layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, i32)", into = "(f64, i32)")]
pub struct GroupState {
    /// Seconds since the Unix epoch of the last cooldown-elapsed serve.
    pub last_served_at: f64,
    /// Index of the block currently served; -1 means never served.
    pub batch_index: i32,
}

impl GroupState {
    /// The never-served state.
    pub fn fresh() -> Self {
        Self {
            last_served_at: 0.0,
            batch_index: -1,
        }
    }
}

impl From<(f64, i32)> for GroupState {
    fn from((last_served_at, batch_index): (f64, i32)) -> Self {
        Self {
            last_served_at,
            batch_index,
        }
    }
}

impl From<GroupState> for (f64, i32) {
    fn from(state: GroupState) -> Self {
        (state.last_served_at, state.batch_index)
    }
}

/// Mapping from group number to its progress.
pub type StateMap = BTreeMap<u8, GroupState>;

/// Build the never-served state for all groups.
pub fn fresh_state() -> StateMap {
    (1..=GROUP_COUNT).map(|g| (g, GroupState::fresh())).collect()
}

/// On-disk mirror of the state map: one JSON object with the keys `"1"`
/// through `"10"`, rewritten in full after every state-changing request.
/// Last writer wins; there is no versioning.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted state, or initialize fresh if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_init(&self) -> Result<StateMap> {
        if !self.path.exists() {
            return Ok(fresh_state());
        }

        let json = std::fs::read_to_string(&self.path)?;
        let mut map: StateMap = serde_json::from_str(&json)?;

        // Groups missing from an older file start out fresh.
        for group in 1..=GROUP_COUNT {
            map.entry(group).or_insert_with(GroupState::fresh);
        }

        Ok(map)
    }

    /// Rewrite the full mapping.
    pub fn save(&self, state: &StateMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(state)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
