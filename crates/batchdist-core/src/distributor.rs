//! The batch distributor: cooldown-gated block advancement plus random sampling

use parking_lot::Mutex;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

use crate::dataset::{Dataset, Record};
use crate::error::{DistributorError, Result};
use crate::state::{GroupState, StateMap, StateStore};
use crate::{BLOCK_COUNT, GROUP_COUNT, SAMPLE_DIVISOR};

/// One served batch: a random sample from the group's current block.
#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    /// Consumer group the batch belongs to
    pub group_number: u8,
    /// Index of the block the sample was drawn from
    pub batch_number: i32,
    /// Sampled records
    pub data: Vec<Record>,
}

/// Hands out random sub-samples of a group's current block, advancing the
/// block pointer once per cooldown window, and mirrors progress to disk.
///
/// All group state sits behind one mutex, so the read-check-advance-persist
/// sequence never interleaves between two requests. The dataset itself is
/// immutable and read without locking.
pub struct Distributor {
    dataset: Dataset,
    cooldown_seconds: f64,
    store: StateStore,
    groups: Mutex<StateMap>,
}

impl Distributor {
    /// Create a distributor, restoring any previously persisted progress.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file exists but cannot be read or parsed.
    pub fn new(dataset: Dataset, cooldown_seconds: f64, store: StateStore) -> Result<Self> {
        let groups = store.load_or_init()?;
        Ok(Self {
            dataset,
            cooldown_seconds,
            store,
            groups: Mutex::new(groups),
        })
    }

    /// Serve a batch for `group_number`.
    ///
    /// Advances the group's block pointer if the cooldown has elapsed since
    /// its last advance; either way, draws a fresh random sample of one tenth
    /// of the current block and persists the full state mapping.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGroup` for group numbers outside 1..=10, `Exhausted`
    /// once a group has walked every block, or an I/O error if the state file
    /// cannot be written.
    pub fn get_batch(&self, group_number: i64) -> Result<Batch> {
        self.get_batch_at(group_number, unix_now())
    }

    fn get_batch_at(&self, group_number: i64, now: f64) -> Result<Batch> {
        let group = validate_group(group_number)?;
        let mut groups = self.groups.lock();
        let state = groups.entry(group).or_insert_with(GroupState::fresh);

        if state.batch_index >= BLOCK_COUNT as i32 {
            return Err(DistributorError::Exhausted(group));
        }

        if now - state.last_served_at > self.cooldown_seconds {
            state.last_served_at = now;
            state.batch_index += 1;

            // The advance past the last block is what exhausts a group.
            // Persist it so exhaustion survives a restart.
            if state.batch_index >= BLOCK_COUNT as i32 {
                self.store.save(&groups)?;
                return Err(DistributorError::Exhausted(group));
            }

            debug!(group, batch = state.batch_index, "Cooldown elapsed, advancing block pointer");
        }

        let batch_number = state.batch_index;
        // A never-served group still inside the cooldown window has no block
        // of its own yet; serve the first.
        let data = self.sample_block(batch_number.max(0) as usize);

        self.store.save(&groups)?;

        Ok(Batch {
            group_number: group,
            batch_number,
            data,
        })
    }

    /// Rewind `group_number` to the never-served state and persist.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGroup` for group numbers outside 1..=10, or an I/O
    /// error if the state file cannot be written.
    pub fn reset_group(&self, group_number: i64) -> Result<()> {
        let group = validate_group(group_number)?;
        let mut groups = self.groups.lock();
        groups.insert(group, GroupState::fresh());
        self.store.save(&groups)?;

        info!(group, "Group progress rewound");
        Ok(())
    }

    /// Draw a fresh random sample, without replacement, of one tenth of the
    /// block at `index`. Repeated calls return different subsets.
    fn sample_block(&self, index: usize) -> Vec<Record> {
        let block = self.dataset.block(index);
        let sample_size = block.len() / SAMPLE_DIVISOR;
        let mut rng = rand::thread_rng();
        block.choose_multiple(&mut rng, sample_size).cloned().collect()
    }
}

fn validate_group(group_number: i64) -> Result<u8> {
    if (1..=i64::from(GROUP_COUNT)).contains(&group_number) {
        Ok(group_number as u8)
    } else {
        Err(DistributorError::InvalidGroup(group_number))
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
