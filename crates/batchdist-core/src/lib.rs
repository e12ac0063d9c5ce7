//! batchdist-core: rate-limited batch distribution over a static dataset
//!
//! The dataset is loaded once, partitioned into contiguous equal-size blocks,
//! and served to up to ten consumer groups. Each group walks the blocks in
//! order, advancing only after a cooldown has elapsed since its last request;
//! every request returns a fresh random sample of the group's current block.
//! Progress is mirrored to a JSON file so it survives restarts.

pub mod dataset;
pub mod distributor;
pub mod error;
pub mod state;

pub use dataset::{Dataset, Record};
pub use distributor::{Batch, Distributor};
pub use error::{DistributorError, Result};
pub use state::{GroupState, StateStore};

/// Number of consumer groups entitled to data.
pub const GROUP_COUNT: u8 = 10;

/// Number of blocks the dataset is partitioned into. Each group is entitled
/// to one pass over the blocks, so a group is exhausted after this many
/// cooldown-elapsed advances.
pub const BLOCK_COUNT: usize = 10;

/// Each served batch samples one record in `SAMPLE_DIVISOR` of its block,
/// without replacement.
pub const SAMPLE_DIVISOR: usize = 10;
