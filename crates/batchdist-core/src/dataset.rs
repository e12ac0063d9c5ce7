//! Dataset loading, acquisition, and block partitioning

use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::BLOCK_COUNT;

/// One dataset row, column values kept as raw CSV strings.
pub type Record = Vec<String>;

/// An immutable, ordered dataset partitioned into `BLOCK_COUNT` contiguous
/// equal-size blocks. Records past the last full block are dropped.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    block_size: usize,
}

impl Dataset {
    /// Build a dataset from already-loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let block_size = records.len() / BLOCK_COUNT;
        Self {
            records,
            block_size,
        }
    }

    /// Load a dataset from a CSV file. The header row is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(row.iter().map(str::to_string).collect());
        }

        info!(
            path = %path.as_ref().display(),
            records = records.len(),
            "Dataset loaded"
        );

        Ok(Self::from_records(records))
    }

    /// The block at `index` (0-based, must be below `BLOCK_COUNT`).
    pub fn block(&self, index: usize) -> &[Record] {
        debug_assert!(index < BLOCK_COUNT);
        let start = index * self.block_size;
        &self.records[start..start + self.block_size]
    }

    /// Records per block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Total records loaded, including any dropped remainder.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fetch the dataset from `url` into `path` unless it is already present.
///
/// A failed download is fatal to startup; there is no retry.
pub async fn ensure_local(path: &Path, url: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    info!(%url, "Dataset missing locally, downloading");

    let response = reqwest::get(url).await?.error_for_status()?;
    let body = response.bytes().await?;
    tokio::fs::write(path, &body).await?;

    info!(
        path = %path.display(),
        bytes = body.len(),
        "Dataset downloaded"
    );

    Ok(())
}
