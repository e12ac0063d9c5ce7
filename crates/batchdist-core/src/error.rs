use thiserror::Error;

/// Result type for distributor operations
pub type Result<T> = std::result::Result<T, DistributorError>;

/// Errors that can occur while serving batches
#[derive(Error, Debug)]
pub enum DistributorError {
    /// Group number outside the valid 1..=10 range
    #[error("Invalid group number: {0} (expected 1 to 10)")]
    InvalidGroup(i64),

    /// Group has already walked every block
    #[error("Group {0} has already collected all available data")]
    Exhausted(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dataset parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset download failed: {0}")]
    Download(#[from] reqwest::Error),
}

impl DistributorError {
    /// Whether the error is the caller's fault (as opposed to a fault of the
    /// process or its environment).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DistributorError::InvalidGroup(_) | DistributorError::Exhausted(_)
        )
    }
}
