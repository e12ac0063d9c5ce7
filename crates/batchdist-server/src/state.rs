//! Shared application state

use batchdist_core::Distributor;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The one distributor, owned here and injected into every handler.
    pub distributor: Arc<Distributor>,
}

impl AppState {
    /// Create a new application state
    pub fn new(distributor: Arc<Distributor>) -> Self {
        Self { distributor }
    }
}
