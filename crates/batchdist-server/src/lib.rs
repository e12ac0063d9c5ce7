//! batchdist-server: REST API for the batch distributor
//!
//! Serves cooldown-gated random batches of a static CSV dataset to ten
//! consumer groups over axum, mirroring group progress to a JSON state file.

pub mod error;
pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use batchdist_core::{dataset, Dataset, Distributor, StateStore};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{Error, Result};
pub use state::AppState;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Enable compression
    pub enable_compression: bool,
    /// Minimum seconds between block advances for any one group
    pub cooldown_seconds: f64,
    /// Local CSV file the dataset is loaded from
    pub dataset_path: PathBuf,
    /// Remote source fetched once when `dataset_path` is absent
    pub dataset_url: String,
    /// JSON mirror of group progress
    pub state_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            enable_cors: true,
            enable_compression: true,
            cooldown_seconds: 30.0,
            dataset_path: PathBuf::from("./data/covertype/covertype_train.csv"),
            dataset_url:
                "https://docs.google.com/uc?export=download&confirm={{VALUE}}&id=1lVF1BCWLH4eXXV_YOJzjR7xZjj-wAGj9"
                    .to_string(),
            state_path: PathBuf::from("./data/timestamps.json"),
        }
    }
}

impl Config {
    /// Overlay `BATCHDIST_*` environment variables on the defaults.
    /// Unset or unparsable variables leave the default in place.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("BATCHDIST_HOST") {
            config.host = v;
        }
        if let Ok(v) = std::env::var("BATCHDIST_PORT") {
            if let Ok(port) = v.parse() {
                config.port = port;
            }
        }
        if let Ok(v) = std::env::var("BATCHDIST_COOLDOWN_SECONDS") {
            if let Ok(secs) = v.parse() {
                config.cooldown_seconds = secs;
            }
        }
        if let Ok(v) = std::env::var("BATCHDIST_DATASET_PATH") {
            config.dataset_path = v.into();
        }
        if let Ok(v) = std::env::var("BATCHDIST_DATASET_URL") {
            config.dataset_url = v;
        }
        if let Ok(v) = std::env::var("BATCHDIST_STATE_PATH") {
            config.state_path = v.into();
        }
        config
    }
}

/// Main server structure
pub struct BatchdistServer {
    config: Config,
}

impl BatchdistServer {
    /// Create a new server instance with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Create a new server instance with custom configuration
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Start the server
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset cannot be acquired or parsed, the
    /// state file cannot be read, or the listener fails to bind.
    pub async fn start(self) -> Result<()> {
        dataset::ensure_local(&self.config.dataset_path, &self.config.dataset_url).await?;
        let dataset = Dataset::from_csv_path(&self.config.dataset_path)?;

        let store = StateStore::new(self.config.state_path.clone());
        let distributor = Distributor::new(dataset, self.config.cooldown_seconds, store)?;
        let state = AppState::new(Arc::new(distributor));

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = build_router(state, &self.config);

        tracing::info!("Starting batchdist-server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

        Ok(())
    }
}

impl Default for BatchdistServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the router with all routes
pub fn build_router(state: AppState, config: &Config) -> Router {
    let mut router = Router::new()
        .route("/", get(routes::health::service_info))
        .route("/health", get(routes::health::health_check))
        .merge(routes::data::routes())
        .with_state(state);

    // Add middleware layers
    router = router.layer(TraceLayer::new_for_http());

    if config.enable_compression {
        router = router.layer(CompressionLayer::new());
    }

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state(dir: &tempfile::TempDir, cooldown_seconds: f64) -> AppState {
        // Block size 100, sample size 10.
        let records = (0..1000).map(|i| vec![i.to_string()]).collect();
        let dataset = Dataset::from_records(records);
        let store = StateStore::new(dir.path().join("timestamps.json"));
        let distributor = Distributor::new(dataset, cooldown_seconds, store).unwrap();
        AppState::new(Arc::new(distributor))
    }

    fn test_router(dir: &tempfile::TempDir, cooldown_seconds: f64) -> Router {
        build_router(test_state(dir, cooldown_seconds), &Config::default())
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(test_router(&dir, 30.0), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
    }

    #[tokio::test]
    async fn data_serves_first_batch() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(test_router(&dir, 30.0), "/data?group_number=3").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["group_number"], 3);
        assert_eq!(body["batch_number"], 0);
        assert_eq!(body["data"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn invalid_group_is_a_client_error() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(&dir, 30.0);

        for uri in ["/data?group_number=0", "/data?group_number=12",
                    "/restart_data_generation?group_number=0"] {
            let (status, body) = get_json(router.clone(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].as_str().unwrap().contains("Invalid group number"));
        }
    }

    #[tokio::test]
    async fn restart_acknowledges_and_rewinds() {
        let dir = tempfile::tempdir().unwrap();
        let router = test_router(&dir, 30.0);

        let (status, _) = get_json(router.clone(), "/data?group_number=5").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) =
            get_json(router.clone(), "/restart_data_generation?group_number=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);

        let (status, body) = get_json(router, "/data?group_number=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["batch_number"], 0);
    }

    #[tokio::test]
    async fn exhaustion_is_a_client_error() {
        let dir = tempfile::tempdir().unwrap();
        // A negative cooldown makes every request advance the block pointer.
        let router = test_router(&dir, -1.0);

        for expected in 0..10 {
            let (status, body) = get_json(router.clone(), "/data?group_number=2").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["batch_number"], expected);
        }

        let (status, body) = get_json(router, "/data?group_number=2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("already collected"));
    }
}
