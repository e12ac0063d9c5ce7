use batchdist_server::{BatchdistServer, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("batchdist_core=info,batchdist_server=info,tower_http=info")
        }))
        .init();

    let config = Config::from_env();
    if let Err(err) = BatchdistServer::with_config(config).start().await {
        tracing::error!("Server failed: {}", err);
        std::process::exit(1);
    }
}
