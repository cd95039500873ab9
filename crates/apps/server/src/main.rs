use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod dev;
mod routes;

use config::ServerConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run(ServerConfig::from_env()).await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run(config: Result<ServerConfig, String>) -> Result<(), String> {
    let config = config?;

    if !config.static_root.is_dir() {
        return Err(format!(
            "static root {} is not a directory",
            config.static_root.display()
        ));
    }

    if let Some(dev) = config.dev.clone() {
        info!(
            "development mode: watching {} every {:?}",
            dev.watch_root.display(),
            dev.interval
        );
        tokio::spawn(dev::watch_and_rebuild(dev));
    }

    let app = routes::router(&config);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", config.addr))?;

    info!(
        "scratchpad listening on http://{} serving {}",
        config.addr,
        config.static_root.display()
    );
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("server stopped: {e}"))
}
