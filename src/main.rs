use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};

use cssd_api as api;
use cssd_api::{resources::Resource, store::FileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config().context("failed to load configuration")?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    if cfg.uses_memory_store() {
        warn!("Using the in-memory store; data is lost on shutdown");
    } else {
        report_missing_collections(&FileStore::new(cfg.data_dir.clone())).await;
    }

    if cfg.cors_origins().is_empty() {
        info!("Using permissive CORS because explicit origins were not configured");
    }

    let host: std::net::IpAddr = cfg
        .host
        .parse()
        .with_context(|| format!("invalid host address '{}'", cfg.host))?;
    let addr = SocketAddr::new(host, cfg.port);

    let app = api::build_router(api::AppState::from_config(cfg));

    info!("cssd-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("cssd-api stopped");
    Ok(())
}

/// Collections without a file answer 500 until `cssd-cli init` creates them.
async fn report_missing_collections(store: &FileStore) {
    for resource in Resource::all() {
        let path = store.path_for(resource);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            warn!(
                resource = %resource,
                path = %path.display(),
                "collection file missing; run `cssd-cli init` to create it"
            );
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
