use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use wellness_hub::router::{HubState, hub_router};
use wellness_hub::service::{StoreSource, catalog_actor};
use wellness_hub::supabase::StoreClient;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &wellness_hub::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        supabase_url = %cfg.supabase_url,
        anon_key_set = !cfg.supabase_anon_key.is_empty(),
        fixtures = %cfg
            .fixtures_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string()),
        proxy = %cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        loglevel = %cfg.loglevel,
    );
    if cfg.supabase_anon_key.is_empty() {
        warn!("HUB_SUPABASE_ANON_KEY is empty; remote reads will likely be rejected");
    }

    let store = StoreClient::new(cfg)?;
    let source = Arc::new(StoreSource::new(store.clone(), cfg));
    let catalog = catalog_actor::spawn(source).await?;

    // Warm every collection; failures are logged and retried on demand.
    for (kind, result) in catalog.reload_all().await {
        match result {
            Ok(status) => match status.error() {
                None => info!(%kind, status = status.label(), "initial load"),
                Some(error) => warn!(%kind, %error, "initial load failed"),
            },
            Err(e) => warn!(%kind, error = %e, "initial load failed"),
        }
    }

    let state = HubState::new(catalog, store, cfg);
    let app = hub_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received terminate signal, shutting down"),
    }
}
