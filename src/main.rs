use itemsvc::{
    Config, ServiceError,
    db::{self, ConnectPolicy, ConnectionDescriptor, PoolSettings},
    server::{AppState, app_router},
    utils::logging::init_tracing,
};
use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env().map_err(ServiceError::from)?;
    init_tracing(&cfg.loglevel);

    info!(
        app_name = %cfg.app_name,
        redis_service_url = %cfg.redis_service_url,
        mongo_service_url = %cfg.mongo_service_url,
        postgres_host = %cfg.postgres_host,
        postgres_port = cfg.postgres_port,
        postgres_user = %cfg.postgres_user,
        postgres_db = %cfg.postgres_db,
        postgres_max_connections = cfg.postgres_max_connections,
        postgres_acquire_timeout_secs = cfg.postgres_acquire_timeout_secs,
        listen_addr = %cfg.listen_addr,
        port = cfg.port,
        loglevel = %cfg.loglevel,
        peer_timeout_secs = cfg.peer_timeout_secs
    );

    if let Err(e) = run(&cfg).await {
        error!(error = %e, "Fatal startup error");
        return Err(e.into());
    }
    Ok(())
}

async fn run(cfg: &Config) -> Result<(), ServiceError> {
    let descriptor = ConnectionDescriptor::from_config(cfg);
    let pool = db::connect(
        &descriptor,
        ConnectPolicy::default(),
        PoolSettings::from_config(cfg),
    )
    .await?;
    db::ensure_schema(&pool).await?;

    let state = AppState::from_config(cfg, Arc::new(pool.clone()))?;
    let app = app_router(state);

    let addr = cfg.listen_socket();
    let listener = TcpListener::bind(addr).await?;
    info!("{} listening on {}", cfg.app_name, addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Server has shut down gracefully.");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix. A handler that fails to install
/// is logged and never fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let which = tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    };
    info!(signal = which, "Shutdown requested, draining connections");
}
