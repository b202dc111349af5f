use debez::{
    Config, HttpServer, app_router,
    db::{self, SqliteUserStore},
    server::AppState,
    service::UserManager,
};
use mimalloc::MiMalloc;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_ENV_PATH: &str = "./config/.env";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_path = std::env::var("ENV_PATH").unwrap_or_else(|_| DEFAULT_ENV_PATH.to_string());
    let env_loaded = dotenvy::from_path(&env_path).is_ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.effective_loglevel()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    if !env_loaded {
        warn!(path = %env_path, "env file not loaded; using process environment only");
    }

    info!(
        environment = %cfg.basic.environment,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        database_url = %cfg.database.url,
        connect_base_url = %cfg.connect.base_url,
        loglevel = %cfg.basic.effective_loglevel(),
        "configuration loaded"
    );

    let pool = db::connect(&cfg.database).await?;
    let users = UserManager::new(SqliteUserStore::new(pool.clone()));
    let state = AppState::new(Arc::new(users));
    let app = app_router(state, cfg.basic.request_timeout());

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let server = HttpServer::bind(addr, app).await?;
    info!("HTTP server listening on {}", server.local_addr());

    let handle = server.handle();
    let mut serve_task = tokio::spawn(server.serve());

    tokio::select! {
        () = shutdown_signal() => {
            info!("shutdown signal received");
            if let Err(e) = handle.stop(cfg.basic.shutdown_timeout()).await {
                warn!(error = %e, "http server did not stop cleanly");
            }
        }
        res = &mut serve_task => {
            // Only a panic ends `serve` without a stop request.
            pool.close().await;
            error!("http server task ended unexpectedly");
            res?;
            return Ok(());
        }
    }

    pool.close().await;
    if let Err(e) = serve_task.await {
        error!(error = %e, "http server task failed");
    }
    info!("service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
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
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
