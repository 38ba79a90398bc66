use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

mod app;
mod auth;
mod http;
mod lock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "volley_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit path via VOLLEY_CONFIG env > ~/.volley/volley.toml
    let config_path = std::env::var("VOLLEY_CONFIG").ok();
    let config = volley_core::VolleyConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        volley_core::VolleyConfig::default()
    });
    config.ensure_dirs()?;

    // one gateway per deployment — a second process would double-send
    let state_dir = Path::new(&config.database.path)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Path::new(".").to_path_buf());
    let _instance_lock = lock::acquire(&state_dir)?;

    if config.auth.users.is_empty() {
        tracing::warn!("no [[auth.users]] configured — every /api request will be rejected");
    }

    info!(path = %config.database.path, "opening SQLite database");
    let db = rusqlite::Connection::open(&config.database.path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    let store = volley_storage::ConfigStore::new(db)?;

    let transport = Arc::new(volley_dispatch::DiscordTransport::new(
        config.discord.api_base.clone(),
    ));
    let resolver = volley_dispatch::AttachmentResolver::new(config.uploads.dir.clone());
    let dispatch = volley_dispatch::DispatchController::new(transport, resolver);

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;
    let state = Arc::new(app::AppState::new(config, dispatch, store));
    let router = app::build_router(Arc::clone(&state));

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Volley gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    // make sure any running job observes shutdown before the lock drops
    state.dispatch.stop();
    Ok(())
}
