use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use todo_server::auth::IdentityService;
use todo_server::config::{Args, Config};
use todo_server::store::TodoStore;
use todo_server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_args(args).context("invalid configuration")?;

    let store = TodoStore::connect(&config.database_url, config.max_connections)
        .await
        .context("failed to open database")?;
    store
        .ensure_schema()
        .await
        .context("failed to create todos table")?;

    let identity = IdentityService::new(config.identity.clone(), config.state_signer()?);
    let state = AppState::new(store, identity).require_auth(config.require_auth);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, require_auth = config.require_auth, "listening");
    axum::serve(listener, todo_server::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
