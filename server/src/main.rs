//! User API server: reads settings from the environment (and `.env`), opens the store,
//! and serves the user routes until Ctrl-C.
//!
//! Run from repo root: `cargo run -p user-api-server`
//! Without PostgreSQL: `USER_API_STORE=memory cargo run -p user-api-server`

use tokio::net::TcpListener;
use user_api::{app, open_repository, AppState, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("user_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let users = open_repository(&settings.store).await?;
    let router = app(AppState::new(users), settings.max_body_bytes);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
