use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use meal_credit_server::backend::{create_router, initialize_backend};
use meal_credit_server::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, config.cors_origin.as_deref());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Meal credit server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
