use anyhow::{Context, Result};

use clima_core::Config;
use clima_server::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    clima_core::init()?;

    let config = Config::from_env().context("reading configuration")?;
    let validation = config.validate();
    if !validation.is_valid() {
        anyhow::bail!(
            "Configuration validation failed: {}",
            validation.error_summary()
        );
    }
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    let state = AppState::from_config(&config)?;
    tracing::info!("Loaded {} of 4 model artifacts", state.models.len());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(
        "clima-server v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        addr
    );

    axum::serve(listener, router(state))
        .await
        .context("serving HTTP")?;

    Ok(())
}
