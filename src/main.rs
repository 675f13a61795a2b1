//! Ministry API Server
//!
//! Run with: cargo run --bin ministry
//!
//! # Configuration
//!
//! Read from the first `config.toml` found (user config dir,
//! `/etc/ministry`, working directory), then overridden by environment:
//! - `MINISTRY_API_HOST`, `MINISTRY_API_PORT`: Bind address (default: 0.0.0.0:3000)
//! - `MINISTRY_ENFORCE_ROLES`: Check ranks on mutations (default: true)
//! - `MINISTRY_TOKEN_SECRET`: Sign session tokens
//! - `MINISTRY_LOG_LEVEL`, `MINISTRY_LOG_FORMAT`: Logging (default: info, pretty)
//! - `RUST_LOG`: Full filter, takes precedence over the log level

use ministry::api::{serve, AppState};
use ministry::config::{Config, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting Ministry API server v{}", env!("CARGO_PKG_VERSION"));

    if !config.auth.enforce_roles {
        tracing::warn!("Role enforcement is disabled; any caller may mutate records");
    }
    if config.auth.token_secret.is_none() {
        tracing::info!("Session tokens are unsigned (set MINISTRY_TOKEN_SECRET to sign them)");
    }

    let state = AppState::seeded(config);
    {
        let registry = state.store.read().await;
        tracing::info!(
            accounts = registry.accounts.all().len(),
            services = registry.prices.all_services().len(),
            "Seed data loaded"
        );
    }

    serve(state).await?;

    tracing::info!("Ministry API server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("ministry={level},tower_http={level}", level = logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
