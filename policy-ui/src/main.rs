use anyhow::{Context, Result};
use policy_ui::{create_app, AppState, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "policy_ui=debug,policy_client=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse_config();
    init_tracing(config.log_json);

    info!("Starting policy UI");
    info!("  Policy API: {}", config.api_base_url);
    info!("  Request timeout: {}s", config.request_timeout_secs);

    let state = AppState::new(&config)?;
    let app = create_app(state);

    let listen_addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", listen_addr))?;

    info!("Server starting on http://{}", listen_addr);

    axum::serve(listener, app)
        .await
        .context("Server failed to start")?;

    Ok(())
}
