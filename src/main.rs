use clap::Parser;
use tracing_subscriber::EnvFilter;

use gallery_delivery::{app, config, is_development, AppState};

#[derive(Parser)]
#[command(name = "gallery-delivery")]
#[command(about = "Public gallery API with streamed ZIP downloads")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (defaults to GALLERY_API_PORT / PORT / 3000)")]
    port: Option<u16>,

    #[arg(long, default_value = "0.0.0.0", help = "Address to bind")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, STUDIO_API_URL, etc.
    let _ = dotenvy::dotenv();

    let default_filter = if is_development!() {
        "info,gallery_delivery=debug,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let args = Args::parse();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Gallery Delivery API in {:?} mode", config.environment);

    let state = AppState::from_config(config)?;
    let app = app(state, &config.security);

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("{}:{}", args.bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Gallery Delivery API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
