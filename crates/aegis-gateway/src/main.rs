//! aegis-gateway: Aegis Gateway Main Binary
//!
//! WebSocket proxy between the browser frontend and the upstream live
//! AI streaming service, with fail-safe fallback guidance.
//!
//! Usage:
//!   aegis-gateway           - Start the server
//!   aegis-gateway --help    - Show help

use std::sync::Arc;

use aegis_core::Config;
use aegis_live::GeminiLiveClient;
use aegis_ws::WsServerBuilder;
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    /// Server mode
    Server,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("aegis-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting aegis-gateway...");
    tracing::info!("Model: {}", config.live.model);
    if config.live.api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; sessions will serve fallback guidance only");
    }

    let live_client = Arc::new(GeminiLiveClient::new(&config.live));

    WsServerBuilder::new(config)
        .start(live_client)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let args: Vec<String> = std::env::args().collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("aegis-gateway - Live emergency guidance gateway");
    println!();
    println!("Usage:");
    println!("  aegis-gateway           Start the server");
    println!("  aegis-gateway --help    Show this help message");
    println!("  aegis-gateway --version Show version");
    println!();
    println!("Environment Variables:");
    println!("  GEMINI_API_KEY       Live API key (required for live sessions)");
    println!("  MODEL                Live model name");
    println!("  VOICE_NAME           Voice preset (default: Aoede)");
    println!("  LIVE_ENDPOINT        WebSocket endpoint override");
    println!("  PORT                 Server port (default: 8080)");
    println!("  ALLOWED_ORIGINS      Comma-separated CORS origins");
}
