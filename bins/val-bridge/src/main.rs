mod replay;

use clap::Parser;

use val_engine::{BridgeConfig, Engine};

#[derive(Parser)]
#[command(name = "val-bridge", about = "Topic-routed JSON to typed-record bridge")]
struct Cli {
    /// Path to TOML configuration file. Built-in defaults when omitted.
    #[arg(long, env = "VAL_BRIDGE_CONFIG")]
    config: Option<String>,

    /// Key expression to subscribe to (overrides `[transport] subscribe`).
    #[arg(short = 'k', long = "key")]
    key: Option<String>,

    /// Router endpoint (overrides `[transport] endpoint`).
    #[arg(short = 'r', long = "router")]
    router: Option<String>,

    /// Capture file to feed through the engine after startup (JSON lines).
    #[arg(long)]
    replay: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!(config = %path, "loading configuration");
            match BridgeConfig::load(path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!(error = %e, "failed to load config");
                    std::process::exit(1);
                }
            }
        }
        None => {
            tracing::info!("no config file, using defaults");
            BridgeConfig::default()
        }
    };
    if let Some(key) = cli.key {
        config.transport.subscribe = Some(key);
    }
    if let Some(router) = cli.router {
        config.transport.endpoint = router;
    }

    tracing::info!(
        endpoint = %config.transport.endpoint,
        mode = %config.transport.mode,
        prefix = %config.prefix,
        "configuring transport"
    );
    let transport = match val_engine::create_transport(&config.transport, config.worker_buffer) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "failed to open transport");
            std::process::exit(1);
        }
    };

    let engine = match Engine::bootstrap(config, transport.clone()).await {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(error = %e, "failed to bootstrap engine");
            std::process::exit(1);
        }
    };

    tracing::info!(
        key_expr = %engine.config().subscribe_key(),
        bindings = engine.router().len(),
        patterns = ?engine.router().patterns(),
        "engine ready"
    );

    if let Some(path) = &cli.replay {
        if let Err(e) = replay::replay_file(path, transport.as_ref()).await {
            tracing::error!(path = %path, error = %e, "replay failed");
        }
    }

    tracing::info!("val-bridge started, press Ctrl+C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }

    tracing::info!(envelopes = engine.composer().len(), "shutting down...");
    engine.shutdown().await;
    transport.close().await;
}
