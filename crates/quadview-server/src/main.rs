mod http;
mod twitch;

use std::sync::Arc;

use quadview_proto::config::Config;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = quadview_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("server.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // File writer for post-mortems, stderr for the operator.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,quadview_server=debug")),
        )
        .init();

    info!("Log file: {:?}", log_path);

    let config = Config::load()?;
    info!("Config loaded from: {:?}", Config::config_path());

    let twitch = twitch::TwitchClient::new(&config.upstream);
    if !twitch.has_credentials() {
        warn!("TWITCH_CLIENT_ID / TWITCH_CLIENT_SECRET not set; upstream requests will fail");
    }

    let state = http::HttpState {
        twitch: Arc::new(twitch),
        channels: Arc::new(config.upstream.channels.clone()),
    };

    let handle = http::start_server(config.server.bind_address.clone(), config.server.port, state);

    tokio::select! {
        _ = handle => warn!("HTTP server task exited"),
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}
