mod action;
mod alert;
mod core;
mod fetch;
mod session;
mod summary;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::core::{WatchCore, WatchEvent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = quadview_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("watch.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // stdout carries the summaries, so logs go to the file only.  Allow
    // RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("quadview log: {}", log_path.display());
    tracing::info!("quadview starting…");

    let config = quadview_proto::config::Config::load().unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {}", e);
        Default::default()
    });

    let (event_tx, event_rx) = mpsc::channel::<WatchEvent>(256);
    let watch_core = WatchCore::new(&config.polling, event_tx.clone())?;

    // ── stdin commands ───────────────────────────────────────────────────────
    let input_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Action>() {
                Ok(action) => {
                    if input_tx.send(WatchEvent::Input(action)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!("Unparsed input {:?}: {}", line, e);
                    eprintln!("error: {}", e);
                }
            }
        }
        tracing::debug!("stdin closed; polling continues");
    });
    drop(event_tx);

    tokio::select! {
        result = watch_core.run(event_rx) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
    }

    Ok(())
}
