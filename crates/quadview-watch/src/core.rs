/// WatchCore: single-owner event loop for the viewing session.
///
/// The poll ticker, the fetch tasks and the stdin reader all send
/// `WatchEvent`s here; only this loop touches the `Session`.  At most one
/// fetch is in flight, so snapshots reach the diff engine in order.
use std::sync::Arc;
use std::time::Duration;

use quadview_proto::config::PollingConfig;
use quadview_proto::protocol::ChannelStatus;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::fetch::StatusFetcher;
use crate::session::{Outcome, Session};

/// All inputs into the WatchCore loop.
#[derive(Debug)]
pub enum WatchEvent {
    /// Poll interval elapsed.
    PollTick,
    /// A fetch task completed.
    PollFinished(anyhow::Result<Vec<ChannelStatus>>),
    /// A parsed stdin command.
    Input(Action),
}

pub struct WatchCore {
    session: Session,
    fetcher: Arc<StatusFetcher>,
    event_tx: mpsc::Sender<WatchEvent>,
    interval: Duration,
    poll_in_flight: bool,
}

impl WatchCore {
    pub fn new(config: &PollingConfig, event_tx: mpsc::Sender<WatchEvent>) -> anyhow::Result<Self> {
        Ok(Self {
            session: Session::new(config.auto_follow),
            fetcher: Arc::new(StatusFetcher::new(&config.server_url)?),
            event_tx,
            interval: config.interval(),
            poll_in_flight: false,
        })
    }

    /// Run until `quit`.
    pub async fn run(mut self, mut event_rx: mpsc::Receiver<WatchEvent>) -> anyhow::Result<()> {
        info!("WatchCore: polling every {}s", self.interval.as_secs());

        // The first tick fires immediately.
        let tick_tx = self.event_tx.clone();
        let interval = self.interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tick_tx.send(WatchEvent::PollTick).await.is_err() {
                    break;
                }
            }
        });

        while let Some(event) = event_rx.recv().await {
            if !self.handle_event(event) {
                break;
            }
        }

        info!("WatchCore: event loop finished");
        Ok(())
    }

    /// Returns `false` once the session asked to quit.
    fn handle_event(&mut self, event: WatchEvent) -> bool {
        match event {
            WatchEvent::PollTick => self.start_poll(),
            WatchEvent::PollFinished(result) => {
                self.poll_in_flight = false;
                match result {
                    Ok(snapshot) => self.session.on_snapshot(snapshot),
                    Err(e) => self.session.on_poll_error(format!("{:#}", e)),
                }
                self.redraw();
            }
            WatchEvent::Input(action) => match self.session.handle(action) {
                Ok(Outcome::Redraw) => self.redraw(),
                Ok(Outcome::Idle) => {}
                Ok(Outcome::Quit) => return false,
                Err(e) => {
                    warn!("Command rejected: {}", e);
                    eprintln!("error: {}", e);
                }
            },
        }
        true
    }

    fn start_poll(&mut self) {
        if self.poll_in_flight {
            debug!("Previous poll still in flight, skipping tick");
            return;
        }
        self.poll_in_flight = true;

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch().await;
            let _ = tx.send(WatchEvent::PollFinished(result)).await;
        });
    }

    fn redraw(&self) {
        println!("{}", self.session.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{extract::State, response::Json, routing::get, Router};
    use quadview_proto::protocol::StreamersResponse;
    use tokio::net::TcpListener;

    async fn counting_server(hits: Arc<AtomicUsize>) -> String {
        let app = Router::new()
            .route(
                "/api/streamers",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(StreamersResponse {
                        streamers: vec![ChannelStatus::live("a", 10, "t", "g")],
                    })
                }),
            )
            .with_state(hits);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn core_for(server_url: String) -> (WatchCore, mpsc::Receiver<WatchEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let config = PollingConfig {
            server_url,
            ..PollingConfig::default()
        };
        (WatchCore::new(&config, tx).unwrap(), rx)
    }

    #[tokio::test]
    async fn test_tick_during_pending_fetch_is_skipped() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (mut core, mut rx) = core_for(counting_server(Arc::clone(&hits)).await);

        assert!(core.handle_event(WatchEvent::PollTick));
        assert!(core.handle_event(WatchEvent::PollTick));
        assert!(core.poll_in_flight);

        let finished = rx.recv().await.unwrap();
        assert!(matches!(finished, WatchEvent::PollFinished(Ok(_))));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        core.handle_event(finished);
        assert!(!core.poll_in_flight);
        assert_eq!(core.session.roster().len(), 1);

        core.handle_event(WatchEvent::PollTick);
        let finished = rx.recv().await.unwrap();
        assert!(matches!(finished, WatchEvent::PollFinished(Ok(_))));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_roster_and_slots() {
        let (mut core, _rx) = core_for("http://127.0.0.1:9".to_string());

        core.handle_event(WatchEvent::PollFinished(Ok(vec![
            ChannelStatus::live("a", 10, "t", "g"),
            ChannelStatus::offline("b"),
        ])));
        let roster = core.session.roster().to_vec();
        let slots = core.session.split().state().clone();
        assert_eq!(slots.slot(0), Some("a"));

        core.handle_event(WatchEvent::PollFinished(Err(anyhow::anyhow!("HTTP 500"))));
        assert_eq!(core.session.roster(), roster.as_slice());
        assert_eq!(core.session.split().state(), &slots);
        assert_eq!(core.session.last_error(), Some("HTTP 500"));
        assert!(!core.poll_in_flight);
    }

    #[tokio::test]
    async fn test_quit_stops_the_loop() {
        let (mut core, _rx) = core_for("http://127.0.0.1:9".to_string());
        assert!(core.handle_event(WatchEvent::Input(Action::Status)));
        assert!(!core.handle_event(WatchEvent::Input(Action::Quit)));
    }
}
