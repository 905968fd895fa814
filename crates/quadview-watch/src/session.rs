//! Session: one roster engine and one split controller, plus the wiring
//! between them.  Everything here is synchronous; `WatchCore` feeds it events
//! one at a time.

use chrono::{DateTime, Local};
use quadview_proto::error::SplitError;
use quadview_proto::protocol::ChannelStatus;
use quadview_proto::roster::{StatusDiff, StatusDiffEngine};
use quadview_proto::split::SplitController;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::alert::LiveAlert;
use crate::summary::SummaryView;

/// What the caller should do after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Redraw,
    Idle,
    Quit,
}

pub struct Session {
    engine: StatusDiffEngine,
    split: SplitController,
    alert: LiveAlert,
    auto_follow: bool,
    /// Set once the first non-empty roster arrived.
    loaded: bool,
    last_error: Option<String>,
    updated_at: Option<DateTime<Local>>,
}

/// Synthetic go-live used to exercise the alert path without a real stream.
/// No display name, so alerts show the id.
pub fn synthetic_entry(channel_id: &str) -> ChannelStatus {
    ChannelStatus::live(channel_id, 1337, "Test stream", "Just Chatting")
}

impl Session {
    pub fn new(auto_follow: bool) -> Self {
        Self {
            engine: StatusDiffEngine::new(),
            split: SplitController::new(),
            alert: LiveAlert::default(),
            auto_follow,
            loaded: false,
            last_error: None,
            updated_at: None,
        }
    }

    pub fn split(&self) -> &SplitController {
        &self.split
    }

    pub fn roster(&self) -> &[ChannelStatus] {
        self.engine.roster()
    }

    pub fn alert(&self) -> &LiveAlert {
        &self.alert
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// A poll succeeded.
    pub fn on_snapshot(&mut self, snapshot: Vec<ChannelStatus>) {
        let update = self.engine.update(snapshot);
        self.last_error = None;
        self.updated_at = Some(Local::now());
        self.alert.retain_live(&update.roster);

        if !self.loaded && !update.roster.is_empty() {
            self.loaded = true;
            if self.auto_follow {
                if let Some(top) = update.roster.iter().find(|c| c.is_live) {
                    info!("Featuring {} on first load", top.channel_id);
                    self.follow(&top.channel_id);
                }
            }
        }

        if let Some(diff) = update.diff {
            self.on_diff(diff);
        }
    }

    /// A poll failed.  Roster and slots stay as they were.
    pub fn on_poll_error(&mut self, message: String) {
        warn!("Poll failed: {}", message);
        self.last_error = Some(message);
    }

    fn on_diff(&mut self, diff: StatusDiff) {
        for id in &diff.went_offline {
            info!("{} went offline", id);
            self.alert.remove(id);
        }
        for status in &diff.title_changed {
            info!(
                "{} is now: {} [{}]",
                status.channel_id,
                status.title.as_deref().unwrap_or_default(),
                status.category.as_deref().unwrap_or_default()
            );
        }
        if diff.newly_live.is_empty() {
            return;
        }

        if self.auto_follow && self.split.state().slot(0).is_none() {
            let first = diff.newly_live[0].channel_id.clone();
            self.follow(&first);
        }
        self.alert.push(&diff.newly_live);
        if let Some(message) = self.alert.message() {
            info!("{}", message);
        }
    }

    fn follow(&mut self, channel_id: &str) {
        if let Err(e) = self.split.assign_channel(channel_id) {
            warn!("Auto-follow of {:?} rejected: {}", channel_id, e);
        }
    }

    pub fn handle(&mut self, action: Action) -> Result<Outcome, SplitError> {
        debug!("action: {:?}", action);
        match action {
            Action::Watch(Some(channel_id)) => {
                self.split.assign_channel(&channel_id)?;
            }
            Action::Watch(None) => {
                let Some(first) = self.alert.first().map(|c| c.channel_id.clone()) else {
                    return Ok(Outcome::Idle);
                };
                self.split.assign_channel(&first)?;
                self.alert.dismiss();
            }
            Action::Mode(mode) => {
                self.split.set_mode(mode);
            }
            Action::Focus(index) => {
                self.split.set_active_slot(index)?;
            }
            Action::Unmute(index) => {
                self.split.set_unmuted_slot(index)?;
            }
            Action::Inject(channel_id) => {
                let update = self.engine.inject_synthetic(synthetic_entry(&channel_id));
                if let Some(diff) = update.diff {
                    self.on_diff(diff);
                }
            }
            Action::Remove(channel_id) => {
                self.engine.remove_synthetic(&channel_id);
                self.alert.remove(&channel_id);
            }
            Action::Dismiss => {
                if !self.alert.dismiss() {
                    return Ok(Outcome::Idle);
                }
            }
            Action::Status => {}
            Action::Quit => return Ok(Outcome::Quit),
        }
        Ok(Outcome::Redraw)
    }

    pub fn summary(&self) -> String {
        SummaryView {
            split: self.split().state(),
            roster: self.roster(),
            alert: self.alert().message(),
            error: self.last_error(),
            updated_at: self.updated_at,
        }
        .render()
    }
}
