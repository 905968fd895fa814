//! Plain-text summary printed after every state change.

use chrono::{DateTime, Local};
use quadview_proto::protocol::ChannelStatus;
use quadview_proto::split::SplitState;

pub struct SummaryView<'a> {
    pub split: &'a SplitState,
    pub roster: &'a [ChannelStatus],
    pub alert: Option<String>,
    pub error: Option<&'a str>,
    pub updated_at: Option<DateTime<Local>>,
}

impl SummaryView<'_> {
    pub fn render(&self) -> String {
        let mut out = String::new();

        let updated = self
            .updated_at
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        out.push_str(&format!("mode {}  (updated {})\n", self.split.mode(), updated));

        for (idx, slot) in self.split.visible().iter().enumerate() {
            let active = if idx == self.split.active_slot() { '>' } else { ' ' };
            let audio = if idx == self.split.unmuted_slot() { "*" } else { " " };
            let name = slot.as_deref().unwrap_or("-");
            out.push_str(&format!(" {}[{}]{} {}\n", active, idx, audio, name));
        }

        let live: Vec<String> = self
            .roster
            .iter()
            .filter(|c| c.is_live)
            .map(|c| format!("{} ({})", c.label(), c.viewers()))
            .collect();
        if live.is_empty() {
            out.push_str("live: none\n");
        } else {
            out.push_str(&format!("live: {}\n", live.join(", ")));
        }

        if let Some(alert) = &self.alert {
            out.push_str(&format!("! {}  (watch / dismiss)\n", alert));
        }
        if let Some(error) = self.error {
            out.push_str(&format!("error: {}\n", error));
        }
        out
    }
}
