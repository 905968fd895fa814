//! Pending go-live alert.  Newly-live channels accumulate until dismissed or
//! until they stop being live.

use quadview_proto::protocol::ChannelStatus;

#[derive(Debug, Default)]
pub struct LiveAlert {
    pending: Vec<ChannelStatus>,
}

impl LiveAlert {
    pub fn push(&mut self, newly_live: &[ChannelStatus]) {
        for status in newly_live {
            if !self.pending.iter().any(|p| p.channel_id == status.channel_id) {
                self.pending.push(status.clone());
            }
        }
    }

    pub fn remove(&mut self, channel_id: &str) {
        self.pending.retain(|p| p.channel_id != channel_id);
    }

    /// Drop channels that are no longer live in `roster`.
    pub fn retain_live(&mut self, roster: &[ChannelStatus]) {
        self.pending
            .retain(|p| roster.iter().any(|c| c.is_live && c.channel_id == p.channel_id));
    }

    pub fn dismiss(&mut self) -> bool {
        let had_any = !self.pending.is_empty();
        self.pending.clear();
        had_any
    }

    /// Channel the alert offers to watch.
    pub fn first(&self) -> Option<&ChannelStatus> {
        self.pending.first()
    }

    pub fn message(&self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let names: Vec<&str> = self.pending.iter().map(ChannelStatus::label).collect();
        Some(live_message(&names))
    }
}

/// "a just went live!" / "a, b and c just went live!"
pub fn live_message(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [one] => format!("{} just went live!", one),
        [rest @ .., last] => format!("{} and {} just went live!", rest.join(", "), last),
    }
}
