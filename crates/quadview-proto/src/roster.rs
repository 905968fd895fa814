//! Roster ordering and the poll-to-poll status diff.
//!
//! `StatusDiffEngine` keeps the previous snapshot as an owned field.  Each
//! call to `update` compares the fresh snapshot against it, then replaces it
//! wholesale.  The engine must see snapshots in arrival order; it does no
//! locking of its own.
//!
//! ```text
//!  poll ──► update(snapshot) ──► dedupe (last wins) ──► normalize
//!                                   │
//!                                   ├── diff vs previous (skipped on first poll)
//!                                   ├── sort → roster
//!                                   └── previous := snapshot
//! ```

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::protocol::ChannelStatus;

/// What changed between two successive snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDiff {
    /// Live now; absent or offline in the previous snapshot.
    pub newly_live: Vec<ChannelStatus>,
    /// Ids that were live and are now offline or gone.
    pub went_offline: Vec<String>,
    /// Live in both snapshots with a different title or category.
    pub title_changed: Vec<ChannelStatus>,
}

impl StatusDiff {
    pub fn is_empty(&self) -> bool {
        self.newly_live.is_empty() && self.went_offline.is_empty() && self.title_changed.is_empty()
    }

    /// Append another diff's entries after this one's.
    pub fn merge(&mut self, other: StatusDiff) {
        self.newly_live.extend(other.newly_live);
        self.went_offline.extend(other.went_offline);
        self.title_changed.extend(other.title_changed);
    }
}

/// Result of feeding the engine: the sorted roster and, when something
/// changed since a non-empty previous snapshot, the diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterUpdate {
    pub roster: Vec<ChannelStatus>,
    pub diff: Option<StatusDiff>,
}

/// Sort for display: live before offline, then viewers descending.
/// Stable, so offline entries keep their relative order.
pub fn sort_roster(channels: &mut [ChannelStatus]) {
    channels.sort_by_key(|c| (!c.is_live, Reverse(c.viewers())));
}

/// Collapse duplicate ids.  The last occurrence's values win, placed at the
/// first occurrence's position.
fn dedupe_last_wins(snapshot: Vec<ChannelStatus>) -> Vec<ChannelStatus> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(snapshot.len());
    let mut out: Vec<ChannelStatus> = Vec::with_capacity(snapshot.len());
    for entry in snapshot {
        let entry = entry.normalized();
        match index.get(&entry.channel_id) {
            Some(&i) => out[i] = entry,
            None => {
                index.insert(entry.channel_id.clone(), out.len());
                out.push(entry);
            }
        }
    }
    out
}

/// Compare two deduplicated snapshots.
pub fn diff_snapshots(previous: &[ChannelStatus], current: &[ChannelStatus]) -> StatusDiff {
    let prev_by_id: HashMap<&str, &ChannelStatus> =
        previous.iter().map(|c| (c.channel_id.as_str(), c)).collect();
    let curr_by_id: HashMap<&str, &ChannelStatus> =
        current.iter().map(|c| (c.channel_id.as_str(), c)).collect();

    let mut diff = StatusDiff::default();

    for status in current.iter().filter(|c| c.is_live) {
        match prev_by_id.get(status.channel_id.as_str()) {
            Some(prev) if prev.is_live => {
                if prev.title != status.title || prev.category != status.category {
                    diff.title_changed.push(status.clone());
                }
            }
            _ => diff.newly_live.push(status.clone()),
        }
    }

    for prev in previous.iter().filter(|c| c.is_live) {
        let still_live = curr_by_id
            .get(prev.channel_id.as_str())
            .is_some_and(|c| c.is_live);
        if !still_live {
            diff.went_offline.push(prev.channel_id.clone());
        }
    }

    diff
}

#[derive(Debug, Default)]
pub struct StatusDiffEngine {
    /// Last polled snapshot, deduplicated, in arrival order.
    previous: Vec<ChannelStatus>,
    /// Current display roster.  Survives failed polls untouched.
    roster: Vec<ChannelStatus>,
}

impl StatusDiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roster(&self) -> &[ChannelStatus] {
        &self.roster
    }

    /// Feed a freshly fetched snapshot.  No diff is produced against an
    /// empty previous snapshot, or when nothing changed.
    pub fn update(&mut self, snapshot: Vec<ChannelStatus>) -> RosterUpdate {
        let current = dedupe_last_wins(snapshot);

        let diff = if self.previous.is_empty() {
            None
        } else {
            Some(diff_snapshots(&self.previous, &current)).filter(|d| !d.is_empty())
        };

        if let Some(d) = &diff {
            debug!(
                "status diff: {} newly live, {} went offline, {} title changes",
                d.newly_live.len(),
                d.went_offline.len(),
                d.title_changed.len()
            );
        }

        let mut roster = current.clone();
        sort_roster(&mut roster);

        self.previous = current;
        self.roster = roster.clone();

        RosterUpdate { roster, diff }
    }

    /// Merge a synthetic entry into the roster without waiting for a poll
    /// and report it as newly live.  Inserting an id the roster already
    /// holds leaves the roster as it was.  The previous snapshot is not
    /// touched, so the next poll drops the entry again.
    pub fn inject_synthetic(&mut self, entry: ChannelStatus) -> RosterUpdate {
        let entry = entry.normalized();
        if !self.roster.iter().any(|c| c.channel_id == entry.channel_id) {
            debug!("injecting synthetic entry {}", entry.channel_id);
            self.roster.push(entry.clone());
            sort_roster(&mut self.roster);
        }

        RosterUpdate {
            roster: self.roster.clone(),
            diff: Some(StatusDiff {
                newly_live: vec![entry],
                ..StatusDiff::default()
            }),
        }
    }

    /// Strip an entry from the roster by id.  Absent ids are ignored.
    pub fn remove_synthetic(&mut self, channel_id: &str) -> &[ChannelStatus] {
        self.roster.retain(|c| c.channel_id != channel_id);
        &self.roster
    }
}
