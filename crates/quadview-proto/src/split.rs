//! Slot assignment for the split view.
//!
//! Up to four slots each hold a channel id.  The view mode decides how many
//! of them are visible; slots past that count are always empty.  The active
//! slot is where the next assignment lands and the unmuted slot is the only
//! one with audio.
//!
//! # Transitions
//! ```text
//!  AssignChannel(id): no-op if already in the active slot, swap if visible
//!                     elsewhere, otherwise replace; then advance the
//!                     active slot to the first empty visible slot
//!  SetMode(mode):     clear hidden slots, re-pick the active slot, pull the
//!                     unmuted slot back into view
//!  SetActiveSlot(i):  unconditional, 0..=3
//!  SetUnmutedSlot(i): unconditional, 0..=3
//! ```
//!
//! Every transition is a pure function `SplitState × SplitCommand ->
//! SplitState`; `SplitController` just holds the current value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SplitError;

pub const SLOT_COUNT: usize = 4;

/// How many slots are visible at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Single,
    Dual,
    Quad,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Single, ViewMode::Dual, ViewMode::Quad];

    pub fn visible_slots(self) -> usize {
        match self {
            ViewMode::Single => 1,
            ViewMode::Dual => 2,
            ViewMode::Quad => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Single => "single",
            ViewMode::Dual => "dual",
            ViewMode::Quad => "quad",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "1" => Ok(ViewMode::Single),
            "dual" | "2" => Ok(ViewMode::Dual),
            "quad" | "4" => Ok(ViewMode::Quad),
            _ => Err(SplitError::UnknownMode(s.to_string())),
        }
    }
}

/// A command accepted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitCommand {
    AssignChannel(String),
    SetMode(ViewMode),
    SetActiveSlot(usize),
    SetUnmutedSlot(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitState {
    slots: [Option<String>; SLOT_COUNT],
    mode: ViewMode,
    active_slot: usize,
    unmuted_slot: usize,
}

fn first_empty(slots: &[Option<String>]) -> Option<usize> {
    slots.iter().position(Option::is_none)
}

fn check_index(index: usize) -> Result<usize, SplitError> {
    if index < SLOT_COUNT {
        Ok(index)
    } else {
        Err(SplitError::SlotOutOfRange { index })
    }
}

impl SplitState {
    pub fn slots(&self) -> &[Option<String>; SLOT_COUNT] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|s| s.as_deref())
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn active_slot(&self) -> usize {
        self.active_slot
    }

    pub fn unmuted_slot(&self) -> usize {
        self.unmuted_slot
    }

    pub fn slot_count(&self) -> usize {
        self.mode.visible_slots()
    }

    /// Slots currently on screen.
    pub fn visible(&self) -> &[Option<String>] {
        &self.slots[..self.slot_count()]
    }

    pub fn contains_channel(&self, channel_id: &str) -> bool {
        self.visible().iter().any(|s| s.as_deref() == Some(channel_id))
    }

    pub fn has_empty_slot(&self) -> bool {
        self.visible().iter().any(Option::is_none)
    }

    /// Apply one command, returning the next state.  `self` is left as is,
    /// including when the command is rejected.
    pub fn apply(&self, command: &SplitCommand) -> Result<SplitState, SplitError> {
        match command {
            SplitCommand::AssignChannel(channel_id) => self.assigned(channel_id),
            SplitCommand::SetMode(mode) => Ok(self.with_mode(*mode)),
            SplitCommand::SetActiveSlot(index) => {
                let index = check_index(*index)?;
                Ok(SplitState {
                    active_slot: index,
                    ..self.clone()
                })
            }
            SplitCommand::SetUnmutedSlot(index) => {
                let index = check_index(*index)?;
                Ok(SplitState {
                    unmuted_slot: index,
                    ..self.clone()
                })
            }
        }
    }

    fn assigned(&self, channel_id: &str) -> Result<SplitState, SplitError> {
        if channel_id.is_empty() {
            return Err(SplitError::EmptyChannelId);
        }
        let count = self.slot_count();

        // A hidden active slot is never written; retarget into view.
        let target = if self.active_slot < count {
            self.active_slot
        } else {
            first_empty(&self.slots[..count]).unwrap_or(0)
        };

        if self.slots[target].as_deref() == Some(channel_id) {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        let existing = next.slots[..count]
            .iter()
            .position(|s| s.as_deref() == Some(channel_id));
        match existing {
            Some(j) => {
                next.slots[j] = next.slots[target].take();
                next.slots[target] = Some(channel_id.to_string());
            }
            None => next.slots[target] = Some(channel_id.to_string()),
        }

        // All visible slots full: the active slot stays where it was.
        next.active_slot = first_empty(&next.slots[..count]).unwrap_or(target);
        Ok(next)
    }

    fn with_mode(&self, mode: ViewMode) -> SplitState {
        let count = mode.visible_slots();
        let mut next = self.clone();
        next.mode = mode;
        for slot in next.slots[count..].iter_mut() {
            *slot = None;
        }
        next.active_slot = first_empty(&next.slots[..count]).unwrap_or(0);
        if next.unmuted_slot >= count {
            next.unmuted_slot = 0;
        }
        next
    }
}

/// Owns the single `SplitState` of a viewing session.
#[derive(Debug, Default)]
pub struct SplitController {
    state: SplitState,
}

impl SplitController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SplitState {
        &self.state
    }

    pub fn apply(&mut self, command: SplitCommand) -> Result<&SplitState, SplitError> {
        let next = self.state.apply(&command)?;
        if next != self.state {
            debug!("split {:?}: {:?}", command, next);
            self.state = next;
        }
        Ok(&self.state)
    }

    pub fn assign_channel(&mut self, channel_id: &str) -> Result<&SplitState, SplitError> {
        self.apply(SplitCommand::AssignChannel(channel_id.to_string()))
    }

    pub fn set_mode(&mut self, mode: ViewMode) -> &SplitState {
        self.state = self.state.with_mode(mode);
        debug!("split mode -> {}: {:?}", mode, self.state);
        &self.state
    }

    pub fn set_active_slot(&mut self, index: usize) -> Result<&SplitState, SplitError> {
        self.apply(SplitCommand::SetActiveSlot(index))
    }

    pub fn set_unmuted_slot(&mut self, index: usize) -> Result<&SplitState, SplitError> {
        self.apply(SplitCommand::SetUnmutedSlot(index))
    }
}
