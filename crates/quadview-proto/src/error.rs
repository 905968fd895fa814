use thiserror::Error;

/// Input rejected by the slot controller.  State is never mutated when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("slot index {index} out of range (expected 0-3)")]
    SlotOutOfRange { index: usize },

    #[error("unknown view mode {0:?} (expected single, dual or quad)")]
    UnknownMode(String),

    #[error("channel id must not be empty")]
    EmptyChannelId,
}
