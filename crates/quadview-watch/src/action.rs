//! Action enum: one parsed stdin command.

use std::str::FromStr;

use quadview_proto::error::SplitError;
use quadview_proto::split::ViewMode;
use thiserror::Error;

/// Id used by `inject` / `remove` when none is given.
pub const DEFAULT_SYNTHETIC_ID: &str = "teststream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Assign a channel to the active slot.  `None` follows the pending
    /// live alert.
    Watch(Option<String>),
    Mode(ViewMode),
    Focus(usize),
    Unmute(usize),
    Inject(String),
    Remove(String),
    Dismiss,
    Status,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseActionError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?} (try: watch, mode, slot, unmute, inject, remove, dismiss, status, quit)")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid slot index {0:?}")]
    BadIndex(String),
    #[error(transparent)]
    Mode(#[from] SplitError),
}

fn index_arg(cmd: &'static str, arg: Option<&str>) -> Result<usize, ParseActionError> {
    let raw = arg.ok_or(ParseActionError::MissingArgument(cmd))?;
    raw.parse()
        .map_err(|_| ParseActionError::BadIndex(raw.to_string()))
}

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let cmd = words.next().ok_or(ParseActionError::Empty)?;
        let arg = words.next();

        match cmd.to_ascii_lowercase().as_str() {
            "watch" | "w" => Ok(Action::Watch(arg.map(str::to_lowercase))),
            "mode" | "m" => {
                let raw = arg.ok_or(ParseActionError::MissingArgument("mode"))?;
                Ok(Action::Mode(raw.parse()?))
            }
            "slot" | "s" => Ok(Action::Focus(index_arg("slot", arg)?)),
            "unmute" | "u" => Ok(Action::Unmute(index_arg("unmute", arg)?)),
            "inject" => Ok(Action::Inject(
                arg.unwrap_or(DEFAULT_SYNTHETIC_ID).to_lowercase(),
            )),
            "remove" => Ok(Action::Remove(
                arg.unwrap_or(DEFAULT_SYNTHETIC_ID).to_lowercase(),
            )),
            "dismiss" | "d" => Ok(Action::Dismiss),
            "status" => Ok(Action::Status),
            "quit" | "q" | "exit" => Ok(Action::Quit),
            other => Err(ParseActionError::Unknown(other.to_string())),
        }
    }
}
