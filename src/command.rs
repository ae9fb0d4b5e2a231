//! Commands and types used throughout hyprsplit.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] describes every operation the switcher can perform, and
//! [`WindowHandle`] identifies a compositor window.
//!
//! Command sources forward raw selector text; resolving it against live
//! compositor state happens later, in [`selector`](crate::selector), so a
//! selector is never parsed against state older than the command that
//! uses it.

use std::fmt;

/// A compositor window, identified by its full address string
/// (e.g. `"0x55a3f2c04b10"`).
///
/// Selectors address windows by the low 32 bits of this address (the
/// last 8 hex characters); the full string is what dispatch commands
/// need, so the handle carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowHandle {
    /// Address as reported by the compositor, including the `0x` prefix.
    pub address: String,
}

impl WindowHandle {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

/// Every operation the switcher can perform.
///
/// Produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed by the
/// [`SplitSwitcher`](crate::switcher::SplitSwitcher).  The selector
/// arguments stay unparsed here; see the module docs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch to the workspace named by a `monitor workspace` selector,
    /// e.g. `"c e 1"` (next workspace on the current monitor).
    ///
    /// While a special workspace is showing, any change request dismisses
    /// the overlay instead; the selector text is ignored.
    ChangeWorkspace(String),

    /// Move a window to a workspace, named by a
    /// `window monitor workspace` selector, e.g. `"c a 1 a 2"`.
    MoveWindowToWorkspace(String),

    /// Toggle the given special (scratchpad) slot, 1-based on the wire,
    /// across every monitor at once.
    ToggleSpecial(String),

    /// A monitor appeared.  Emitted by the compositor event source, not
    /// parseable from the wire; triggers a reset of every monitor to its
    /// first workspace so the new display starts addressable.
    MonitorAdded,
}

/// A command line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("command {0:?} requires an argument")]
    MissingArgument(&'static str),
}

impl Command {
    /// Parse one line of the textual wire protocol.
    ///
    /// The first whitespace-separated token is the command name; the rest
    /// of the line is passed through verbatim as the selector argument.
    ///
    /// ```text
    /// change_workspace c a 3
    /// move_window_to_workspace c a 1 a 2
    /// toggle_special 1
    /// ```
    pub fn parse_line(line: &str) -> Result<Self, CommandParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandParseError::Empty);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let require_arg = |name| {
            if rest.is_empty() {
                Err(CommandParseError::MissingArgument(name))
            } else {
                Ok(rest.to_string())
            }
        };
        match verb {
            "change_workspace" => Ok(Command::ChangeWorkspace(require_arg("change_workspace")?)),
            "move_window_to_workspace" => Ok(Command::MoveWindowToWorkspace(require_arg(
                "move_window_to_workspace",
            )?)),
            "toggle_special" => Ok(Command::ToggleSpecial(require_arg("toggle_special")?)),
            other => Err(CommandParseError::UnknownCommand(other.to_string())),
        }
    }
}

//  Tests
