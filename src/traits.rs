//! Core traits that decouple hyprsplit from any specific compositor or
//! transport mechanism.
//!
//! Every concrete backend (Hyprland, a Unix-socket listener, a test
//! harness, …) implements one of these traits.  The selector parser, the
//! special-workspace toggle, and the
//! [`SplitSwitcher`](crate::switcher::SplitSwitcher) only depend on these
//! abstractions.

use crate::codec::{MonitorId, Workspace, WorkspaceId};
use crate::command::{Command, WindowHandle};
use std::sync::mpsc;

/// Abstraction over the compositor primitives the core logic needs.
///
/// An implementation might talk to Hyprland via IPC, or it might be an
/// in-memory fake used in tests.  All calls are synchronous; monitor ids
/// and flat workspace ids are whatever the compositor hands out.
pub trait Environment {
    /// The error type produced by this environment.
    type Error: std::error::Error + Send + 'static;

    /// Id of the monitor the input cursor is currently on.
    fn current_monitor(&self) -> Result<MonitorId, Self::Error>;

    /// Whether a monitor with this id exists; returns the id back so
    /// callers can chain it.
    fn monitor_by_id(&self, id: MonitorId) -> Result<Option<MonitorId>, Self::Error>;

    /// Every connected monitor, in the compositor's order.
    fn monitors(&self) -> Result<Vec<MonitorId>, Self::Error>;

    /// Flat id of the workspace currently shown on `monitor`.
    fn active_workspace_id(&self, monitor: MonitorId) -> Result<WorkspaceId, Self::Error>;

    /// The normal workspaces that currently exist in `monitor`'s
    /// namespace, ascending by index.  Not assumed contiguous.
    fn normal_workspaces(&self, monitor: MonitorId) -> Result<Vec<Workspace>, Self::Error>;

    /// Show workspace `id` on `monitor`, creating it on demand.  Created
    /// workspaces are named from the local index
    /// ([`Workspace::display_name`]).
    fn set_active_workspace(&self, monitor: MonitorId, id: WorkspaceId)
        -> Result<(), Self::Error>;

    /// The window under the input cursor, if any.
    fn window_at_cursor(&self) -> Result<Option<WindowHandle>, Self::Error>;

    /// Look up a window by the low 32 bits of its address.
    fn window_by_handle(&self, handle: u32) -> Result<Option<WindowHandle>, Self::Error>;

    /// Move `window` to workspace `id`, creating the workspace on demand.
    fn move_window(&self, window: &WindowHandle, id: WorkspaceId) -> Result<(), Self::Error>;

    /// Show a user-visible notification.  Failures here are never fatal;
    /// callers may ignore them.
    fn notify(&self, message: &str) -> Result<(), Self::Error>;
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport — a Unix socket, the
/// compositor's event stream, an in-memory channel, … — and forward
/// commands into the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted
///   or an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated
///   thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    ///
    /// This method blocks the calling thread.  To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
