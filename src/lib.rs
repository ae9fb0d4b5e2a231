//! **hyprsplit** — per-monitor workspace numbering for Hyprland.
//!
//! Every monitor owns a contiguous block of ten normal workspaces, so the
//! "workspace 3" binding always lands on the focused monitor's third
//! workspace.  Five special (scratchpad) slots span all monitors: toggling
//! a slot shows that monitor's private overlay on every monitor at once.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::Environment`] — abstracts monitor enumeration, workspace
//!   switching and window movement so the numbering logic is not coupled
//!   to any specific compositor.
//! * [`traits::CommandSource`] — abstracts the transport that delivers
//!   user-intent (a Unix socket, a compositor event stream, …) so the main
//!   loop is not coupled to any specific IPC mechanism.
//!
//! Concrete implementations live in [`hyprland`] (Hyprland IPC) and
//! [`ipc`] (Unix-socket command listener).

pub mod codec;
pub mod command;
pub mod config;
pub mod hyprland;
pub mod ipc;
pub mod selector;
pub mod switcher;
pub mod toggle;
pub mod traits;
