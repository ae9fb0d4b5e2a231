//! Hyprland-specific implementations.
//!
//! This module provides concrete backends for the
//! [`Environment`](crate::traits::Environment) and
//! [`CommandSource`](crate::traits::CommandSource) traits, powered by
//! Hyprland's IPC sockets.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod env;
pub mod events;
