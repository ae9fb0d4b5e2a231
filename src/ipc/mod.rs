//! IPC listener that accepts commands over a Unix socket.
//!
//! Keybind helpers (`hyprctl`-style one-liners, scripts, bars) connect
//! to the socket and send newline-delimited textual commands.

pub mod listener;
