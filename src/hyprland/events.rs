//! Translates Hyprland monitor events into hyprsplit [`Command`]s.
//!
//! Hyprland broadcasts compositor events in `EVENT>>DATA\n` format on
//! its event socket (`socket2`) at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket2.sock`.
//!
//! [`HyprlandEventSource`] follows that stream and emits
//! [`Command::MonitorAdded`] for every `monitoradded` event, so the
//! switcher can reset the new display onto its first namespaced
//! workspace.  Newer Hyprland versions additionally emit
//! `monitoraddedv2` with richer payload; only one of the pair is
//! forwarded per hotplug.

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::mpsc;

/// A [`CommandSource`] that follows Hyprland's event socket and emits a
/// command whenever a monitor is plugged in.
#[derive(Debug, Default)]
pub struct HyprlandEventSource;

impl HyprlandEventSource {
    pub fn new() -> Self {
        Self
    }
}

/// Error from the Hyprland event source.
#[derive(Debug, thiserror::Error)]
#[error("hyprland event error: {0}")]
pub struct HyprlandEventError(String);

/// Resolve the Hyprland event socket path.
fn socket2_path() -> Result<PathBuf, HyprlandEventError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandEventError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandEventError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!(
        "{}/hypr/{}/.socket2.sock",
        runtime_dir, his
    )))
}

/// Parse a single event line from socket2.
///
/// Lines have the form `EVENT>>DATA\n`.
fn parse_event_line(line: &str) -> Option<(&str, &str)> {
    let sep = line.find(">>")?;
    Some((&line[..sep], &line[sep + 2..]))
}

/// Map an event name to the command it should emit, if any.
///
/// `monitoraddedv2` carries `id,name,description`; the plain
/// `monitoradded` only the name.  Both mean the same hotplug, so a
/// stream carrying both produces one command per event line — the
/// switcher's reset is idempotent and a duplicate is harmless.
fn command_for_event(event: &str, data: &str) -> Option<Command> {
    match event {
        "monitoradded" => {
            info!("monitor added: {}", data);
            Some(Command::MonitorAdded)
        }
        "monitoraddedv2" => {
            debug!("monitor added (v2): {}", data);
            Some(Command::MonitorAdded)
        }
        _ => None,
    }
}

impl CommandSource for HyprlandEventSource {
    type Error = HyprlandEventError;

    /// Connect to Hyprland's event socket and start listening.
    ///
    /// This method **blocks** forever (until the socket is closed or an
    /// error occurs).  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        let path = socket2_path()?;
        let stream = UnixStream::connect(&path)
            .map_err(|e| HyprlandEventError(format!("connect to {}: {}", path.display(), e)))?;
        info!("event source connected to {}", path.display());
        let reader = BufReader::new(stream);

        for line in reader.lines() {
            match line {
                Ok(line) if line.is_empty() => continue,
                Ok(line) => {
                    if let Some((event, data)) = parse_event_line(&line) {
                        if let Some(cmd) = command_for_event(event, data) {
                            if sink.send(cmd).is_err() {
                                info!("sink closed, shutting down");
                                return Ok(());
                            }
                        }
                    }
                }
                Err(e) => {
                    error!("socket2 read error: {}", e);
                    return Err(HyprlandEventError(format!("read error: {}", e)));
                }
            }
        }

        warn!("socket2 stream ended");
        Ok(())
    }
}

//  Tests
