//! [`Environment`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any shell command invocation or third-party crate for socket
//! discovery.

use crate::codec::{self, MonitorId, Workspace, WorkspaceId};
use crate::command::WindowHandle;
use crate::traits::Environment;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Hyprland-backed environment.
///
/// All communication happens over Hyprland's command socket; no child
/// processes are spawned and no connection is held open — each method
/// call makes a short-lived IPC request.
#[derive(Default)]
pub struct HyprlandEnv;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandEnvError(String);

impl HyprlandEnv {
    pub fn new() -> Self {
        Self
    }
}

//  Direct Hyprland IPC helpers

/// Resolve the Hyprland command socket path.
///
/// Hyprland ≥ 0.40 stores its sockets at
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
fn socket_path() -> Result<PathBuf, HyprlandEnvError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandEnvError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandEnvError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!(
        "{}/hypr/{}/.socket.sock",
        runtime_dir, his
    )))
}

/// Send a raw command to the Hyprland command socket and return the
/// response as a string.
fn ipc_request(command: &str) -> Result<String, HyprlandEnvError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandEnvError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandEnvError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandEnvError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandEnvError(format!("utf-8: {}", e)))
}

/// Send a JSON data query (`j/<command>`) and parse the response.
fn ipc_json<T: for<'de> Deserialize<'de>>(data_command: &str) -> Result<T, HyprlandEnvError> {
    let json = ipc_request(&format!("j/{}", data_command))?;
    serde_json::from_str(&json)
        .map_err(|e| HyprlandEnvError(format!("parse {} response: {}", data_command, e)))
}

/// Send a dispatch command and check for `"ok"`.
fn ipc_dispatch(args: &str) -> Result<(), HyprlandEnvError> {
    let response = ipc_request(&format!("/dispatch {}", args))?;
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandEnvError(format!("dispatch error: {}", response)))
    }
}

//  Minimal serde structs for the JSON we care about

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Deserialize)]
struct MonitorJson {
    id: i64,
    focused: bool,
    #[serde(rename = "activeWorkspace")]
    active_workspace: WorkspaceRefJson,
}

/// The `{"id": …, "name": …}` workspace reference embedded in monitors.
#[derive(Deserialize)]
struct WorkspaceRefJson {
    id: i64,
}

/// Subset of the JSON object returned by `j/workspaces`.
#[derive(Deserialize)]
struct WorkspaceJson {
    id: i64,
}

/// Subset of the JSON object returned by `j/clients`.
#[derive(Deserialize)]
struct ClientJson {
    address: String,
    at: (i32, i32),
    size: (i32, i32),
    mapped: bool,
    hidden: bool,
    #[serde(rename = "focusHistoryID")]
    focus_history_id: i32,
}

/// The JSON object returned by `j/cursorpos`.
#[derive(Deserialize)]
struct CursorPosJson {
    x: i32,
    y: i32,
}

/// Low 32 bits of a window address string, for handle matching.
fn address_low_bits(address: &str) -> Option<u32> {
    let hex = address.strip_prefix("0x").unwrap_or(address);
    if !hex.is_ascii() {
        return None;
    }
    let tail = &hex[hex.len().saturating_sub(8)..];
    u32::from_str_radix(tail, 16).ok()
}

fn monitor_id(raw: i64) -> Result<MonitorId, HyprlandEnvError> {
    MonitorId::try_from(raw).map_err(|_| HyprlandEnvError(format!("bad monitor id: {}", raw)))
}

fn workspace_id(raw: i64) -> Result<WorkspaceId, HyprlandEnvError> {
    WorkspaceId::try_from(raw).map_err(|_| HyprlandEnvError(format!("bad workspace id: {}", raw)))
}

//  Environment implementation

impl Environment for HyprlandEnv {
    type Error = HyprlandEnvError;

    fn current_monitor(&self) -> Result<MonitorId, Self::Error> {
        let monitors: Vec<MonitorJson> = ipc_json("monitors")?;
        monitors
            .iter()
            .find(|m| m.focused)
            .map(|m| monitor_id(m.id))
            .ok_or_else(|| HyprlandEnvError("no focused monitor".into()))?
    }

    fn monitor_by_id(&self, id: MonitorId) -> Result<Option<MonitorId>, Self::Error> {
        let monitors: Vec<MonitorJson> = ipc_json("monitors")?;
        Ok(monitors
            .iter()
            .any(|m| m.id == i64::from(id))
            .then_some(id))
    }

    fn monitors(&self) -> Result<Vec<MonitorId>, Self::Error> {
        let monitors: Vec<MonitorJson> = ipc_json("monitors")?;
        let mut ids = monitors
            .iter()
            .map(|m| monitor_id(m.id))
            .collect::<Result<Vec<_>, _>>()?;
        ids.sort_unstable();
        Ok(ids)
    }

    fn active_workspace_id(&self, monitor: MonitorId) -> Result<WorkspaceId, Self::Error> {
        let monitors: Vec<MonitorJson> = ipc_json("monitors")?;
        let m = monitors
            .iter()
            .find(|m| m.id == i64::from(monitor))
            .ok_or_else(|| HyprlandEnvError(format!("unknown monitor id: {}", monitor)))?;
        workspace_id(m.active_workspace.id)
    }

    fn normal_workspaces(&self, monitor: MonitorId) -> Result<Vec<Workspace>, Self::Error> {
        let workspaces: Vec<WorkspaceJson> = ipc_json("workspaces")?;
        let mut owned: Vec<Workspace> = workspaces
            .iter()
            .filter_map(|w| WorkspaceId::try_from(w.id).ok())
            .filter(|&id| id < codec::SPECIAL_BASE)
            .filter_map(|id| codec::decode(monitor, id))
            .collect();
        owned.sort_unstable_by_key(|w| w.index);
        Ok(owned)
    }

    fn set_active_workspace(&self, monitor: MonitorId, id: WorkspaceId) -> Result<(), Self::Error> {
        // Hyprland dispatches are global — focus the target monitor
        // first, then switch.  The workspace is created on demand; give
        // it its local name so bars show per-monitor numbering.
        ipc_dispatch(&format!("focusmonitor {}", monitor))?;
        ipc_dispatch(&format!("workspace {}", id))?;
        if let Some(ws) = codec::decode(monitor, id) {
            ipc_dispatch(&format!("renameworkspace {} {}", id, ws.display_name()))?;
        }
        Ok(())
    }

    fn window_at_cursor(&self) -> Result<Option<WindowHandle>, Self::Error> {
        let cursor: CursorPosJson = ipc_json("cursorpos")?;
        let clients: Vec<ClientJson> = ipc_json("clients")?;
        // Visible windows containing the cursor, most recently focused
        // first (focusHistoryID 0 is the focused window).
        Ok(clients
            .into_iter()
            .filter(|c| c.mapped && !c.hidden)
            .filter(|c| {
                cursor.x >= c.at.0
                    && cursor.x < c.at.0 + c.size.0
                    && cursor.y >= c.at.1
                    && cursor.y < c.at.1 + c.size.1
            })
            .min_by_key(|c| c.focus_history_id)
            .map(|c| WindowHandle::new(c.address)))
    }

    fn window_by_handle(&self, handle: u32) -> Result<Option<WindowHandle>, Self::Error> {
        let clients: Vec<ClientJson> = ipc_json("clients")?;
        Ok(clients
            .into_iter()
            .find(|c| address_low_bits(&c.address) == Some(handle))
            .map(|c| WindowHandle::new(c.address)))
    }

    fn move_window(&self, window: &WindowHandle, id: WorkspaceId) -> Result<(), Self::Error> {
        ipc_dispatch(&format!("movetoworkspace {},address:{}", id, window.address))
    }

    fn notify(&self, message: &str) -> Result<(), Self::Error> {
        // icon -1 (none), 5s, blue accent.
        ipc_request(&format!("/notify -1 5000 rgb(61afef) {}", message)).map(|_| ())
    }
}

//  Tests
