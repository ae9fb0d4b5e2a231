//! UWID selector parsing.
//!
//! A UWID ("universal workspace id") is the short textual address the
//! commands accept.  Space-separated tokens, resolved left to right in a
//! single pass:
//!
//! ```text
//! UWID      := [window] monitor workspace
//! window    := "c"            (window under the cursor)
//!            | <hex handle>   (last 8 hex chars of a window address)
//! monitor   := "c"            (monitor under the cursor)
//!            | "a" <id>       (absolute monitor id)
//! workspace := "a" <n>        (absolute workspace, 1-based)
//!            | "s" <n>        (special slot, 1-based)
//!            | "e" <delta>    (offset over the fixed 1..10 index ring)
//!            | "r" <delta>    (offset over the workspaces that exist,
//!                              by position in the ascending list)
//! ```
//!
//! `e` wraps over the full capacity whether or not the workspaces exist;
//! `r` only walks the monitor's currently existing workspaces, so it
//! skips holes.  Both directions wrap, and both require the monitor's
//! active workspace to be a normal one.
//!
//! Resolution consults the live [`Environment`], so a selector is never
//! a persistent value; parse, use, discard.  Parsing performs no
//! mutation, and any failure aborts the whole selector.

use crate::codec::{self, MonitorId, Workspace, SPECIAL_SLOTS, WORKSPACES_PER_MONITOR};
use crate::command::WindowHandle;
use crate::traits::Environment;

/// A resolved `monitor workspace` selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    pub monitor: MonitorId,
    pub workspace: Workspace,
}

/// A resolved `window monitor workspace` selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowTarget {
    pub window: WindowHandle,
    pub monitor: MonitorId,
    pub workspace: Workspace,
}

/// Everything that can go wrong while resolving a selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("missing {0} token")]
    MissingToken(&'static str),
    #[error("expected an integer, got {0:?}")]
    InvalidInteger(String),
    #[error("unknown selection method {0:?}")]
    UnknownMethod(String),
    #[error("workspace numbers are 1-based, got {0}")]
    NonPositiveIndex(i64),
    #[error(transparent)]
    Range(#[from] codec::RangeError),
    #[error("monitor {0} is showing a special workspace, relative selectors need a normal one")]
    ActiveIsSpecial(MonitorId),
    #[error("monitor {0} is showing a workspace outside its namespace")]
    UnmanagedActive(MonitorId),
    #[error("active workspace missing from monitor {0}'s workspace list")]
    ActiveNotFound(MonitorId),
    #[error("monitor {0} has no workspaces")]
    EmptyWorkspaceSet(MonitorId),
    #[error("no monitor with id {0}")]
    UnknownMonitor(i64),
    #[error("invalid window handle {0:?}")]
    InvalidHandle(String),
    #[error("no window with handle 0x{0:08x}")]
    WindowNotFound(u32),
    #[error("no window under the cursor")]
    NoWindowAtCursor,
    #[error("environment error: {0}")]
    Environment(String),
}

/// Resolve a `monitor workspace` selector against the environment.
pub fn parse_workspace_selector<E: Environment>(
    env: &E,
    text: &str,
) -> Result<Selector, SelectorError> {
    let mut tokens = Tokens::new(text);
    let monitor = resolve_monitor(env, &mut tokens)?;
    let workspace = resolve_workspace(env, monitor, &mut tokens)?;
    Ok(Selector { monitor, workspace })
}

/// Resolve a `window monitor workspace` selector against the environment.
pub fn parse_window_selector<E: Environment>(
    env: &E,
    text: &str,
) -> Result<WindowTarget, SelectorError> {
    let mut tokens = Tokens::new(text);
    let window = resolve_window(env, &mut tokens)?;
    let monitor = resolve_monitor(env, &mut tokens)?;
    let workspace = resolve_workspace(env, monitor, &mut tokens)?;
    Ok(WindowTarget {
        window,
        monitor,
        workspace,
    })
}

//  Token stream

struct Tokens<'a> {
    iter: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            iter: text.split_whitespace(),
        }
    }

    fn next(&mut self, what: &'static str) -> Result<&'a str, SelectorError> {
        self.iter.next().ok_or(SelectorError::MissingToken(what))
    }

    fn integer(&mut self, what: &'static str) -> Result<i64, SelectorError> {
        let token = self.next(what)?;
        token
            .parse()
            .map_err(|_| SelectorError::InvalidInteger(token.to_string()))
    }
}

//  Resolution

fn env_err<E: std::error::Error>(e: E) -> SelectorError {
    SelectorError::Environment(e.to_string())
}

fn resolve_monitor<E: Environment>(
    env: &E,
    tokens: &mut Tokens<'_>,
) -> Result<MonitorId, SelectorError> {
    let token = tokens.next("monitor")?;
    match token {
        "c" => env.current_monitor().map_err(env_err),
        "a" => {
            let raw = tokens.integer("monitor id")?;
            let id =
                MonitorId::try_from(raw).map_err(|_| SelectorError::UnknownMonitor(raw))?;
            env.monitor_by_id(id)
                .map_err(env_err)?
                .ok_or(SelectorError::UnknownMonitor(raw))
        }
        other => Err(SelectorError::UnknownMethod(other.to_string())),
    }
}

fn resolve_workspace<E: Environment>(
    env: &E,
    monitor: MonitorId,
    tokens: &mut Tokens<'_>,
) -> Result<Workspace, SelectorError> {
    let method = tokens.next("workspace selection method")?;
    match method {
        "a" => {
            let index = absolute_index(tokens.integer("workspace number")?)?;
            if index >= WORKSPACES_PER_MONITOR {
                return Err(codec::RangeError::Workspace(index).into());
            }
            Ok(Workspace::normal(index))
        }
        "s" => {
            let index = absolute_index(tokens.integer("slot number")?)?;
            if index >= SPECIAL_SLOTS {
                return Err(codec::RangeError::SpecialSlot(index).into());
            }
            Ok(Workspace::special_slot(index))
        }
        "e" => {
            let delta = tokens.integer("workspace offset")?;
            let cur = active_normal(env, monitor)?;
            Ok(Workspace::normal(wrap_index(
                cur.index,
                delta,
                WORKSPACES_PER_MONITOR,
            )))
        }
        "r" => {
            let delta = tokens.integer("workspace offset")?;
            let cur = active_normal(env, monitor)?;
            let existing = env.normal_workspaces(monitor).map_err(env_err)?;
            if existing.is_empty() {
                return Err(SelectorError::EmptyWorkspaceSet(monitor));
            }
            let pos = existing
                .iter()
                .position(|w| w.index == cur.index)
                .ok_or(SelectorError::ActiveNotFound(monitor))?;
            let target = wrap_index(pos as u32, delta, existing.len() as u32);
            Ok(existing[target as usize])
        }
        other => Err(SelectorError::UnknownMethod(other.to_string())),
    }
}

fn resolve_window<E: Environment>(
    env: &E,
    tokens: &mut Tokens<'_>,
) -> Result<WindowHandle, SelectorError> {
    let token = tokens.next("window")?;
    if token == "c" {
        return env
            .window_at_cursor()
            .map_err(env_err)?
            .ok_or(SelectorError::NoWindowAtCursor);
    }
    let handle = parse_handle(token)?;
    env.window_by_handle(handle)
        .map_err(env_err)?
        .ok_or(SelectorError::WindowNotFound(handle))
}

/// The monitor's active workspace, which must be one of our normal ones.
fn active_normal<E: Environment>(
    env: &E,
    monitor: MonitorId,
) -> Result<Workspace, SelectorError> {
    let id = env.active_workspace_id(monitor).map_err(env_err)?;
    let ws = codec::decode(monitor, id).ok_or(SelectorError::UnmanagedActive(monitor))?;
    if ws.special {
        return Err(SelectorError::ActiveIsSpecial(monitor));
    }
    Ok(ws)
}

/// Convert a 1-based wire number to a 0-based index.
fn absolute_index(wire: i64) -> Result<u32, SelectorError> {
    if wire < 1 {
        return Err(SelectorError::NonPositiveIndex(wire));
    }
    Ok((wire - 1) as u32)
}

/// `(base + delta) mod len`, non-negative for any `delta`.
fn wrap_index(base: u32, delta: i64, len: u32) -> u32 {
    let len = i64::from(len);
    ((i64::from(base) + delta % len + len) % len) as u32
}

/// Parse the low 32 bits of a window address token.
///
/// The token may be a full compositor address (`0x55a3f2c04b10`); only
/// its last 8 hex characters matter.
fn parse_handle(token: &str) -> Result<u32, SelectorError> {
    let hex = token.strip_prefix("0x").unwrap_or(token);
    if !hex.is_ascii() {
        return Err(SelectorError::InvalidHandle(token.to_string()));
    }
    let tail = &hex[hex.len().saturating_sub(8)..];
    u32::from_str_radix(tail, 16).map_err(|_| SelectorError::InvalidHandle(token.to_string()))
}

//  Tests
