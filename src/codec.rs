//! Workspace namespace partitioning.
//!
//! Hyprland exposes a single flat workspace-id space shared by every
//! monitor.  hyprsplit carves that space into disjoint per-monitor
//! namespaces so each monitor can count its workspaces 1..10 on its own:
//!
//! * **Normal** workspaces: monitor `m` owns the contiguous block
//!   `WORKSPACE_BASE + m * WORKSPACES_PER_MONITOR ..` of ten ids.
//! * **Special** (scratchpad) workspaces: slot `s` on monitor `m` maps to
//!   `SPECIAL_BASE + s * SPECIAL_SLOTS + m`.  The ids are interleaved by
//!   monitor with stride [`SPECIAL_SLOTS`], so the same logical slot gets
//!   a distinct id per monitor yet remains identifiable by residue.
//!
//! The split exists because Hyprland's active-workspace state is
//! per-monitor while its workspace existence/lookup API is global.
//! [`encode`] is injective over all valid `(monitor, workspace)` pairs;
//! [`owns`] / [`decode`] recover the pair from a flat id.

use std::fmt;

/// Monitor id assigned by the compositor.
pub type MonitorId = u32;

/// Flat workspace id understood by the compositor.
pub type WorkspaceId = u32;

/// First id of monitor 0's normal block.
pub const WORKSPACE_BASE: WorkspaceId = 1;

/// Normal workspaces each monitor gets.
pub const WORKSPACES_PER_MONITOR: u32 = 10;

/// First id of the special (scratchpad) range.
pub const SPECIAL_BASE: WorkspaceId = 100_000;

/// Number of special slots, and the per-monitor interleave stride.
pub const SPECIAL_SLOTS: u32 = 5;

/// A workspace address relative to one monitor: kind plus 0-based index.
///
/// Immutable value type.  On the wire (selectors, workspace names) the
/// index is 1-based; everything in this crate past the parser is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Workspace {
    /// Scratchpad slot rather than a normal workspace.
    pub special: bool,
    /// 0-based index within the kind's capacity.
    pub index: u32,
}

impl Workspace {
    /// Normal workspace at `index`.
    pub fn normal(index: u32) -> Self {
        Self {
            special: false,
            index,
        }
    }

    /// Special (scratchpad) slot at `index`.
    pub fn special_slot(index: u32) -> Self {
        Self {
            special: true,
            index,
        }
    }

    /// Display name the compositor should give this workspace: the
    /// 1-based index, prefixed with `s` for special slots.
    pub fn display_name(&self) -> String {
        if self.special {
            format!("s{}", self.index + 1)
        } else {
            format!("{}", self.index + 1)
        }
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.special {
            write!(f, "special slot {}", self.index + 1)
        } else {
            write!(f, "workspace {}", self.index + 1)
        }
    }
}

/// A workspace index outside the capacity of its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("workspace index {0} out of range (monitors have {WORKSPACES_PER_MONITOR} workspaces)")]
    Workspace(u32),
    #[error("special slot {0} out of range ({SPECIAL_SLOTS} slots exist)")]
    SpecialSlot(u32),
}

/// Map a local workspace on `monitor` to its flat compositor id.
pub fn encode(monitor: MonitorId, ws: Workspace) -> Result<WorkspaceId, RangeError> {
    if ws.special {
        if ws.index >= SPECIAL_SLOTS {
            return Err(RangeError::SpecialSlot(ws.index));
        }
        Ok(SPECIAL_BASE + ws.index * SPECIAL_SLOTS + monitor)
    } else {
        if ws.index >= WORKSPACES_PER_MONITOR {
            return Err(RangeError::Workspace(ws.index));
        }
        Ok(WORKSPACE_BASE + monitor * WORKSPACES_PER_MONITOR + ws.index)
    }
}

/// Whether flat id `id` belongs to `monitor`'s namespace.
pub fn owns(monitor: MonitorId, id: WorkspaceId) -> bool {
    if id >= SPECIAL_BASE {
        let offset = id - SPECIAL_BASE;
        offset >= monitor && (offset - monitor) % SPECIAL_SLOTS == 0
    } else {
        id >= WORKSPACE_BASE && (id - WORKSPACE_BASE) / WORKSPACES_PER_MONITOR == monitor
    }
}

/// Inverse of [`encode`]: recover the local workspace behind flat id `id`.
///
/// Returns `None` when `id` is not in `monitor`'s namespace (for example
/// a workspace the user created outside hyprsplit).
pub fn decode(monitor: MonitorId, id: WorkspaceId) -> Option<Workspace> {
    if !owns(monitor, id) {
        return None;
    }
    if id >= SPECIAL_BASE {
        Some(Workspace::special_slot(
            (id - SPECIAL_BASE - monitor) / SPECIAL_SLOTS,
        ))
    } else {
        Some(Workspace::normal(
            id - WORKSPACE_BASE - monitor * WORKSPACES_PER_MONITOR,
        ))
    }
}

//  Tests
