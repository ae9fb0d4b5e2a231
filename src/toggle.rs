//! The special-workspace (scratchpad) toggle.
//!
//! A special slot is one logical overlay shown on **every** monitor at
//! once, but because the codec gives each monitor its own id for the
//! slot, one toggle fans out into one compositor call per monitor.  The
//! enter/exit decision is taken solely from the currently focused
//! monitor, so all displays stay in lockstep:
//!
//! * focused monitor already shows the requested slot → **exit**: every
//!   monitor is restored to its remembered normal workspace;
//! * otherwise → **enter** (or switch slots): every monitor is switched
//!   to its encoding of the slot, after snapshotting the normal
//!   workspaces to come back to.
//!
//! The restore memory is only refreshed when leaving the *normal* state.
//! Switching directly from one special slot to another keeps the
//! pre-overlay snapshot, so exiting always lands on the workspaces that
//! were visible before any overlay appeared.

use crate::codec::{self, MonitorId, Workspace, WorkspaceId};
use crate::traits::Environment;
use log::debug;
use std::collections::HashMap;

/// Errors from toggling a special slot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToggleError {
    #[error("toggle requires a special workspace slot")]
    NotSpecial,
    #[error(transparent)]
    Range(#[from] codec::RangeError),
    #[error("environment error: {0}")]
    Environment(String),
}

/// Owns the per-monitor "last normal workspace" memory and implements
/// the toggle state machine.
///
/// One instance lives for the whole process, created at startup.  A
/// monitor that has never been seen before restores to its first
/// workspace.
#[derive(Debug, Default)]
pub struct SpecialToggle {
    last_normal: HashMap<MonitorId, Workspace>,
}

impl SpecialToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `slot` across every monitor.
    ///
    /// All per-monitor target ids are encoded up front, so an invalid
    /// slot fails before any monitor has been switched.  A compositor
    /// failure mid-fan-out still aborts partway; the next toggle
    /// resynchronizes the displays.
    pub fn toggle<E: Environment>(&mut self, env: &E, slot: Workspace) -> Result<(), ToggleError> {
        if !slot.special {
            return Err(ToggleError::NotSpecial);
        }

        let focused = env.current_monitor().map_err(env_err)?;
        let focused_ws = codec::decode(focused, env.active_workspace_id(focused).map_err(env_err)?);
        let monitors = env.monitors().map_err(env_err)?;

        if focused_ws == Some(slot) {
            self.exit(env, &monitors)
        } else {
            self.enter(env, &monitors, focused_ws, slot)
        }
    }

    /// Restore every monitor to its remembered normal workspace.
    fn exit<E: Environment>(&self, env: &E, monitors: &[MonitorId]) -> Result<(), ToggleError> {
        let targets = monitors
            .iter()
            .map(|&m| {
                let ws = self.restore_target(m);
                codec::encode(m, ws).map(|id| (m, ws, id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (monitor, ws, id) in targets {
            debug!("restore monitor {monitor} to {ws}");
            env.set_active_workspace(monitor, id).map_err(env_err)?;
        }
        Ok(())
    }

    /// Show `slot` on every monitor, remembering where each one was if
    /// we are coming from the normal state.
    fn enter<E: Environment>(
        &mut self,
        env: &E,
        monitors: &[MonitorId],
        focused_ws: Option<Workspace>,
        slot: Workspace,
    ) -> Result<(), ToggleError> {
        let targets = monitors
            .iter()
            .map(|&m| codec::encode(m, slot).map(|id| (m, id)))
            .collect::<Result<Vec<(MonitorId, WorkspaceId)>, _>>()?;

        // Snapshot only when leaving the normal state; switching between
        // two slots keeps the pre-overlay memory.
        if !focused_ws.is_some_and(|ws| ws.special) {
            for &monitor in monitors {
                let active = env.active_workspace_id(monitor).map_err(env_err)?;
                if let Some(ws) = codec::decode(monitor, active).filter(|ws| !ws.special) {
                    debug!("remember monitor {monitor} at {ws}");
                    self.last_normal.insert(monitor, ws);
                }
            }
        }

        for (monitor, id) in targets {
            debug!("show {slot} on monitor {monitor}");
            env.set_active_workspace(monitor, id).map_err(env_err)?;
        }
        Ok(())
    }

    /// Where `monitor` should land when the overlay is dismissed.
    fn restore_target(&self, monitor: MonitorId) -> Workspace {
        self.last_normal
            .get(&monitor)
            .copied()
            .unwrap_or(Workspace::normal(0))
    }
}

fn env_err<E: std::error::Error>(e: E) -> ToggleError {
    ToggleError::Environment(e.to_string())
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use std::cell::RefCell;

    #[derive(Debug, thiserror::Error)]
    #[error("fake env error")]
    struct FakeError;

    /// In-memory environment whose active workspaces actually change
    /// when switched, so sequences of toggles behave like the real thing.
    struct FakeEnv {
        current: MonitorId,
        monitors: Vec<MonitorId>,
        active: RefCell<HashMap<MonitorId, WorkspaceId>>,
        switch_log: RefCell<Vec<(MonitorId, WorkspaceId)>>,
    }

    impl FakeEnv {
        fn new(active: &[(MonitorId, Workspace)]) -> Self {
            Self {
                current: 0,
                monitors: active.iter().map(|&(m, _)| m).collect(),
                active: RefCell::new(
                    active
                        .iter()
                        .map(|&(m, ws)| (m, encode(m, ws).unwrap()))
                        .collect(),
                ),
                switch_log: RefCell::new(Vec::new()),
            }
        }

        fn active_of(&self, monitor: MonitorId) -> WorkspaceId {
            self.active.borrow()[&monitor]
        }
    }

    impl Environment for FakeEnv {
        type Error = FakeError;

        fn current_monitor(&self) -> Result<MonitorId, FakeError> {
            Ok(self.current)
        }

        fn monitor_by_id(&self, id: MonitorId) -> Result<Option<MonitorId>, FakeError> {
            Ok(self.monitors.contains(&id).then_some(id))
        }

        fn monitors(&self) -> Result<Vec<MonitorId>, FakeError> {
            Ok(self.monitors.clone())
        }

        fn active_workspace_id(&self, monitor: MonitorId) -> Result<WorkspaceId, FakeError> {
            self.active.borrow().get(&monitor).copied().ok_or(FakeError)
        }

        fn normal_workspaces(&self, _monitor: MonitorId) -> Result<Vec<Workspace>, FakeError> {
            Ok(Vec::new())
        }

        fn set_active_workspace(
            &self,
            monitor: MonitorId,
            id: WorkspaceId,
        ) -> Result<(), FakeError> {
            self.active.borrow_mut().insert(monitor, id);
            self.switch_log.borrow_mut().push((monitor, id));
            Ok(())
        }

        fn window_at_cursor(&self) -> Result<Option<crate::command::WindowHandle>, FakeError> {
            Ok(None)
        }

        fn window_by_handle(
            &self,
            _handle: u32,
        ) -> Result<Option<crate::command::WindowHandle>, FakeError> {
            Ok(None)
        }

        fn move_window(
            &self,
            _window: &crate::command::WindowHandle,
            _id: WorkspaceId,
        ) -> Result<(), FakeError> {
            Ok(())
        }

        fn notify(&self, _message: &str) -> Result<(), FakeError> {
            Ok(())
        }
    }

    #[test]
    fn enter_fans_out_to_every_monitor() {
        let env = FakeEnv::new(&[(0, Workspace::normal(2)), (1, Workspace::normal(7))]);
        let mut toggle = SpecialToggle::new();
        toggle
            .toggle(&env, Workspace::special_slot(0))
            .unwrap();

        assert_eq!(
            env.active_of(0),
            encode(0, Workspace::special_slot(0)).unwrap()
        );
        assert_eq!(
            env.active_of(1),
            encode(1, Workspace::special_slot(0)).unwrap()
        );
        // Distinct ids per monitor, same logical slot.
        assert_ne!(env.active_of(0), env.active_of(1));
    }

    #[test]
    fn second_toggle_restores_prior_workspaces() {
        let env = FakeEnv::new(&[(0, Workspace::normal(2)), (1, Workspace::normal(7))]);
        let mut toggle = SpecialToggle::new();
        toggle.toggle(&env, Workspace::special_slot(0)).unwrap();
        toggle.toggle(&env, Workspace::special_slot(0)).unwrap();

        assert_eq!(env.active_of(0), encode(0, Workspace::normal(2)).unwrap());
        assert_eq!(env.active_of(1), encode(1, Workspace::normal(7)).unwrap());
    }

    #[test]
    fn switching_between_slots_keeps_original_restore_memory() {
        let env = FakeEnv::new(&[(0, Workspace::normal(2)), (1, Workspace::normal(7))]);
        let mut toggle = SpecialToggle::new();
        toggle.toggle(&env, Workspace::special_slot(0)).unwrap();
        // Hop to a different slot while the first overlay is showing.
        toggle.toggle(&env, Workspace::special_slot(1)).unwrap();
        assert_eq!(
            env.active_of(0),
            encode(0, Workspace::special_slot(1)).unwrap()
        );
        // Dismissing still lands on the pre-overlay workspaces.
        toggle.toggle(&env, Workspace::special_slot(1)).unwrap();
        assert_eq!(env.active_of(0), encode(0, Workspace::normal(2)).unwrap());
        assert_eq!(env.active_of(1), encode(1, Workspace::normal(7)).unwrap());
    }

    #[test]
    fn unseen_monitor_restores_to_first_workspace() {
        let env = FakeEnv::new(&[(0, Workspace::normal(2))]);
        let mut toggle = SpecialToggle::new();
        // Exit without ever having entered through this controller: the
        // focused monitor shows the slot already (e.g. daemon restart).
        env.set_active_workspace(0, encode(0, Workspace::special_slot(0)).unwrap())
            .unwrap();
        env.switch_log.borrow_mut().clear();

        toggle.toggle(&env, Workspace::special_slot(0)).unwrap();
        assert_eq!(env.active_of(0), encode(0, Workspace::normal(0)).unwrap());
    }

    #[test]
    fn normal_slot_argument_is_rejected_without_mutation() {
        let env = FakeEnv::new(&[(0, Workspace::normal(2))]);
        let mut toggle = SpecialToggle::new();
        assert_eq!(
            toggle.toggle(&env, Workspace::normal(1)),
            Err(ToggleError::NotSpecial)
        );
        assert!(env.switch_log.borrow().is_empty());
    }

    #[test]
    fn invalid_slot_fails_before_any_switch() {
        let env = FakeEnv::new(&[(0, Workspace::normal(2)), (1, Workspace::normal(7))]);
        let mut toggle = SpecialToggle::new();
        assert_eq!(
            toggle.toggle(&env, Workspace::special_slot(9)),
            Err(codec::RangeError::SpecialSlot(9).into())
        );
        assert!(
            env.switch_log.borrow().is_empty(),
            "no monitor may be switched when validation fails"
        );
    }

    #[test]
    fn entering_while_monitor_shows_foreign_workspace_skips_its_snapshot() {
        let env = FakeEnv::new(&[(0, Workspace::normal(2)), (1, Workspace::normal(7))]);
        // Monitor 1's active id was set outside our namespace.
        env.active.borrow_mut().insert(1, 55);
        let mut toggle = SpecialToggle::new();
        toggle.toggle(&env, Workspace::special_slot(0)).unwrap();
        toggle.toggle(&env, Workspace::special_slot(0)).unwrap();
        // Monitor 0 restores to its snapshot, monitor 1 to the default.
        assert_eq!(env.active_of(0), encode(0, Workspace::normal(2)).unwrap());
        assert_eq!(env.active_of(1), encode(1, Workspace::normal(0)).unwrap());
    }
}
