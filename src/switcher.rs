//! The main orchestrator that ties the selector parser, the special
//! toggle, and the compositor environment together.
//!
//! [`SplitSwitcher`] reacts to [`Command`]s by resolving selectors
//! against live compositor state and issuing calls through the
//! [`Environment`] trait.  It is the only place that mutates anything:
//! parse failures never leave a partial switch behind.

use crate::codec::{self, Workspace, SPECIAL_SLOTS};
use crate::command::Command;
use crate::selector::{self, SelectorError};
use crate::toggle::{SpecialToggle, ToggleError};
use crate::traits::Environment;
use log::{debug, info};

/// Possible errors from the switcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwitcherError {
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error(transparent)]
    Toggle(#[from] ToggleError),
    #[error(transparent)]
    Range(#[from] codec::RangeError),
    #[error("cannot focus a special workspace directly; use toggle_special")]
    SpecialTarget,
    #[error("expected a slot number, got {0:?}")]
    InvalidSlot(String),
    #[error("environment error: {0}")]
    Environment(String),
}

/// Orchestrates workspace commands against a compositor backend.
///
/// Generic over any [`Environment`] implementation, so the whole command
/// surface is testable against an in-memory fake.
///
/// # Typical usage
///
/// ```ignore
/// let env = HyprlandEnv::new();
/// let mut switcher = SplitSwitcher::new(env);
/// switcher.reset_all_monitors()?;
/// switcher.handle(Command::ChangeWorkspace("c a 3".into()))?;
/// ```
pub struct SplitSwitcher<E: Environment> {
    env: E,
    toggle: SpecialToggle,
}

impl<E: Environment> SplitSwitcher<E> {
    pub fn new(env: E) -> Self {
        Self {
            env,
            toggle: SpecialToggle::new(),
        }
    }

    /// Process a single [`Command`].
    ///
    /// Every error aborts only this command; reporting it to the user is
    /// the caller's job (the dispatch loop turns it into a notification).
    pub fn handle(&mut self, cmd: Command) -> Result<(), SwitcherError> {
        match cmd {
            Command::ChangeWorkspace(arg) => self.change_workspace(&arg),
            Command::MoveWindowToWorkspace(arg) => self.move_window_to_workspace(&arg),
            Command::ToggleSpecial(arg) => self.toggle_special(&arg),
            Command::MonitorAdded => {
                info!("monitor added, resetting all monitors");
                self.reset_all_monitors()
            }
        }
    }

    /// Switch every monitor to its first workspace.
    ///
    /// Called at startup and whenever a monitor appears, so every display
    /// starts in a deterministic, addressable state.
    pub fn reset_all_monitors(&mut self) -> Result<(), SwitcherError> {
        for monitor in self.env.monitors().map_err(env_err)? {
            let id = codec::encode(monitor, Workspace::normal(0))?;
            self.env.set_active_workspace(monitor, id).map_err(env_err)?;
        }
        Ok(())
    }

    /// Show a user-visible notification; transport failures are ignored.
    pub fn notify(&self, message: &str) {
        let _ = self.env.notify(message);
    }

    fn change_workspace(&mut self, arg: &str) -> Result<(), SwitcherError> {
        // While an overlay is showing, any change request means "dismiss
        // the overlay"; the selector text is not even parsed.
        let focused = self.env.current_monitor().map_err(env_err)?;
        let active_id = self.env.active_workspace_id(focused).map_err(env_err)?;
        if let Some(ws) = codec::decode(focused, active_id).filter(|ws| ws.special) {
            debug!("change while {ws} is showing: dismissing overlay");
            return Ok(self.toggle.toggle(&self.env, ws)?);
        }

        let sel = selector::parse_workspace_selector(&self.env, arg)?;
        if sel.workspace.special {
            return Err(SwitcherError::SpecialTarget);
        }
        let id = codec::encode(sel.monitor, sel.workspace)?;
        info!("switch monitor {} to {}", sel.monitor, sel.workspace);
        self.env
            .set_active_workspace(sel.monitor, id)
            .map_err(env_err)
    }

    fn move_window_to_workspace(&mut self, arg: &str) -> Result<(), SwitcherError> {
        let target = selector::parse_window_selector(&self.env, arg)?;
        let id = codec::encode(target.monitor, target.workspace)?;
        info!(
            "move window {} to {} on monitor {}",
            target.window, target.workspace, target.monitor
        );
        self.env.move_window(&target.window, id).map_err(env_err)
    }

    fn toggle_special(&mut self, arg: &str) -> Result<(), SwitcherError> {
        let wire: i64 = arg
            .trim()
            .parse()
            .map_err(|_| SwitcherError::InvalidSlot(arg.trim().to_string()))?;
        if wire < 1 || wire > i64::from(SPECIAL_SLOTS) {
            return Err(codec::RangeError::SpecialSlot(wire.unsigned_abs() as u32).into());
        }
        let slot = Workspace::special_slot((wire - 1) as u32);
        info!("toggle {slot}");
        Ok(self.toggle.toggle(&self.env, slot)?)
    }
}

fn env_err<E: std::error::Error>(e: E) -> SwitcherError {
    SwitcherError::Environment(e.to_string())
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode, MonitorId, WorkspaceId};
    use crate::command::WindowHandle;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Debug, thiserror::Error)]
    #[error("recorder error")]
    struct RecorderErr;

    /// Record-keeping environment whose workspace state actually changes
    /// when switched.
    struct RecorderEnv {
        current: MonitorId,
        monitors: Vec<MonitorId>,
        active: RefCell<HashMap<MonitorId, WorkspaceId>>,
        existing: HashMap<MonitorId, Vec<Workspace>>,
        cursor_window: Option<WindowHandle>,
        windows: Vec<WindowHandle>,
        switches: RefCell<Vec<(MonitorId, WorkspaceId)>>,
        moves: RefCell<Vec<(WindowHandle, WorkspaceId)>>,
        notifications: RefCell<Vec<String>>,
    }

    impl RecorderEnv {
        /// Two monitors on workspaces 3 and 8 (0-based 2 and 7).
        fn two_monitors() -> Self {
            let mut env = Self {
                current: 0,
                monitors: vec![0, 1],
                active: RefCell::new(HashMap::new()),
                existing: HashMap::new(),
                cursor_window: None,
                windows: Vec::new(),
                switches: RefCell::new(Vec::new()),
                moves: RefCell::new(Vec::new()),
                notifications: RefCell::new(Vec::new()),
            };
            env.active
                .borrow_mut()
                .insert(0, encode(0, Workspace::normal(2)).unwrap());
            env.active
                .borrow_mut()
                .insert(1, encode(1, Workspace::normal(7)).unwrap());
            for m in [0, 1] {
                env.existing.insert(m, vec![Workspace::normal(0)]);
            }
            env
        }
    }

    impl Environment for RecorderEnv {
        type Error = RecorderErr;

        fn current_monitor(&self) -> Result<MonitorId, RecorderErr> {
            Ok(self.current)
        }

        fn monitor_by_id(&self, id: MonitorId) -> Result<Option<MonitorId>, RecorderErr> {
            Ok(self.monitors.contains(&id).then_some(id))
        }

        fn monitors(&self) -> Result<Vec<MonitorId>, RecorderErr> {
            Ok(self.monitors.clone())
        }

        fn active_workspace_id(&self, monitor: MonitorId) -> Result<WorkspaceId, RecorderErr> {
            self.active
                .borrow()
                .get(&monitor)
                .copied()
                .ok_or(RecorderErr)
        }

        fn normal_workspaces(&self, monitor: MonitorId) -> Result<Vec<Workspace>, RecorderErr> {
            Ok(self.existing.get(&monitor).cloned().unwrap_or_default())
        }

        fn set_active_workspace(
            &self,
            monitor: MonitorId,
            id: WorkspaceId,
        ) -> Result<(), RecorderErr> {
            self.active.borrow_mut().insert(monitor, id);
            self.switches.borrow_mut().push((monitor, id));
            Ok(())
        }

        fn window_at_cursor(&self) -> Result<Option<WindowHandle>, RecorderErr> {
            Ok(self.cursor_window.clone())
        }

        fn window_by_handle(&self, handle: u32) -> Result<Option<WindowHandle>, RecorderErr> {
            Ok(self
                .windows
                .iter()
                .find(|w| {
                    let hex = w.address.strip_prefix("0x").unwrap_or(&w.address);
                    let tail = &hex[hex.len().saturating_sub(8)..];
                    u32::from_str_radix(tail, 16) == Ok(handle)
                })
                .cloned())
        }

        fn move_window(&self, window: &WindowHandle, id: WorkspaceId) -> Result<(), RecorderErr> {
            self.moves.borrow_mut().push((window.clone(), id));
            Ok(())
        }

        fn notify(&self, message: &str) -> Result<(), RecorderErr> {
            self.notifications.borrow_mut().push(message.to_string());
            Ok(())
        }
    }

    fn make_switcher() -> SplitSwitcher<RecorderEnv> {
        SplitSwitcher::new(RecorderEnv::two_monitors())
    }

    //  change_workspace

    #[test]
    fn change_workspace_switches_one_monitor() {
        let mut s = make_switcher();
        s.handle(Command::ChangeWorkspace("c a 3".into())).unwrap();
        let switches = s.env.switches.borrow();
        assert_eq!(switches.len(), 1);
        assert_eq!(switches[0], (0, encode(0, Workspace::normal(2)).unwrap()));
    }

    #[test]
    fn change_workspace_on_absolute_monitor() {
        let mut s = make_switcher();
        s.handle(Command::ChangeWorkspace("a 1 a 2".into())).unwrap();
        let switches = s.env.switches.borrow();
        assert_eq!(switches.len(), 1);
        assert_eq!(switches[0], (1, encode(1, Workspace::normal(1)).unwrap()));
    }

    #[test]
    fn change_workspace_rejects_special_targets() {
        let mut s = make_switcher();
        let result = s.handle(Command::ChangeWorkspace("c s 1".into()));
        assert_eq!(result, Err(SwitcherError::SpecialTarget));
        assert!(s.env.switches.borrow().is_empty());
    }

    #[test]
    fn change_while_overlay_is_showing_dismisses_it() {
        let mut s = make_switcher();
        s.handle(Command::ToggleSpecial("1".into())).unwrap();
        s.env.switches.borrow_mut().clear();

        // The selector text is ignored; even garbage dismisses.
        s.handle(Command::ChangeWorkspace("not a selector".into()))
            .unwrap();

        let active = s.env.active.borrow();
        assert_eq!(active[&0], encode(0, Workspace::normal(2)).unwrap());
        assert_eq!(active[&1], encode(1, Workspace::normal(7)).unwrap());
    }

    #[test]
    fn malformed_selector_switches_nothing() {
        let mut s = make_switcher();
        assert!(s.handle(Command::ChangeWorkspace("c a".into())).is_err());
        assert!(s.env.switches.borrow().is_empty());
    }

    //  move_window_to_workspace

    #[test]
    fn move_cursor_window_to_other_monitor() {
        let mut s = make_switcher();
        s.env.cursor_window = Some(WindowHandle::new("0x55a3f2c04b10"));
        s.handle(Command::MoveWindowToWorkspace("c a 1 a 2".into()))
            .unwrap();
        let moves = s.env.moves.borrow();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].0.address, "0x55a3f2c04b10");
        assert_eq!(moves[0].1, encode(1, Workspace::normal(1)).unwrap());
    }

    #[test]
    fn move_window_by_handle() {
        let mut s = make_switcher();
        s.env.windows.push(WindowHandle::new("0x55a3f2c04b10"));
        s.handle(Command::MoveWindowToWorkspace("f2c04b10 c a 1".into()))
            .unwrap();
        let moves = s.env.moves.borrow();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].1, encode(0, Workspace::normal(0)).unwrap());
    }

    #[test]
    fn move_window_to_special_slot_is_allowed() {
        let mut s = make_switcher();
        s.env.cursor_window = Some(WindowHandle::new("0xbeef"));
        s.handle(Command::MoveWindowToWorkspace("c c s 1".into()))
            .unwrap();
        let moves = s.env.moves.borrow();
        assert_eq!(moves[0].1, encode(0, Workspace::special_slot(0)).unwrap());
    }

    #[test]
    fn move_without_window_is_an_error() {
        let mut s = make_switcher();
        let result = s.handle(Command::MoveWindowToWorkspace("c a 1 a 2".into()));
        assert_eq!(
            result,
            Err(SelectorError::NoWindowAtCursor.into())
        );
        assert!(s.env.moves.borrow().is_empty());
    }

    //  toggle_special

    #[test]
    fn toggle_special_fans_out_and_restores() {
        let mut s = make_switcher();
        s.handle(Command::ToggleSpecial("1".into())).unwrap();
        {
            let active = s.env.active.borrow();
            assert_eq!(active[&0], encode(0, Workspace::special_slot(0)).unwrap());
            assert_eq!(active[&1], encode(1, Workspace::special_slot(0)).unwrap());
        }
        s.handle(Command::ToggleSpecial("1".into())).unwrap();
        let active = s.env.active.borrow();
        assert_eq!(active[&0], encode(0, Workspace::normal(2)).unwrap());
        assert_eq!(active[&1], encode(1, Workspace::normal(7)).unwrap());
    }

    #[test]
    fn toggle_special_rejects_non_numeric_slots() {
        let mut s = make_switcher();
        assert_eq!(
            s.handle(Command::ToggleSpecial("first".into())),
            Err(SwitcherError::InvalidSlot("first".into()))
        );
    }

    #[test]
    fn toggle_special_rejects_out_of_range_slots() {
        let mut s = make_switcher();
        assert!(s.handle(Command::ToggleSpecial("0".into())).is_err());
        assert!(s.handle(Command::ToggleSpecial("6".into())).is_err());
        assert!(s.env.switches.borrow().is_empty());
    }

    //  reset

    #[test]
    fn reset_switches_every_monitor_to_first_workspace() {
        let mut s = make_switcher();
        s.reset_all_monitors().unwrap();
        let switches = s.env.switches.borrow();
        assert_eq!(
            switches.as_slice(),
            &[
                (0, encode(0, Workspace::normal(0)).unwrap()),
                (1, encode(1, Workspace::normal(0)).unwrap()),
            ]
        );
    }

    #[test]
    fn monitor_added_triggers_reset() {
        let mut s = make_switcher();
        s.handle(Command::MonitorAdded).unwrap();
        assert_eq!(s.env.switches.borrow().len(), 2);
    }

    #[test]
    fn notify_reaches_the_environment() {
        let s = make_switcher();
        s.notify("hyprsplit: boom");
        assert_eq!(s.env.notifications.borrow().as_slice(), &["hyprsplit: boom"]);
    }
}
