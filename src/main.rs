//! Entry point for the **hyprsplit** daemon.
//!
//! Spawns all configured [`CommandSource`](hyprsplit::traits::CommandSource)s
//! on background threads and processes incoming commands on the main thread.

use hyprsplit::command::Command;
use hyprsplit::config::Config;
use hyprsplit::hyprland::env::HyprlandEnv;
use hyprsplit::hyprland::events::HyprlandEventSource;
use hyprsplit::ipc::listener::UnixSocketListener;
use hyprsplit::switcher::SplitSwitcher;
use hyprsplit::traits::CommandSource;
use log::{error, info};
use std::sync::mpsc;

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/hyprsplit.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/hyprsplit`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("hyprsplit")
}

/// Try to load the config from `$XDG_CONFIG_HOME/hyprsplit/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();

    let _config = load_config();

    let env = HyprlandEnv::new();
    let mut switcher = SplitSwitcher::new(env);

    // Put every monitor on its own first workspace before accepting
    // commands, so the per-monitor numbering holds from the start.
    if let Err(e) = switcher.reset_all_monitors() {
        error!("initial workspace reset failed: {}", e);
    }

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx);

    info!("hyprsplit running");
    for cmd in cmd_rx {
        if let Err(e) = switcher.handle(cmd) {
            error!("command error: {}", e);
            switcher.notify(&format!("hyprsplit: {}", e));
        }
    }
    info!("all command sources closed, exiting");
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    {
        let tx = tx.clone();
        let path = default_socket_path();
        std::thread::spawn(move || {
            let mut source = UnixSocketListener::new(&path);
            if let Err(e) = source.run(tx) {
                error!("socket listener error: {}", e);
            }
        });
    }

    // Monitor hot-plug events arrive over Hyprland's event socket.  A new
    // monitor gets its workspace block initialised as soon as it appears.
    {
        let tx = tx.clone();
        std::thread::spawn(move || {
            let mut source = HyprlandEventSource::new();
            if let Err(e) = source.run(tx) {
                error!("event source error: {}", e);
            }
        });
    }

    drop(tx);
}
