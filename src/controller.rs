//! Top-level Browsing/Running state machine, stepped once per tick.
//!
//! While browsing, the axis feeds the debouncer and the selection, and a
//! confirm edge starts the selected game on a worker thread. While a game
//! runs, navigation is frozen and only the two-button kill hold is checked.
//! The mode is re-read from the supervisor at the start of every tick, which
//! is how a game exit hands control back.

use crate::catalog::{Catalog, CatalogEntry, EmptyCatalogError};
use crate::config::ControlSettings;
use crate::input::{InputDebouncer, InputFrame, NavIntent};
use crate::log_debug;
use crate::selection::SelectionState;
use crate::supervisor::{
    AppMode, ChildHandle, LaunchRequest, ProcessSupervisor, SupervisorError, SupervisorEvent,
    SupervisorStatus,
};

/// What the rendering layer needs after a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSnapshot {
    pub mode: AppMode,
    pub selected: usize,
    /// Label of the game being started or run, if any.
    pub running: Option<String>,
}

/// Both kill buttons must be held strictly longer than `threshold` in the same tick.
pub fn kill_combo_engaged(hold_a: u32, hold_b: u32, threshold: u32) -> bool {
    hold_a > threshold && hold_b > threshold
}

pub struct AppController {
    catalog: Catalog,
    selection: SelectionState,
    debouncer: InputDebouncer,
    supervisor: ProcessSupervisor,
    settings: ControlSettings,
    last_mode: AppMode,
}

impl AppController {
    /// Fails before entering Browsing when there is nothing to browse.
    pub fn new(
        entries: Vec<CatalogEntry>,
        settings: ControlSettings,
        supervisor: ProcessSupervisor,
    ) -> Result<Self, EmptyCatalogError> {
        let catalog = Catalog::new(entries)?;
        let selection = SelectionState::new(catalog.len())?;
        Ok(Self {
            catalog,
            selection,
            debouncer: InputDebouncer::new(settings.dead_zone, settings.navigation_timeout),
            last_mode: supervisor.mode(),
            supervisor,
            settings,
        })
    }

    pub fn tick(&mut self, frame: &InputFrame) -> LauncherSnapshot {
        self.drain_supervisor_events();

        let status = self.supervisor.status();
        let mode = status.mode();
        if mode != self.last_mode {
            log_debug(&format!(
                "mode {} -> {}",
                self.last_mode.label(),
                mode.label()
            ));
            self.last_mode = mode;
        }

        match mode {
            AppMode::Browsing => self.tick_browsing(frame),
            AppMode::Running => self.tick_running(frame, &status),
        }
        self.snapshot()
    }

    fn tick_browsing(&mut self, frame: &InputFrame) {
        let intent = self.debouncer.step(frame.axis);
        if intent != NavIntent::None {
            self.selection.advance(intent);
        }
        if frame.confirm {
            self.launch_selected();
        }
    }

    fn tick_running(&mut self, frame: &InputFrame, status: &SupervisorStatus) {
        if !kill_combo_engaged(frame.hold_a, frame.hold_b, self.settings.kill_hold_ticks) {
            return;
        }
        // Still spawning: there is no process to signal yet.
        let SupervisorStatus::Running(handle) = status else {
            return;
        };
        if self.kill(handle) {
            log_debug(&format!(
                "kill combo held; SIGKILL sent to '{}' (pid {})",
                handle.label, handle.pid
            ));
        }
    }

    /// Kill whatever game is still running, e.g. when the launcher exits on
    /// an error. Returns whether a kill was delivered.
    pub fn shutdown(&self) -> bool {
        let Some(handle) = self.supervisor.active() else {
            return false;
        };
        log_debug(&format!("shutting down; killing '{}'", handle.label));
        self.kill(&handle)
    }

    fn kill(&self, handle: &ChildHandle) -> bool {
        match self.supervisor.request_kill(handle) {
            Ok(()) => true,
            Err(err) => {
                log_debug(&format!("kill request for '{}' failed: {err}", handle.label));
                tracing::warn!(label = %handle.label, pid = handle.pid, error = %err, "kill failed");
                false
            }
        }
    }

    fn launch_selected(&mut self) {
        let entry = self.selected_entry();
        let request = LaunchRequest::new(&entry.executable_path)
            .with_working_dir(&entry.game_dir)
            .with_label(&entry.name);
        log_debug(&format!(
            "launching '{}' from {}",
            request.label,
            request.program.display()
        ));
        match self.supervisor.launch_in_background(request) {
            Ok(()) => self.last_mode = AppMode::Running,
            Err(SupervisorError::AlreadyRunning) => {
                log_debug("launch ignored: a game is already running");
            }
            Err(err) => log_debug(&format!("launch failed: {err}")),
        }
    }

    fn drain_supervisor_events(&self) {
        for event in self.supervisor.drain_events() {
            match event {
                SupervisorEvent::Started(handle) => {
                    log_debug(&format!("running '{}' (pid {})", handle.label, handle.pid));
                }
                SupervisorEvent::LaunchFailed { label, message } => {
                    log_debug(&format!("could not start '{label}': {message}"));
                }
                SupervisorEvent::Exited { handle, status } => {
                    log_debug(&format!(
                        "'{}' (pid {}) exited with {status} after {} ms",
                        handle.label,
                        handle.pid,
                        handle.uptime().as_millis()
                    ));
                }
                SupervisorEvent::WaitFailed { handle, error } => {
                    log_debug(&format!(
                        "waiting on '{}' (pid {}) failed: {error}; treating as exited",
                        handle.label, handle.pid
                    ));
                }
            }
        }
    }

    pub fn snapshot(&self) -> LauncherSnapshot {
        let status = self.supervisor.status();
        LauncherSnapshot {
            mode: status.mode(),
            selected: self.selection.index(),
            running: status.label().map(str::to_string),
        }
    }

    pub fn mode(&self) -> AppMode {
        self.supervisor.mode()
    }

    pub fn selected_index(&self) -> usize {
        self.selection.index()
    }

    pub fn selected_entry(&self) -> &CatalogEntry {
        // SelectionState keeps the index below catalog.len().
        &self.catalog.entries()[self.selection.index()]
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }
}
