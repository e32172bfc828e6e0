//! Single-child process supervision.
//!
//! At most one child is installed at a time. A launch reserves the slot
//! synchronously, the spawn itself may run on a worker thread, and a watcher
//! blocks on the child's exit and clears the slot afterwards. The slot is the
//! only state shared with the foreground tick loop.
//!
//! Exit is observed without reaping, the slot lock is taken, and only then is
//! the pid reaped and the slot cleared. Kill requests signal under the same
//! lock, so a SIGKILL can never reach a recycled pid.

mod error;
#[cfg(test)]
pub(crate) mod fake;
mod os;

pub use error::{KillError, LaunchError, SupervisorError};
pub use os::{ChildProcess, LaunchRequest, OsSpawner, ProcessSpawner};

use crate::lock::lock_or_recover;
use crate::log_debug;
use crate::telemetry;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::io;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Max queued lifecycle events before new ones are dropped.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Whether the launcher owns the screen or a game does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Browsing,
    Running,
}

impl AppMode {
    pub fn label(self) -> &'static str {
        match self {
            AppMode::Browsing => "browsing",
            AppMode::Running => "running",
        }
    }
}

/// Reference to the installed child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildHandle {
    pub pid: u32,
    pub label: String,
    pub started_at: Instant,
    generation: u64,
}

impl ChildHandle {
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Point-in-time view of the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorStatus {
    Idle,
    /// Slot reserved, spawn in flight.
    Starting { label: String },
    Running(ChildHandle),
}

impl SupervisorStatus {
    pub fn mode(&self) -> AppMode {
        match self {
            SupervisorStatus::Idle => AppMode::Browsing,
            SupervisorStatus::Starting { .. } | SupervisorStatus::Running(_) => AppMode::Running,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            SupervisorStatus::Idle => None,
            SupervisorStatus::Starting { label } => Some(label),
            SupervisorStatus::Running(handle) => Some(&handle.label),
        }
    }
}

/// Lifecycle notifications for the controller's log.
#[derive(Debug)]
pub enum SupervisorEvent {
    Started(ChildHandle),
    LaunchFailed { label: String, message: String },
    Exited { handle: ChildHandle, status: ExitStatus },
    /// Waiting on the child failed; the slot was cleared anyway.
    WaitFailed { handle: ChildHandle, error: io::Error },
}

enum Slot {
    Empty,
    Reserved { generation: u64, label: String },
    Active(ActiveChild),
}

struct ActiveChild {
    handle: ChildHandle,
    process: Arc<dyn ChildProcess>,
}

struct Shared {
    slot: Mutex<Slot>,
    next_generation: AtomicU64,
}

/// Everything a worker thread needs; cheap to clone.
#[derive(Clone)]
struct Worker {
    shared: Arc<Shared>,
    spawner: Arc<dyn ProcessSpawner>,
    events_tx: Sender<SupervisorEvent>,
}

pub struct ProcessSupervisor {
    worker: Worker,
    events_rx: Receiver<SupervisorEvent>,
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self::with_spawner(Arc::new(OsSpawner))
    }

    pub fn with_spawner(spawner: Arc<dyn ProcessSpawner>) -> Self {
        let (events_tx, events_rx) = bounded(EVENT_CHANNEL_CAPACITY);
        Self {
            worker: Worker {
                shared: Arc::new(Shared {
                    slot: Mutex::new(Slot::Empty),
                    next_generation: AtomicU64::new(1),
                }),
                spawner,
                events_tx,
            },
            events_rx,
        }
    }

    pub fn status(&self) -> SupervisorStatus {
        let slot = lock_or_recover(&self.worker.shared.slot, "supervisor status");
        match &*slot {
            Slot::Empty => SupervisorStatus::Idle,
            Slot::Reserved { label, .. } => SupervisorStatus::Starting {
                label: label.clone(),
            },
            Slot::Active(active) => SupervisorStatus::Running(active.handle.clone()),
        }
    }

    pub fn mode(&self) -> AppMode {
        self.status().mode()
    }

    pub fn active(&self) -> Option<ChildHandle> {
        match self.status() {
            SupervisorStatus::Running(handle) => Some(handle),
            _ => None,
        }
    }

    /// Spawn on the calling thread and start a watcher for the child.
    pub fn launch(&self, request: LaunchRequest) -> Result<ChildHandle, SupervisorError> {
        let generation = self.worker.reserve(&request)?;
        let span = telemetry::child_span(&request.label);
        let (handle, process) =
            span.in_scope(|| self.worker.spawn_reserved(&request, generation))?;
        let watcher = self.worker.clone();
        let watched = handle.clone();
        let spawned = thread::Builder::new()
            .name("arcade-child-wait".to_string())
            .spawn({
                let process = Arc::clone(&process);
                let span = span.clone();
                move || span.in_scope(|| watcher.watch(watched, process))
            });
        if let Err(err) = spawned {
            // Unwatched children would pin the launcher in Running; take this one down now.
            log_debug(&format!("failed to start child watcher: {err}"));
            let _ = process.kill();
            span.in_scope(|| self.worker.watch(handle, process));
            return Err(SupervisorError::Launch(LaunchError::Worker(err)));
        }
        Ok(handle)
    }

    /// Reserve the slot now and spawn + watch on a worker thread, so a slow
    /// spawn never stalls the caller. The outcome arrives as a `SupervisorEvent`.
    pub fn launch_in_background(&self, request: LaunchRequest) -> Result<(), SupervisorError> {
        let generation = self.worker.reserve(&request)?;
        let worker = self.worker.clone();
        let spawned = thread::Builder::new()
            .name("arcade-child".to_string())
            .spawn(move || {
                let _span = telemetry::child_span(&request.label).entered();
                if let Ok((handle, process)) = worker.spawn_reserved(&request, generation) {
                    worker.watch(handle, process);
                }
            });
        if let Err(err) = spawned {
            self.worker.release(generation);
            return Err(SupervisorError::Launch(LaunchError::Worker(err)));
        }
        Ok(())
    }

    /// Send SIGKILL to the child named by `handle`. The slot is cleared by the
    /// watcher once the exit is observed, not here.
    pub fn request_kill(&self, handle: &ChildHandle) -> Result<(), KillError> {
        let slot = lock_or_recover(&self.worker.shared.slot, "supervisor kill");
        match &*slot {
            Slot::Active(active) if active.handle.generation == handle.generation => {
                active.process.kill().map_err(KillError::Os)
            }
            _ => Err(KillError::NotRunning),
        }
    }

    /// Drain queued lifecycle events without blocking.
    pub fn drain_events(&self) -> Vec<SupervisorEvent> {
        self.events_rx.try_iter().collect()
    }
}

impl Worker {
    fn reserve(&self, request: &LaunchRequest) -> Result<u64, SupervisorError> {
        let mut slot = lock_or_recover(&self.shared.slot, "supervisor reserve");
        if !matches!(*slot, Slot::Empty) {
            return Err(SupervisorError::AlreadyRunning);
        }
        let generation = self.shared.next_generation.fetch_add(1, Ordering::Relaxed);
        *slot = Slot::Reserved {
            generation,
            label: request.label.clone(),
        };
        Ok(generation)
    }

    fn release(&self, generation: u64) {
        let mut slot = lock_or_recover(&self.shared.slot, "supervisor release");
        if matches!(&*slot, Slot::Reserved { generation: g, .. } if *g == generation) {
            *slot = Slot::Empty;
        }
    }

    fn spawn_reserved(
        &self,
        request: &LaunchRequest,
        generation: u64,
    ) -> Result<(ChildHandle, Arc<dyn ChildProcess>), LaunchError> {
        let process = match self.spawner.spawn(request) {
            Ok(process) => process,
            Err(source) => {
                self.release(generation);
                let error = LaunchError::Spawn {
                    program: request.program.clone(),
                    source,
                };
                self.emit(SupervisorEvent::LaunchFailed {
                    label: request.label.clone(),
                    message: error.to_string(),
                });
                return Err(error);
            }
        };

        let handle = ChildHandle {
            pid: process.id(),
            label: request.label.clone(),
            started_at: Instant::now(),
            generation,
        };
        {
            let mut slot = lock_or_recover(&self.shared.slot, "supervisor install");
            *slot = Slot::Active(ActiveChild {
                handle: handle.clone(),
                process: Arc::clone(&process),
            });
        }
        self.emit(SupervisorEvent::Started(handle.clone()));
        Ok((handle, process))
    }

    /// Block until the child exits, then reap it and clear the slot.
    fn watch(&self, handle: ChildHandle, process: Arc<dyn ChildProcess>) {
        let waited = process.wait_for_exit();
        let outcome = {
            let mut slot = lock_or_recover(&self.shared.slot, "supervisor clear");
            let outcome = waited.and_then(|()| process.reap());
            if matches!(&*slot, Slot::Active(active) if active.handle.generation == handle.generation)
            {
                *slot = Slot::Empty;
            }
            outcome
        };

        self.emit(match outcome {
            Ok(status) => SupervisorEvent::Exited { handle, status },
            Err(error) => SupervisorEvent::WaitFailed { handle, error },
        });
    }

    /// Trace the event here, then queue it for the controller, which owns the debug log.
    fn emit(&self, event: SupervisorEvent) {
        telemetry::record_lifecycle(&event);
        match self.events_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                log_debug(&format!("supervisor event queue full; dropping {event:?}"));
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}
