//! In-process stand-ins for spawned children, driven by the test.

use super::{ChildProcess, LaunchRequest, ProcessSpawner};
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

#[derive(Default)]
struct FakeState {
    exit_status: Option<i32>,
    wait_error: bool,
    reaped: bool,
    kills: u32,
}

pub(crate) struct FakeChild {
    pid: u32,
    state: Mutex<FakeState>,
    changed: Condvar,
}

impl FakeChild {
    fn new(pid: u32) -> Self {
        Self {
            pid,
            state: Mutex::new(FakeState::default()),
            changed: Condvar::new(),
        }
    }

    /// Let the child exit normally with `code`.
    pub(crate) fn finish(&self, code: i32) {
        let mut state = self.state.lock().unwrap();
        state.exit_status.get_or_insert(code << 8);
        self.changed.notify_all();
    }

    /// Make the pending wait fail instead of reporting an exit.
    pub(crate) fn fail_wait(&self) {
        let mut state = self.state.lock().unwrap();
        state.wait_error = true;
        self.changed.notify_all();
    }

    pub(crate) fn kills(&self) -> u32 {
        self.state.lock().unwrap().kills
    }

    pub(crate) fn is_reaped(&self) -> bool {
        self.state.lock().unwrap().reaped
    }
}

impl ChildProcess for FakeChild {
    fn id(&self) -> u32 {
        self.pid
    }

    fn wait_for_exit(&self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        while state.exit_status.is_none() && !state.wait_error {
            state = self.changed.wait(state).unwrap();
        }
        if state.wait_error {
            return Err(io::Error::new(io::ErrorKind::Other, "fake wait failure"));
        }
        Ok(())
    }

    fn reap(&self) -> io::Result<ExitStatus> {
        let mut state = self.state.lock().unwrap();
        if state.reaped {
            return Err(io::Error::from_raw_os_error(libc::ECHILD));
        }
        let raw = state
            .exit_status
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ECHILD))?;
        state.reaped = true;
        Ok(ExitStatus::from_raw(raw))
    }

    fn kill(&self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.reaped {
            return Err(io::Error::from_raw_os_error(libc::ESRCH));
        }
        state.kills += 1;
        state.exit_status.get_or_insert(libc::SIGKILL);
        self.changed.notify_all();
        Ok(())
    }
}

/// Spawner that hands out `FakeChild`ren, optionally failing or stalling first.
#[derive(Default)]
pub(crate) struct FakeSpawner {
    next_pid: AtomicU32,
    fail_with: Mutex<Option<io::ErrorKind>>,
    spawn_delay: Mutex<Option<Duration>>,
    children: Mutex<Vec<Arc<FakeChild>>>,
    requests: Mutex<Vec<LaunchRequest>>,
}

impl FakeSpawner {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            next_pid: AtomicU32::new(1000),
            ..Self::default()
        })
    }

    pub(crate) fn fail_next(&self, kind: io::ErrorKind) {
        *self.fail_with.lock().unwrap() = Some(kind);
    }

    pub(crate) fn delay_spawns(&self, delay: Duration) {
        *self.spawn_delay.lock().unwrap() = Some(delay);
    }

    pub(crate) fn child(&self, index: usize) -> Option<Arc<FakeChild>> {
        self.children.lock().unwrap().get(index).cloned()
    }

    pub(crate) fn spawn_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn last_request(&self) -> Option<LaunchRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl ProcessSpawner for FakeSpawner {
    fn spawn(&self, request: &LaunchRequest) -> io::Result<Arc<dyn ChildProcess>> {
        let delay = *self.spawn_delay.lock().unwrap();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        self.requests.lock().unwrap().push(request.clone());
        if let Some(kind) = self.fail_with.lock().unwrap().take() {
            return Err(io::Error::new(kind, "fake spawn failure"));
        }
        let pid = self.next_pid.fetch_add(1, Ordering::Relaxed);
        let child = Arc::new(FakeChild::new(pid));
        self.children.lock().unwrap().push(Arc::clone(&child));
        Ok(child)
    }
}
