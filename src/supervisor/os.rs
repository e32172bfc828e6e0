//! OS-backed process spawning, waiting and signalling.

use std::io;
use std::mem;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;

/// What to start: the executable plus where to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub program: PathBuf,
    pub working_dir: Option<PathBuf>,
    pub label: String,
}

impl LaunchRequest {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let label = program.display().to_string();
        Self {
            program,
            working_dir: None,
            label,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Starts child processes.
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, request: &LaunchRequest) -> io::Result<Arc<dyn ChildProcess>>;
}

/// A started child. Waiting is split in two so the exit can be observed
/// before the pid is released back to the OS.
pub trait ChildProcess: Send + Sync {
    fn id(&self) -> u32;
    /// Block until the child has exited, leaving it unreaped.
    fn wait_for_exit(&self) -> io::Result<()>;
    /// Collect the exit status and release the pid.
    fn reap(&self) -> io::Result<ExitStatus>;
    /// Forcefully terminate the child.
    fn kill(&self) -> io::Result<()>;
}

/// Spawns real executables with std streams detached.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSpawner;

impl ProcessSpawner for OsSpawner {
    fn spawn(&self, request: &LaunchRequest) -> io::Result<Arc<dyn ChildProcess>> {
        let mut cmd = Command::new(&request.program);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = request.working_dir.as_ref().filter(|dir| dir.is_dir()) {
            cmd.current_dir(dir);
        }
        let child = cmd.spawn()?;
        // `Child` never reaps on drop; from here on the pid is managed via libc.
        let pid = child.id();
        drop(child);
        Ok(Arc::new(OsChild {
            pid: pid as libc::pid_t,
        }))
    }
}

struct OsChild {
    pid: libc::pid_t,
}

impl ChildProcess for OsChild {
    fn id(&self) -> u32 {
        self.pid as u32
    }

    fn wait_for_exit(&self) -> io::Result<()> {
        loop {
            // SAFETY: siginfo_t is a plain C struct; zeroed is a valid baseline for waitid.
            let mut info: libc::siginfo_t = unsafe { mem::zeroed() };
            // SAFETY: pid is our own child; WNOWAIT only observes the exit and leaves it reapable.
            let ret = unsafe {
                libc::waitid(
                    libc::P_PID,
                    self.pid as libc::id_t,
                    &mut info,
                    libc::WEXITED | libc::WNOWAIT,
                )
            };
            if ret == 0 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn reap(&self) -> io::Result<ExitStatus> {
        loop {
            let mut status = 0;
            // SAFETY: pid is our own child; status points at a stack local.
            let ret = unsafe { libc::waitpid(self.pid, &mut status, 0) };
            if ret == self.pid {
                return Ok(ExitStatus::from_raw(status));
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn kill(&self) -> io::Result<()> {
        // SAFETY: signalling a pid we own and have not reaped yet.
        if unsafe { libc::kill(self.pid, libc::SIGKILL) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
