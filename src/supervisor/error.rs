use std::fmt;
use std::io;
use std::path::PathBuf;

/// A child could not be started.
#[derive(Debug)]
pub enum LaunchError {
    /// The OS refused to spawn the executable (missing, not executable, out of resources).
    Spawn { program: PathBuf, source: io::Error },
    /// No background thread could be started to run or watch the child.
    Worker(io::Error),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::Spawn { program, source } => {
                write!(f, "failed to spawn {}: {source}", program.display())
            }
            LaunchError::Worker(err) => write!(f, "failed to start launch worker: {err}"),
        }
    }
}

impl std::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LaunchError::Spawn { source, .. } => Some(source),
            LaunchError::Worker(err) => Some(err),
        }
    }
}

/// Errors surfaced synchronously by `ProcessSupervisor::launch*`.
#[derive(Debug)]
pub enum SupervisorError {
    /// A child is already installed (or being spawned); the existing one is untouched.
    AlreadyRunning,
    Launch(LaunchError),
}

impl fmt::Display for SupervisorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorError::AlreadyRunning => write!(f, "a game is already running"),
            SupervisorError::Launch(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SupervisorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SupervisorError::AlreadyRunning => None,
            SupervisorError::Launch(err) => Some(err),
        }
    }
}

impl From<LaunchError> for SupervisorError {
    fn from(err: LaunchError) -> Self {
        SupervisorError::Launch(err)
    }
}

/// A termination request could not be delivered.
#[derive(Debug)]
pub enum KillError {
    /// The handle no longer names the installed child (it exited or was replaced).
    NotRunning,
    /// The OS rejected the signal.
    Os(io::Error),
}

impl fmt::Display for KillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KillError::NotRunning => write!(f, "process is no longer running"),
            KillError::Os(err) => write!(f, "kill failed: {err}"),
        }
    }
}

impl std::error::Error for KillError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KillError::NotRunning => None,
            KillError::Os(err) => Some(err),
        }
    }
}
