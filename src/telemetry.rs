//! Structured trace of the launcher: one JSON line per child lifecycle step.
//!
//! Events from the supervisor's worker threads run inside a `child` span that
//! carries the game label (and pid once known), so the trace can be grouped
//! per launch without parsing messages.

use crate::config::LauncherConfig;
use crate::supervisor::SupervisorEvent;
use std::env;
use std::fs::OpenOptions;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

pub(crate) fn tracing_log_path() -> PathBuf {
    env::var("ARCADE_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("arcade_launcher_trace.jsonl"))
}

/// Install the JSON subscriber once and record the control settings in effect.
pub(crate) fn init_tracing(config: &LauncherConfig) {
    if !config.logging_enabled() {
        return;
    }

    TRACING_INIT.get_or_init(|| {
        let Ok(file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(tracing_log_path())
        else {
            return;
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(file)
            .with_target(false)
            .with_current_span(true)
            .with_span_list(false)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            return;
        }
        tracing::info!(
            games_root = %config.games_root.display(),
            tick_ms = config.tick_ms,
            navigation_timeout = config.navigation_timeout,
            kill_hold_ticks = config.kill_hold_ticks,
            "launcher started"
        );
    });
}

/// Span wrapping everything a worker thread does for one launch.
pub(crate) fn child_span(label: &str) -> tracing::Span {
    tracing::info_span!("child", label = %label, pid = tracing::field::Empty)
}

/// Exit code and terminating signal; exactly one is set for a reaped child.
pub(crate) fn exit_fields(status: &ExitStatus) -> (Option<i32>, Option<i32>) {
    (status.code(), status.signal())
}

pub(crate) fn record_lifecycle(event: &SupervisorEvent) {
    match event {
        SupervisorEvent::Started(handle) => {
            tracing::Span::current().record("pid", handle.pid);
            tracing::info!(pid = handle.pid, "child started");
        }
        SupervisorEvent::LaunchFailed { message, .. } => {
            tracing::warn!(error = %message, "child launch failed");
        }
        SupervisorEvent::Exited { handle, status } => {
            let (code, signal) = exit_fields(status);
            tracing::info!(
                pid = handle.pid,
                code,
                signal,
                uptime_ms = handle.uptime().as_millis() as u64,
                "child exited"
            );
        }
        SupervisorEvent::WaitFailed { handle, error } => {
            tracing::warn!(
                pid = handle.pid,
                error = %error,
                uptime_ms = handle.uptime().as_millis() as u64,
                "child wait failed; slot cleared"
            );
        }
    }
}
