//! File logging for an unattended cabinet: a size-capped debug log that keeps
//! one rotated generation, and a crash log written from the panic hook.
//!
//! Debug lines carry the time since startup and the writing thread, because
//! child lifecycle messages originate on supervisor worker threads.

use crate::config::LauncherConfig;
use std::{
    env,
    ffi::OsString,
    fs::{self, File, OpenOptions},
    io::{self, Write},
    panic,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, OnceLock,
    },
    thread,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

const DEBUG_LOG_CAP: u64 = 5 * 1024 * 1024;
const CRASH_LOG_CAP: u64 = 256 * 1024;

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(false);
static DEBUG_LOG: Mutex<Option<CappedLog>> = Mutex::new(None);
static STARTED_AT: OnceLock<Instant> = OnceLock::new();

pub fn log_file_path() -> PathBuf {
    env::temp_dir().join("arcade_launcher.log")
}

pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("arcade_launcher_crash.log")
}

/// `<path>.1`, where the previous generation of a capped log lives.
fn rotated_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".1");
    PathBuf::from(name)
}

/// Append-only file that moves itself aside to `<path>.1` before exceeding `cap`.
struct CappedLog {
    path: PathBuf,
    file: File,
    cap: u64,
    len: u64,
}

impl CappedLog {
    fn open(path: PathBuf, cap: u64) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let len = file.metadata()?.len();
        let mut log = Self {
            path,
            file,
            cap,
            len,
        };
        if log.len >= cap {
            log.roll()?;
        }
        Ok(log)
    }

    fn roll(&mut self) -> io::Result<()> {
        fs::rename(&self.path, rotated_path(&self.path))?;
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.len = 0;
        Ok(())
    }

    fn append(&mut self, line: &str) {
        let next = line.len() as u64;
        if self.len > 0 && self.len.saturating_add(next) > self.cap && self.roll().is_err() {
            return;
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.len = self.len.saturating_add(next);
        }
    }
}

fn format_line(msg: &str, since_start: Duration, thread_name: Option<&str>) -> String {
    format!(
        "[+{}ms {}] {msg}\n",
        since_start.as_millis(),
        thread_name.unwrap_or("unnamed")
    )
}

/// Enable or disable file logging from the CLI flags, then set up tracing.
pub fn init_logging(config: &LauncherConfig) {
    STARTED_AT.get_or_init(Instant::now);
    let enabled = config.logging_enabled();
    LOGGING_ENABLED.store(enabled, Ordering::Relaxed);
    let log = if enabled {
        CappedLog::open(log_file_path(), DEBUG_LOG_CAP).ok()
    } else {
        None
    };
    *DEBUG_LOG.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = log;

    crate::telemetry::init_tracing(config);
}

/// Append a line to the debug log; a no-op unless logging was enabled.
pub fn log_debug(msg: &str) {
    if !LOGGING_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let since_start = STARTED_AT.get_or_init(Instant::now).elapsed();
    let line = format_line(msg, since_start, thread::current().name());
    let mut log = DEBUG_LOG.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(log) = log.as_mut() {
        log.append(&line);
    }
}

/// Record a panic in the crash log. Called from the terminal panic hook.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    if !LOGGING_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let payload = info
        .payload()
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    let line = format!(
        "[{timestamp}] panic in {} at {location}: {payload} (v{})\n",
        thread::current().name().unwrap_or("unnamed"),
        env!("CARGO_PKG_VERSION")
    );
    if let Ok(mut log) = CappedLog::open(crash_log_path(), CRASH_LOG_CAP) {
        log.append(&line);
    }
}

#[cfg(test)]
pub(crate) fn set_logging_for_tests(enabled: bool) {
    LOGGING_ENABLED.store(enabled, Ordering::Relaxed);
    let log = if enabled {
        CappedLog::open(log_file_path(), DEBUG_LOG_CAP).ok()
    } else {
        None
    };
    *DEBUG_LOG.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = log;
}
