use arcade_launcher::supervisor::{
    AppMode, ChildHandle, KillError, LaunchError, LaunchRequest, ProcessSupervisor,
    SupervisorError, SupervisorEvent,
};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

fn scratch_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = env::temp_dir().join(format!(
        "arcade_supervisor_{tag}_{}_{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("game.sh");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// Parallel tests fork while other scripts are being written; retry the
/// resulting ETXTBSY instead of failing.
fn launch(supervisor: &ProcessSupervisor, request: LaunchRequest) -> ChildHandle {
    for _ in 0..50 {
        match supervisor.launch(request.clone()) {
            Ok(handle) => return handle,
            Err(SupervisorError::Launch(LaunchError::Spawn { source, .. }))
                if source.raw_os_error() == Some(libc::ETXTBSY) =>
            {
                thread::sleep(Duration::from_millis(20));
            }
            Err(err) => panic!("launch failed: {err}"),
        }
    }
    panic!("executable stayed busy");
}

fn wait_for_exit(supervisor: &ProcessSupervisor) -> ExitStatus {
    let start = Instant::now();
    while start.elapsed() < SETTLE_TIMEOUT {
        for event in supervisor.drain_events() {
            if let SupervisorEvent::Exited { status, .. } = event {
                assert_eq!(supervisor.mode(), AppMode::Browsing);
                return status;
            }
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("child did not exit in time");
}

#[test]
fn exit_code_is_reported_and_mode_restored() {
    let dir = scratch_dir("exit");
    let script = write_script(&dir, "exit 3");
    let supervisor = ProcessSupervisor::new();

    launch(&supervisor, LaunchRequest::new(&script).with_label("quitter"));
    let status = wait_for_exit(&supervisor);
    assert_eq!(status.code(), Some(3));
    assert_eq!(supervisor.mode(), AppMode::Browsing);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn kill_stops_long_running_child() {
    let dir = scratch_dir("kill");
    let script = write_script(&dir, "exec sleep 30");
    let supervisor = ProcessSupervisor::new();

    let handle = launch(&supervisor, LaunchRequest::new(&script));
    assert_eq!(supervisor.mode(), AppMode::Running);
    supervisor.request_kill(&handle).expect("kill running child");

    let status = wait_for_exit(&supervisor);
    assert_eq!(status.signal(), Some(libc::SIGKILL));
    assert!(handle.uptime() < Duration::from_secs(30));

    // The child is gone; further kills are refused without side effects.
    assert!(matches!(
        supervisor.request_kill(&handle),
        Err(KillError::NotRunning)
    ));
    assert!(matches!(
        supervisor.request_kill(&handle),
        Err(KillError::NotRunning)
    ));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_executable_is_a_launch_error() {
    let supervisor = ProcessSupervisor::new();
    let err = supervisor
        .launch(LaunchRequest::new("/nonexistent/arcade/game"))
        .unwrap_err();
    match err {
        SupervisorError::Launch(LaunchError::Spawn { source, .. }) => {
            assert_eq!(source.kind(), ErrorKind::NotFound);
        }
        other => panic!("expected spawn error, got {other:?}"),
    }
    assert_eq!(supervisor.mode(), AppMode::Browsing);
}

#[test]
fn child_runs_in_its_game_directory() {
    let dir = scratch_dir("cwd");
    let script = write_script(&dir, "pwd > cwd.txt");
    let supervisor = ProcessSupervisor::new();

    launch(
        &supervisor,
        LaunchRequest::new(&script).with_working_dir(&dir),
    );
    let status = wait_for_exit(&supervisor);
    assert!(status.success());

    let reported = fs::read_to_string(dir.join("cwd.txt")).expect("script wrote cwd");
    let reported = fs::canonicalize(reported.trim()).expect("canonical cwd");
    assert_eq!(reported, fs::canonicalize(&dir).expect("canonical dir"));
    let _ = fs::remove_dir_all(&dir);
}
