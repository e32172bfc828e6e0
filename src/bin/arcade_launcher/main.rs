//! Arcade launcher entrypoint: load the catalog, then run the fixed-rate
//! control loop until the operator quits from the browsing screen.

use anyhow::{Context, Result};
use arcade_launcher::input::{InputSource, KeyboardInput};
use arcade_launcher::terminal_restore::TerminalRestoreGuard;
use arcade_launcher::ui::{self, FocusAnimator};
use arcade_launcher::{
    init_logging, load_catalog, log_debug, log_file_path, AppController, AppMode, LauncherConfig,
    ProcessSupervisor,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let config = LauncherConfig::parse_args()?;
    init_logging(&config);
    log_debug("=== Arcade Launcher Started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let entries = load_catalog(&config.games_root, &config.meta_file)
        .with_context(|| format!("failed to load games from {}", config.games_root.display()))?;
    log_debug(&format!("loaded {} game(s)", entries.len()));
    let mut controller =
        AppController::new(entries, config.control_settings(), ProcessSupervisor::new())
            .with_context(|| format!("no games found under {}", config.games_root.display()))?;

    if config.list_games {
        for (index, entry) in controller.catalog().entries().iter().enumerate() {
            println!(
                "{index}: {} -> {}",
                entry.caption(),
                entry.executable_path.display()
            );
        }
        return Ok(());
    }

    let terminal_guard = TerminalRestoreGuard::new();
    terminal_guard.enable_raw_mode()?;
    let mut stdout = io::stdout();
    terminal_guard.enter_alt_screen(&mut stdout)?;
    let release_events = terminal_guard.enable_key_releases(&mut stdout);
    log_debug(&format!("key release events: {release_events}"));

    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout)).context("failed to set up terminal")?;
    let mut input = KeyboardInput::new(
        (config.kill_key_a, config.kill_key_b),
        release_events,
        config.hold_release(),
    );
    let mut animator = FocusAnimator::new(controller.catalog().len(), controller.selected_index());

    let result = run_loop(
        &mut terminal,
        &mut controller,
        &mut input,
        &mut animator,
        config.tick_interval(),
        config.log_timings,
    );

    // Only finds a game still up when the loop itself failed.
    controller.shutdown();
    terminal_guard.restore();
    log_debug("=== Arcade Launcher Exiting ===");
    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    controller: &mut AppController,
    input: &mut impl InputSource,
    animator: &mut FocusAnimator,
    tick: Duration,
    log_timings: bool,
) -> Result<()> {
    loop {
        let started = Instant::now();
        let frame = input.poll()?;
        if frame.quit && controller.mode() == AppMode::Browsing {
            log_debug("quit requested");
            return Ok(());
        }

        let snapshot = controller.tick(&frame);
        if snapshot.mode == AppMode::Browsing {
            animator.step(snapshot.selected);
        }
        terminal
            .draw(|f| ui::draw(f, &snapshot, controller.catalog(), animator))
            .context("failed to draw frame")?;

        let elapsed = started.elapsed();
        match tick.checked_sub(elapsed) {
            Some(remaining) => thread::sleep(remaining),
            None if log_timings => {
                log_debug(&format!(
                    "timing|phase=tick_overrun|elapsed_ms={}|budget_ms={}",
                    elapsed.as_millis(),
                    tick.as_millis()
                ));
            }
            None => {}
        }
    }
}
