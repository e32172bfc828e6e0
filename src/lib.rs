//! Kiosk arcade launcher: browse a catalog of games with a controller and
//! hand the machine over to the chosen one until it exits or is killed.

pub mod app;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod input;
mod lock;
pub mod selection;
pub mod supervisor;
mod telemetry;
pub mod terminal_restore;
pub mod ui;

pub use app::{crash_log_path, init_logging, log_debug, log_file_path, log_panic};
pub use catalog::{load_catalog, Catalog, CatalogEntry, EmptyCatalogError};
pub use config::{ControlSettings, LauncherConfig};
pub use controller::{AppController, LauncherSnapshot};
pub use supervisor::{AppMode, ProcessSupervisor};
