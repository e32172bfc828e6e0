//! Process-wide plumbing shared by the library and the launcher binary.

mod logging;

pub use logging::{crash_log_path, init_logging, log_debug, log_file_path, log_panic};
