use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Overrides `general.log_level` when set.
pub const LOG_ENV: &str = "HOP_LOG";
const LOG_FILE: &str = "hop.log";

fn env_filter(default_level: &str) -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV)
    .or_else(|_| EnvFilter::try_new(default_level))
    .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Sends tracing output to `<dir>/hop.log`; the terminal belongs to the UI.
///
/// Returns `None` when the log file cannot be opened, in which case the
/// session runs without logging. Keep the guard alive until exit so buffered
/// lines get flushed.
pub fn init(dir: &Path, default_level: &str) -> Option<WorkerGuard> {
  std::fs::create_dir_all(dir).ok()?;
  let file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(dir.join(LOG_FILE))
    .ok()?;
  let (writer, guard) = tracing_appender::non_blocking(file);

  tracing_subscriber::fmt()
    .with_env_filter(env_filter(default_level))
    .with_writer(writer)
    .with_ansi(false)
    .with_target(false)
    .try_init()
    .ok()?;
  Some(guard)
}
