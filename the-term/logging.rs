use std::{
  fs::{
    self,
    OpenOptions,
  },
  path::PathBuf,
  sync::Mutex,
};

use anyhow::{
  Context,
  Result,
  anyhow,
};
use tracing_subscriber::EnvFilter;

use crate::config::{
  LogConfig,
  cache_dir,
};

/// Filter directives in this variable win over the config file.
pub const LOG_ENV: &str = "UNSAID_LOG";
const DEFAULT_FILTER: &str = "info";

pub enum LogTarget {
  Stderr,
  /// Used while the terminal is in raw mode and stderr would corrupt the
  /// screen.
  File(PathBuf),
}

pub fn default_log_file() -> PathBuf {
  cache_dir()
    .unwrap_or_else(std::env::temp_dir)
    .join("unsaid.log")
}

pub fn init(target: LogTarget, config: &LogConfig) -> Result<()> {
  let filter = match EnvFilter::try_from_env(LOG_ENV) {
    Ok(filter) => filter,
    Err(_) => {
      let directives = config.level.as_deref().unwrap_or(DEFAULT_FILTER);
      EnvFilter::try_new(directives)
        .with_context(|| format!("invalid log level '{directives}'"))?
    },
  };
  let builder = tracing_subscriber::fmt().with_env_filter(filter);

  let installed = match target {
    LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
    LogTarget::File(path) => {
      if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
          .with_context(|| format!("failed to create log directory '{}'", parent.display()))?;
      }
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file '{}'", path.display()))?;
      builder
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
    },
  };
  installed.map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
