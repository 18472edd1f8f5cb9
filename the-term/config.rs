//! `config.toml` loading.

use std::{
  fs,
  io,
  net::SocketAddr,
  path::{
    Path,
    PathBuf,
  },
  time::Duration,
};

use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};
use serde::Deserialize;
use the_commit::ServerConfig;
use the_lib::IdleConfig;
use thiserror::Error;
use url::Url;

pub const APP_DIR: &str = "unsaid";
pub const CONFIG_DIR_ENV: &str = "UNSAID_CONFIG_DIR";
pub const CACHE_DIR_ENV: &str = "UNSAID_CACHE_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file '{}': {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("failed to parse config file '{}': {source}", path.display())]
  Parse {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
  pub client: ClientConfig,
  pub server: ServerSection,
  pub log:    LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ClientConfig {
  pub server_url:            Url,
  pub idle_timeout_ms:       u64,
  pub request_timeout_ms:    u64,
  pub resolve_empty_locally: bool,
}

impl Default for ClientConfig {
  fn default() -> Self {
    let bind = ServerConfig::default().bind;
    let idle = IdleConfig::default();
    Self {
      server_url:            Url::parse(&format!("http://{bind}"))
        .expect("default server url is valid"),
      idle_timeout_ms:       millis(idle.timeout),
      request_timeout_ms:    millis(the_runtime::transport::DEFAULT_REQUEST_TIMEOUT),
      resolve_empty_locally: idle.resolve_empty_locally,
    }
  }
}

fn millis(duration: Duration) -> u64 {
  u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl ClientConfig {
  pub fn idle_config(&self) -> IdleConfig {
    IdleConfig {
      timeout:               Duration::from_millis(self.idle_timeout_ms),
      resolve_empty_locally: self.resolve_empty_locally,
    }
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_millis(self.request_timeout_ms)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ServerSection {
  pub bind: SocketAddr,
}

impl Default for ServerSection {
  fn default() -> Self {
    Self {
      bind: ServerConfig::default().bind,
    }
  }
}

impl ServerSection {
  pub fn server_config(&self) -> ServerConfig {
    ServerConfig { bind: self.bind }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LogConfig {
  /// `EnvFilter` directives, e.g. `info` or `the_runtime=debug`.
  pub level: Option<String>,
  pub file:  Option<PathBuf>,
}

impl Config {
  pub fn parse(path: &Path, source: &str) -> Result<Config, ConfigError> {
    toml::from_str(source).map_err(|source| {
      ConfigError::Parse {
        path: path.to_path_buf(),
        source,
      }
    })
  }

  /// Load `path`, or the default config file when no path is given.
  ///
  /// An explicitly named file must exist; a missing default file just means
  /// defaults.
  pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let (path, required) = match path {
      Some(path) => (path.to_path_buf(), true),
      None => {
        match config_file() {
          Some(path) => (path, false),
          None => return Ok(Config::default()),
        }
      },
    };

    match fs::read_to_string(&path) {
      Ok(source) => Self::parse(&path, &source),
      Err(err) if err.kind() == io::ErrorKind::NotFound && !required => Ok(Config::default()),
      Err(source) => Err(ConfigError::Read { path, source }),
    }
  }
}

fn app_dir(env: &str, base: impl FnOnce() -> Option<PathBuf>) -> Option<PathBuf> {
  if let Some(dir) = std::env::var_os(env) {
    return Some(PathBuf::from(dir));
  }
  let mut path = base()?;
  path.push(APP_DIR);
  Some(path)
}

pub fn config_dir() -> Option<PathBuf> {
  app_dir(CONFIG_DIR_ENV, || {
    choose_base_strategy()
      .ok()
      .map(|strategy| strategy.config_dir())
  })
}

pub fn cache_dir() -> Option<PathBuf> {
  app_dir(CACHE_DIR_ENV, || {
    choose_base_strategy()
      .ok()
      .map(|strategy| strategy.cache_dir())
  })
}

pub fn config_file() -> Option<PathBuf> {
  config_dir().map(|dir| dir.join("config.toml"))
}
