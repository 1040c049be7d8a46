//! User configuration: config directory discovery and `config.yaml` loading.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Container engine used when the configuration does not name one.
pub const DEFAULT_CONTAINER_ENGINE: &str = "docker";

/// On-disk shape of `config.yaml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    install_path: Option<String>,
    #[serde(default)]
    container_engine: Option<String>,
}

/// What: Effective configuration after file and environment overrides.
///
/// Details:
/// - `install_path_is_default` tells callers the path was not chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding installed package files.
    pub install_path: PathBuf,
    /// Whether `install_path` is the built-in default.
    pub install_path_is_default: bool,
    /// Container engine binary used to inspect images.
    pub container_engine: String,
}

/// What: Error raised when `config.yaml` exists but cannot be used.
#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read.
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// File is not valid configuration YAML.
    Yaml {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: serde_norway::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read configuration {}: {source}", path.display())
            }
            Self::Yaml { path, source } => {
                write!(f, "invalid configuration in {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Yaml { source, .. } => Some(source),
        }
    }
}

/// Home directory from `HOME`, falling back to `USERPROFILE`.
fn home() -> PathBuf {
    env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .or_else(|| env::var_os("USERPROFILE"))
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
}

/// What: Candidate config directories in priority order.
///
/// Output:
/// - `$HOME/.hoist`, then `$XDG_CONFIG_HOME/hoist`, then each `$XDG_CONFIG_DIRS` entry.
///
/// Details:
/// - `XDG_CONFIG_HOME` defaults to `$HOME/.config`, `XDG_CONFIG_DIRS` to `/etc/xdg`.
fn candidate_dirs() -> Vec<PathBuf> {
    let home = home();
    let mut dirs = vec![home.join(".hoist")];
    let config_home = env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map_or_else(|| home.join(".config"), PathBuf::from);
    dirs.push(config_home.join("hoist"));
    let config_dirs = env::var_os("XDG_CONFIG_DIRS")
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "/etc/xdg".into());
    dirs.extend(env::split_paths(&config_dirs).map(|d| d.join("hoist")));
    dirs
}

/// What: Resolve the configuration directory.
///
/// Output:
/// - `$HOIST_CONFIG_DIR` when set; else the first candidate holding a `config.yaml`;
///   else `$HOME/.hoist`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(dir) = env::var_os("HOIST_CONFIG_DIR").filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    candidate_dirs()
        .into_iter()
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .unwrap_or_else(|| home().join(".hoist"))
}

/// Path of `config.yaml` in the resolved config directory.
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Logs directory under the config directory (ensured to exist).
#[must_use]
pub fn logs_dir() -> PathBuf {
    let dir = config_dir().join("logs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Built-in install directory for this platform.
fn default_install_dir() -> PathBuf {
    if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
        PathBuf::from("/opt/hoist/bin")
    } else {
        PathBuf::from("/usr/local/bin")
    }
}

/// What: Load the effective configuration from the resolved config path.
///
/// Output:
/// - Configuration with environment overrides applied.
///
/// # Errors
/// - Returns `Err(ConfigError)` when the config file exists but is unreadable or invalid
pub fn load() -> Result<Config, ConfigError> {
    load_from(&config_path())
}

/// What: Load configuration from an explicit file.
///
/// Inputs:
/// - `path`: Location of `config.yaml`; a missing file yields defaults.
///
/// Output:
/// - Configuration with `HOIST_INSTALL_PATH` applied on top of the file.
///
/// # Errors
/// - Returns `Err(ConfigError::Io)` when the file exists but cannot be read
/// - Returns `Err(ConfigError::Yaml)` when the file is not valid configuration
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => RawConfig::default(),
        Ok(contents) => serde_norway::from_str(&contents).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => RawConfig::default(),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(resolve(raw, env::var("HOIST_INSTALL_PATH").ok()))
}

/// Apply the environment override and defaults to a parsed file.
fn resolve(raw: RawConfig, install_path_override: Option<String>) -> Config {
    let install_path = install_path_override
        .filter(|p| !p.trim().is_empty())
        .or(raw.install_path)
        .filter(|p| !p.trim().is_empty());
    let config = Config {
        install_path_is_default: install_path.is_none(),
        install_path: install_path.map_or_else(default_install_dir, PathBuf::from),
        container_engine: raw
            .container_engine
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONTAINER_ENGINE.to_string()),
    };
    tracing::debug!(
        install_path = %config.install_path.display(),
        default = config.install_path_is_default,
        engine = %config.container_engine,
        "configuration resolved"
    );
    config
}
