//! Environment configuration.
//!
//! Loaded from `tt.toml`:
//!
//! ```toml
//! [env]
//! instances_enabled = "instances.enabled"
//! bin_dir = "bin"
//!
//! [pack]
//! output_dir = "."
//! default_version = "0.1.0"
//! ```
//!
//! Relative paths resolve against the directory holding the file. Without
//! a file, the current directory is the environment root.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Conventional configuration file name.
pub const CONFIG_FILE_NAME: &str = "tt.toml";

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "TT_CLI_CFG";

const DEFAULT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    env: RawEnv,
    pack: RawPack,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawEnv {
    instances_enabled: PathBuf,
    bin_dir: PathBuf,
}

impl Default for RawEnv {
    fn default() -> Self {
        Self {
            instances_enabled: PathBuf::from("instances.enabled"),
            bin_dir: PathBuf::from("bin"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawPack {
    output_dir: PathBuf,
    default_version: String,
}

impl Default for RawPack {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            default_version: DEFAULT_VERSION.to_string(),
        }
    }
}

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct PackConfig {
    env_dir: PathBuf,
    source: Option<PathBuf>,
    raw: RawConfig,
}

impl PackConfig {
    /// Defaults rooted at `env_dir`, with no backing file.
    pub fn defaults(env_dir: impl Into<PathBuf>) -> Self {
        Self {
            env_dir: env_dir.into(),
            source: None,
            raw: RawConfig::default(),
        }
    }

    /// Loads configuration.
    ///
    /// An explicit `path` must exist. Otherwise `tt.toml` in `cwd` is used
    /// when present, and defaults rooted at `cwd` when not.
    pub fn load(path: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    cwd.join(path)
                };
                if !path.is_file() {
                    return Err(ConfigError::NotFound { path });
                }
                path
            }
            None => {
                let candidate = cwd.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    log::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, cwd.display());
                    return Ok(Self::defaults(cwd));
                }
                candidate
            }
        };

        log::debug!("Config path is located here: {}", path.display());
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        let env_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf());
        Ok(Self {
            env_dir,
            source: Some(path),
            raw,
        })
    }

    /// Environment root directory.
    pub fn env_dir(&self) -> &Path {
        &self.env_dir
    }

    /// Configuration file this was loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Application tree root.
    pub fn instances_dir(&self) -> PathBuf {
        self.resolve(&self.raw.env.instances_enabled)
    }

    /// Directory searched first for runtime binaries.
    pub fn bin_dir(&self) -> PathBuf {
        self.resolve(&self.raw.env.bin_dir)
    }

    /// Directory artifacts are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.raw.pack.output_dir)
    }

    /// Version used when none is given.
    pub fn default_version(&self) -> &str {
        &self.raw.pack.default_version
    }

    /// Package name used when none is given: the environment directory name.
    pub fn default_name(&self) -> String {
        self.env_dir
            .canonicalize()
            .unwrap_or_else(|_| self.env_dir.clone())
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "package".to_string())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if path == Path::new(".") {
            self.env_dir.clone()
        } else {
            self.env_dir.join(path)
        }
    }
}
