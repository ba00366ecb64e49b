//! The common packer contract.

use crate::config::PackConfig;
use crate::pack::{
    error::Result,
    request::{PackRequest, PackageFormat},
};
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

/// Locations a packer reads from and writes to.
///
/// Derived from the resolved configuration; packers never look at global
/// state.
#[derive(Debug, Clone)]
pub struct PackContext {
    env_dir: PathBuf,
    instances_dir: PathBuf,
    bin_dir: PathBuf,
    output_dir: PathBuf,
    config_file: Option<PathBuf>,
    search_path: Option<OsString>,
}

impl PackContext {
    /// Creates a context rooted at `env_dir` with the conventional layout.
    pub fn new(env_dir: impl Into<PathBuf>) -> Self {
        let env_dir = env_dir.into();
        Self {
            instances_dir: env_dir.join("instances.enabled"),
            bin_dir: env_dir.join("bin"),
            output_dir: env_dir.clone(),
            config_file: None,
            search_path: None,
            env_dir,
        }
    }

    /// Builds a context from a loaded configuration.
    pub fn from_config(config: &PackConfig) -> Self {
        Self {
            env_dir: config.env_dir().to_path_buf(),
            instances_dir: config.instances_dir(),
            bin_dir: config.bin_dir(),
            output_dir: config.output_dir(),
            config_file: config.source().map(Path::to_path_buf),
            search_path: None,
        }
    }

    /// Overrides where artifacts are written.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Sets the environment configuration file copied into bundles.
    pub fn with_config_file(mut self, config_file: impl Into<PathBuf>) -> Self {
        self.config_file = Some(config_file.into());
        self
    }

    /// Replaces `PATH` as the fallback search list for runtime binaries.
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// Environment root directory.
    pub fn env_dir(&self) -> &Path {
        &self.env_dir
    }

    /// Directory holding the applications.
    pub fn instances_dir(&self) -> &Path {
        &self.instances_dir
    }

    /// Directory searched first for tarantool and tt binaries.
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Directory the artifact is written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Environment configuration file, if any.
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Search list used after `bin_dir`; `None` means the process `PATH`.
    pub fn search_path(&self) -> Option<&OsStr> {
        self.search_path.as_deref()
    }
}

/// Builds one bundle format.
///
/// Implementations hold no state between runs. `run` receives a request
/// that already passed [`FormatValidator`](crate::pack::FormatValidator);
/// it checks only format-internal correctness, such as referenced scripts
/// existing. On success exactly one artifact exists at the returned path;
/// on failure no artifact is left behind.
pub trait Packer: Send + Sync {
    /// Format this packer produces.
    fn format(&self) -> PackageFormat;

    /// Assembles the bundle and returns the artifact path.
    fn run(&self, ctx: &PackContext, request: &PackRequest) -> Result<PathBuf>;
}
