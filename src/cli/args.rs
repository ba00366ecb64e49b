//! Command line argument parsing.
//!
//! `tt_pack TYPE [flags]`: exactly one positional package type, plus the
//! flag surface shared by all formats. Turning the raw flags into a
//! [`PackRequest`] happens in [`Args::to_request`].

use crate::config::{CONFIG_ENV_VAR, PackConfig};
use crate::error::UnsupportedFormatError;
use crate::pack::{ArchiveOptions, BinariesMode, PackRequest, PackageFormat, RpmDebOptions};
use clap::Parser;
use std::path::PathBuf;

/// Packs application into a distributable bundle
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tt_pack",
    about = "Packs application into a distributable bundle",
    long_about = "Packs a Tarantool environment into a distributable bundle.

Usage:
  tt_pack tgz
  tt_pack rpm --name myapp --version 1.0 --deps 'tarantool >= 2.10'
  tt_pack deb --without-binaries --preinst ./preinst.sh",
    disable_version_flag = true
)]
pub struct Args {
    /// Package type: tgz, rpm or deb
    #[arg(index = 1, value_name = "TYPE")]
    pub package_type: String,

    /// Path to the configuration file
    #[arg(long, value_name = "PATH", env = CONFIG_ENV_VAR)]
    pub cfg: Option<PathBuf>,

    /// Package name
    #[arg(long)]
    pub name: Option<String>,

    /// Package version
    #[arg(long)]
    pub version: Option<String>,

    /// List of applications for packaging
    #[arg(long = "app-list", value_delimiter = ',', value_name = "APPS")]
    pub app_list: Vec<String>,

    /// Explicitly set filename of the bundle
    #[arg(long = "filename", value_name = "FILE")]
    pub file_name: Option<String>,

    /// Include tarantool and tt binaries to the result package
    #[arg(long)]
    pub with_binaries: bool,

    /// Don't include tarantool and tt binaries to the result package
    #[arg(long)]
    pub without_binaries: bool,

    /// Pack all included artifacts
    #[arg(long)]
    pub all: bool,

    /// preinst file path. Only for RPM and Deb packing.
    #[arg(long, value_name = "PATH")]
    pub preinst: Option<PathBuf>,

    /// postinst file path. Only for RPM and Deb packing.
    #[arg(long, value_name = "PATH")]
    pub postinst: Option<PathBuf>,

    /// Path to the file that contains dependencies for the RPM and DEB packages
    #[arg(long = "deps-file", value_name = "PATH")]
    pub deps_file: Option<PathBuf>,

    /// Dependencies for the RPM and DEB packages
    #[arg(long, value_delimiter = ',', value_name = "DEPS")]
    pub deps: Vec<String>,

    /// Add tarantool and tt as dependencies to the result package
    #[arg(long)]
    pub with_tarantool_deps: bool,

    /// Print errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments, leaving error reporting to the caller.
    pub fn parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Builds the request, filling defaults from `config`.
    pub fn to_request(&self, config: &PackConfig) -> Result<PackRequest, UnsupportedFormatError> {
        let format: PackageFormat = self.package_type.parse()?;

        let name = self.name.clone().unwrap_or_else(|| config.default_name());
        let version = self
            .version
            .clone()
            .unwrap_or_else(|| config.default_version().to_string());

        Ok(PackRequest {
            format,
            name,
            version,
            app_list: self.app_list.clone(),
            file_name: self.file_name.clone().filter(|name| !name.is_empty()),
            include_binaries: BinariesMode::resolve(self.with_binaries, self.without_binaries),
            archive_options: ArchiveOptions {
                include_all: self.all,
            },
            rpm_deb_options: RpmDebOptions {
                pre_inst_script_path: non_empty(&self.preinst),
                post_inst_script_path: non_empty(&self.postinst),
                dependencies_file_path: non_empty(&self.deps_file),
                explicit_dependencies: self.deps.clone(),
                with_tool_dependencies: self.with_tarantool_deps,
            },
        })
    }
}

/// An empty path argument counts as not given.
fn non_empty(path: &Option<PathBuf>) -> Option<PathBuf> {
    path.clone().filter(|p| !p.as_os_str().is_empty())
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.quiet),
        }
    }
}
