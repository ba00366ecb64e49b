//! Error types for tt_pack operations.
//!
//! Packer-internal failures live in [`crate::pack::PackError`]; this module
//! defines what the dispatcher and the command line report.

use crate::pack::{PackError, PackErrorKind};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tt_pack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tt_pack operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Packaging errors
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The requested format has no packer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Incorrect type of package: '{format}' (supported: tgz, rpm, deb)")]
pub struct UnsupportedFormatError {
    /// Format identifier as given
    pub format: String,
}

impl UnsupportedFormatError {
    /// Creates the error for `format`.
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

/// Failure of a dispatched packaging operation.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No packer is registered for the format
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),

    /// The packer failed; the cause is preserved
    #[error("Failed to pack: {0}")]
    Pack(#[source] PackError),
}

impl DispatchError {
    /// Underlying packer error, if the packer ran and failed.
    pub fn pack_error(&self) -> Option<&PackError> {
        match self {
            DispatchError::Pack(e) => Some(e),
            DispatchError::UnsupportedFormat(_) => None,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested configuration file is missing
    #[error("Configuration file {path} not found")]
    NotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for this tool
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        /// Path to the configuration file
        path: PathBuf,
        /// Parsing error
        #[source]
        source: toml::de::Error,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Incorrect combination of command parameters: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// The pack task could not be joined
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl Error {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            Error::Dispatch(DispatchError::UnsupportedFormat(_)) => vec![
                "Use one of the supported package types: tgz, rpm, deb".to_string(),
            ],
            Error::Dispatch(DispatchError::Pack(e)) => match e.kind() {
                PackErrorKind::MissingDependency => vec![
                    "Check that every path passed to --preinst, --postinst and --deps-file exists"
                        .to_string(),
                    "Install tarantool and tt, or pass --without-binaries".to_string(),
                ],
                PackErrorKind::WriteFailure => vec![
                    "Check free disk space and write permissions of the output directory"
                        .to_string(),
                ],
                PackErrorKind::InvalidDependency => vec![
                    "Write dependencies as 'name' or 'name OP version', e.g. 'tarantool >= 2.10'"
                        .to_string(),
                ],
                _ => Vec::new(),
            },
            Error::Config(ConfigError::Parse { .. }) => vec![
                "Fix the syntax of the configuration file or pass another one with --cfg"
                    .to_string(),
            ],
            _ => Vec::new(),
        }
    }
}
