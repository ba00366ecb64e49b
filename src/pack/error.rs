//! Error types raised inside packers.
//!
//! Every failure a packer can hit maps to one identifiable kind:
//!
//! - [`MissingDependencyError`]: a referenced script, dependency list,
//!   application or required runtime binary is absent.
//! - [`WriteFailureError`]: a filesystem operation failed while assembling
//!   the bundle.
//!
//! Both travel inside the [`PackError`] umbrella, which may stack string
//! context on top via the [`Context`] trait without hiding the original
//! kind (see [`PackError::kind`]).
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use tt_pack::pack::{Context, ErrorExt, Result};
//!
//! fn read_script(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .fs_context("reading install script", path)
//!         .context("failed to embed install script")
//! }
//! ```

use std::{
    fmt::{self, Display},
    io,
    path::PathBuf,
};
use thiserror::Error as DeriveError;

/// Errors returned by packers.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum PackError {
    /// A referenced file or required binary is absent.
    #[error(transparent)]
    MissingDependency(#[from] MissingDependencyError),

    /// A filesystem operation failed.
    #[error(transparent)]
    WriteFailure(#[from] WriteFailureError),

    /// A package dependency string could not be parsed.
    #[error("invalid dependency '{spec}': {reason}")]
    InvalidDependency {
        /// The offending dependency string
        spec: String,
        /// Why it was rejected
        reason: String,
    },

    /// Unsupported CPU architecture for the target format.
    #[error("unsupported architecture '{arch}' for {format} packages")]
    UnsupportedArch {
        /// Host architecture name
        arch: String,
        /// Format being produced
        format: &'static str,
    },

    /// RPM package assembly error.
    #[error("{0}")]
    Rpm(#[from] rpm::Error),

    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),
}

/// Identifiable kind of a [`PackError`], with context layers stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackErrorKind {
    /// See [`MissingDependencyError`].
    MissingDependency,
    /// See [`WriteFailureError`].
    WriteFailure,
    /// Malformed dependency declaration.
    InvalidDependency,
    /// Host architecture has no mapping for the format.
    UnsupportedArch,
    /// Failure inside the RPM builder.
    Rpm,
}

impl PackError {
    /// Returns the innermost error, skipping any context layers.
    pub fn root_cause(&self) -> &PackError {
        let mut current = self;
        while let PackError::Context(_, inner) = current {
            current = &**inner;
        }
        current
    }

    /// Returns the kind of the underlying failure.
    pub fn kind(&self) -> PackErrorKind {
        match self.root_cause() {
            PackError::MissingDependency(_) => PackErrorKind::MissingDependency,
            PackError::WriteFailure(_) => PackErrorKind::WriteFailure,
            PackError::InvalidDependency { .. } => PackErrorKind::InvalidDependency,
            PackError::UnsupportedArch { .. } => PackErrorKind::UnsupportedArch,
            PackError::Rpm(_) => PackErrorKind::Rpm,
            PackError::Context(_, inner) => inner.kind(),
        }
    }

    /// Returns the missing dependency details, if that is the underlying failure.
    pub fn as_missing_dependency(&self) -> Option<&MissingDependencyError> {
        match self.root_cause() {
            PackError::MissingDependency(e) => Some(e),
            _ => None,
        }
    }
}

/// A referenced input that must exist before it can be packed.
#[derive(Debug, DeriveError)]
pub enum MissingDependencyError {
    /// Runtime binary required by `--with-binaries` was not found.
    #[error("required binary '{name}' not found in the environment bin directory or PATH")]
    Binary {
        /// Binary name (e.g. `tarantool`)
        name: String,
    },

    /// A file named on the command line does not exist.
    #[error("{kind} file {path} does not exist")]
    File {
        /// What the file is used for (e.g. "pre-install script")
        kind: &'static str,
        /// The path that was looked up
        path: PathBuf,
    },

    /// An application listed in `--app-list` is not in the environment.
    #[error("application '{name}' not found in {dir}")]
    Application {
        /// Application name
        name: String,
        /// Directory that was searched
        dir: PathBuf,
    },
}

/// Filesystem failure with the operation and path that caused it.
#[derive(Debug)]
pub struct WriteFailureError {
    /// Present-tense description of the operation (e.g. "creating archive")
    pub context: &'static str,
    /// Path being accessed
    pub path: PathBuf,
    /// The underlying I/O error
    pub source: io::Error,
}

impl Display for WriteFailureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.context, self.path.display(), self.source)
    }
}

impl std::error::Error for WriteFailureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, PackError>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but keeps the [`PackError`] kind reachable.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| PackError::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| PackError::Context(f().to_string(), Box::new(e)))
    }
}

/// Extension trait for filesystem operations with automatic path context.
///
/// Wraps I/O errors into [`WriteFailureError`] carrying the path.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying binary".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| {
            PackError::WriteFailure(WriteFailureError {
                context,
                path: path.into(),
                source,
            })
        })
    }
}
