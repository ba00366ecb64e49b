//! Packaging of a Tarantool environment into distributable bundles.
//!
//! # Flow
//!
//! 1. A [`PackRequest`] describes what to build, independent of format.
//! 2. [`FormatValidator`] warns about options the chosen format ignores.
//! 3. [`PackerRegistry`] maps the format to a [`Packer`].
//! 4. The packer writes exactly one artifact into the output directory.
//!
//! The [`Dispatcher`](crate::dispatch::Dispatcher) drives these steps.
//!
//! # Supported Formats
//!
//! | Format | Identifier | Notes |
//! |--------|------------|-------|
//! | tarball | `tgz` | Byte-reproducible |
//! | RPM | `rpm` | Fedora, RHEL, CentOS |
//! | DEB | `deb` | Debian, Ubuntu |
//!
//! # Example
//!
//! ```no_run
//! use tt_pack::pack::{PackContext, PackRequest, PackageFormat, PackerRegistry};
//!
//! let ctx = PackContext::new("/opt/myenv");
//! let request = PackRequest::new(PackageFormat::TarGz, "myapp", "1.0");
//! let packer = PackerRegistry::new().resolve(request.format)?;
//! let artifact = packer.run(&ctx, &request)?;
//! println!("Created {}", artifact.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod deps;
mod error;
pub mod format;
mod guard;
pub mod layout;
mod packer;
mod registry;
mod request;
mod validate;

pub use error::{
    Context, ErrorExt, MissingDependencyError, PackError, PackErrorKind, Result, WriteFailureError,
};
pub use guard::OutputGuard;
pub use packer::{PackContext, Packer};
pub use registry::{PackerConstructor, PackerRegistry, create_packer};
pub use request::{ArchiveOptions, BinariesMode, PackRequest, PackageFormat, RpmDebOptions};
pub use validate::{FormatValidator, ValidationWarning};

use sha2::{Digest, Sha256};
use std::{fs::File, io, path::{Path, PathBuf}};

/// A finished artifact.
///
/// # Examples
///
/// ```no_run
/// use tt_pack::pack::{PackedArtifact, PackageFormat};
///
/// let artifact = PackedArtifact::inspect(PackageFormat::TarGz, "myapp-1.0.tar.gz".into())?;
/// println!("{} bytes, sha256 {}", artifact.size, artifact.checksum);
/// # Ok::<(), tt_pack::pack::PackError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PackedArtifact {
    /// Format of the artifact.
    pub format: PackageFormat,

    /// Path to the artifact file.
    pub path: PathBuf,

    /// Size in bytes.
    pub size: u64,

    /// SHA-256 checksum, lowercase hex.
    pub checksum: String,
}

impl PackedArtifact {
    /// Reads size and checksum of the artifact at `path`.
    pub fn inspect(format: PackageFormat, path: PathBuf) -> Result<Self> {
        let size = std::fs::metadata(&path)
            .fs_context("reading artifact metadata", &path)?
            .len();
        let checksum = calculate_sha256(&path)?;
        Ok(Self {
            format,
            path,
            size,
            checksum,
        })
    }
}

/// SHA-256 of a file, hex encoded.
pub fn calculate_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).fs_context("opening file for hashing", path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).fs_context("reading file for hash calculation", path)?;
    Ok(hex::encode(hasher.finalize()))
}
