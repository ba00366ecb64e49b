//! Format to packer lookup.
//!
//! The format set is closed, so the registry is a static table of
//! constructor functions. Lookups never fall back to a default packer.

use crate::error::UnsupportedFormatError;
use crate::pack::{
    format::{debian::DebPacker, rpm::RpmPacker, targz::TarGzPacker},
    packer::Packer,
    request::PackageFormat,
};

/// Constructor for a boxed packer.
pub type PackerConstructor = fn() -> Box<dyn Packer>;

fn targz_packer() -> Box<dyn Packer> {
    Box::new(TarGzPacker)
}

fn rpm_packer() -> Box<dyn Packer> {
    Box::new(RpmPacker)
}

fn deb_packer() -> Box<dyn Packer> {
    Box::new(DebPacker)
}

static BUILTIN_PACKERS: &[(PackageFormat, PackerConstructor)] = &[
    (PackageFormat::TarGz, targz_packer),
    (PackageFormat::Rpm, rpm_packer),
    (PackageFormat::Deb, deb_packer),
];

/// Maps format identifiers to packer implementations.
#[derive(Debug, Clone)]
pub struct PackerRegistry {
    entries: Vec<(PackageFormat, PackerConstructor)>,
}

impl Default for PackerRegistry {
    fn default() -> Self {
        Self {
            entries: BUILTIN_PACKERS.to_vec(),
        }
    }
}

impl PackerRegistry {
    /// Registry with the tarball, RPM and DEB packers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with no packers. Every lookup fails.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces the constructor for `format`.
    pub fn register(mut self, format: PackageFormat, constructor: PackerConstructor) -> Self {
        self.entries.retain(|(f, _)| *f != format);
        self.entries.push((format, constructor));
        self
    }

    /// Formats this registry can build.
    pub fn formats(&self) -> impl Iterator<Item = PackageFormat> + '_ {
        self.entries.iter().map(|(f, _)| *f)
    }

    /// Returns the packer for `format`.
    pub fn resolve(&self, format: PackageFormat) -> Result<Box<dyn Packer>, UnsupportedFormatError> {
        self.entries
            .iter()
            .find(|(f, _)| *f == format)
            .map(|(_, constructor)| constructor())
            .ok_or_else(|| UnsupportedFormatError::new(format.short_name()))
    }

    /// Returns the packer for a format identifier such as `"tgz"`.
    pub fn resolve_name(&self, name: &str) -> Result<Box<dyn Packer>, UnsupportedFormatError> {
        let format: PackageFormat = name.parse()?;
        self.resolve(format)
    }
}

/// Factory lookup against the built-in table. `None` means the identifier
/// names no supported format.
pub fn create_packer(format: &str) -> Option<Box<dyn Packer>> {
    PackerRegistry::new().resolve_name(format).ok()
}
