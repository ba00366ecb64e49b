//! The format-agnostic description of a packaging operation.
//!
//! A [`PackRequest`] is built once per invocation from command line input
//! and configuration, checked by the validator, and then handed by shared
//! reference to exactly one packer. Nothing mutates it after that point.

use crate::error::UnsupportedFormatError;
use std::{fmt, path::PathBuf, str::FromStr};

/// Supported bundle formats.
///
/// # Examples
///
/// ```
/// use tt_pack::pack::PackageFormat;
///
/// let format: PackageFormat = "tgz".parse().unwrap();
/// assert_eq!(format, PackageFormat::TarGz);
/// assert_eq!(format.extension(), "tar.gz");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PackageFormat {
    /// Compressed tarball of the environment (.tar.gz).
    TarGz,

    /// RPM package for Fedora, RHEL, CentOS, and derivatives.
    Rpm,

    /// Debian package for Ubuntu, Debian, and derivatives.
    Deb,
}

impl PackageFormat {
    /// All formats, in the order they are listed to users.
    pub const ALL: [PackageFormat; 3] = [PackageFormat::TarGz, PackageFormat::Rpm, PackageFormat::Deb];

    /// Returns the identifier used on the command line.
    pub fn short_name(&self) -> &'static str {
        match self {
            PackageFormat::TarGz => "tgz",
            PackageFormat::Rpm => "rpm",
            PackageFormat::Deb => "deb",
        }
    }

    /// Returns the artifact file extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            PackageFormat::TarGz => "tar.gz",
            PackageFormat::Rpm => "rpm",
            PackageFormat::Deb => "deb",
        }
    }

    /// Whether the RPM/DEB option block is honored for this format.
    pub fn is_system_package(&self) -> bool {
        matches!(self, PackageFormat::Rpm | PackageFormat::Deb)
    }
}

impl fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl FromStr for PackageFormat {
    type Err = UnsupportedFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tgz" | "tar.gz" | "targz" => Ok(PackageFormat::TarGz),
            "rpm" => Ok(PackageFormat::Rpm),
            "deb" => Ok(PackageFormat::Deb),
            _ => Err(UnsupportedFormatError::new(s)),
        }
    }
}

/// Whether tarantool and tt binaries go into the bundle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BinariesMode {
    /// Include binaries that can be found, skip the rest.
    #[default]
    Unset,
    /// Binaries are required; missing ones fail the operation.
    ForceInclude,
    /// Never include binaries.
    ForceExclude,
}

impl BinariesMode {
    /// Resolves the `--with-binaries` / `--without-binaries` flag pair.
    ///
    /// Exclusion wins when both flags are given, so the result depends only
    /// on the two inputs.
    ///
    /// ```
    /// use tt_pack::pack::BinariesMode;
    ///
    /// assert_eq!(BinariesMode::resolve(true, true), BinariesMode::ForceExclude);
    /// assert_eq!(BinariesMode::resolve(true, false), BinariesMode::ForceInclude);
    /// assert_eq!(BinariesMode::resolve(false, false), BinariesMode::Unset);
    /// ```
    pub fn resolve(with_binaries: bool, without_binaries: bool) -> Self {
        match (with_binaries, without_binaries) {
            (_, true) => BinariesMode::ForceExclude,
            (true, false) => BinariesMode::ForceInclude,
            (false, false) => BinariesMode::Unset,
        }
    }

    /// Flag view of the resolved state: `(with_binaries, without_binaries)`.
    ///
    /// Never returns `(true, true)`.
    pub fn as_flags(&self) -> (bool, bool) {
        match self {
            BinariesMode::Unset => (false, false),
            BinariesMode::ForceInclude => (true, false),
            BinariesMode::ForceExclude => (false, true),
        }
    }
}

/// Options honored only by the tarball packer.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ArchiveOptions {
    /// Keep runtime artifacts (logs, snapshots, WAL files) in the archive.
    pub include_all: bool,
}

/// Options honored only by the RPM and DEB packers.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RpmDebOptions {
    /// Script run before installation.
    pub pre_inst_script_path: Option<PathBuf>,
    /// Script run after installation.
    pub post_inst_script_path: Option<PathBuf>,
    /// File listing one dependency per line.
    pub dependencies_file_path: Option<PathBuf>,
    /// Dependencies given directly on the command line.
    pub explicit_dependencies: Vec<String>,
    /// Add tarantool and tt as package dependencies.
    pub with_tool_dependencies: bool,
}

/// A normalized packaging request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackRequest {
    /// Which packer handles the request.
    pub format: PackageFormat,
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// Applications to include, in order. Empty means all.
    pub app_list: Vec<String>,
    /// Explicit artifact file name, used verbatim.
    pub file_name: Option<String>,
    /// Binary inclusion policy.
    pub include_binaries: BinariesMode,
    /// Tarball-only options.
    pub archive_options: ArchiveOptions,
    /// RPM/DEB-only options.
    pub rpm_deb_options: RpmDebOptions,
}

impl PackRequest {
    /// Creates a request with default options for the given format.
    pub fn new(format: PackageFormat, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            format,
            name: name.into(),
            version: version.into(),
            app_list: Vec::new(),
            file_name: None,
            include_binaries: BinariesMode::Unset,
            archive_options: ArchiveOptions::default(),
            rpm_deb_options: RpmDebOptions::default(),
        }
    }

    /// Name of the artifact this request produces.
    ///
    /// `arch` is the format-specific architecture label; tarballs ignore it.
    /// An explicit [`file_name`](Self::file_name) is returned unchanged.
    ///
    /// ```
    /// use tt_pack::pack::{PackageFormat, PackRequest};
    ///
    /// let request = PackRequest::new(PackageFormat::TarGz, "myapp", "1.0");
    /// assert_eq!(request.artifact_file_name("x86_64"), "myapp-1.0.tar.gz");
    /// ```
    pub fn artifact_file_name(&self, arch: &str) -> String {
        if let Some(file_name) = &self.file_name {
            return file_name.clone();
        }
        match self.format {
            PackageFormat::TarGz => format!("{}-{}.tar.gz", self.name, self.version),
            PackageFormat::Rpm => format!("{}-{}-1.{}.rpm", self.name, self.version, arch),
            PackageFormat::Deb => format!("{}_{}_{}.deb", self.name, self.version, arch),
        }
    }
}
