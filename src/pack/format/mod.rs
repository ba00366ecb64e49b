//! Format-specific packers.
//!
//! | Format | Packer | Artifact |
//! |--------|--------|----------|
//! | tarball | [`targz::TarGzPacker`] | `<name>-<version>.tar.gz` |
//! | RPM | [`rpm::RpmPacker`] | `<name>-<version>-1.<arch>.rpm` |
//! | DEB | [`debian::DebPacker`] | `<name>_<version>_<arch>.deb` |
//!
//! RPM and DEB install the environment under
//! `/usr/share/tarantool/<name>/` and the runtime binaries under `/usr/bin/`.

pub mod debian;
pub mod rpm;
pub mod targz;

use crate::pack::{
    error::{MissingDependencyError, PackError, Result},
    layout::{BIN_DIR, LayoutEntry},
    request::RpmDebOptions,
};
use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
};

/// Install prefix for environments packed as system packages.
pub const SYSTEM_PREFIX: &str = "usr/share/tarantool";

/// CPU architecture of the packing host.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arch {
    /// x86_64 / AMD64 (64-bit)
    X86_64,
    /// x86 / i686 (32-bit)
    X86,
    /// AArch64 / ARM64 (64-bit)
    AArch64,
    /// ARM with hard-float (32-bit)
    Armhf,
    /// RISC-V (64-bit)
    Riscv64,
    /// Anything else, by its Rust name
    Other(&'static str),
}

impl Arch {
    /// Architecture of the running host.
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "x86_64" => Arch::X86_64,
            "x86" => Arch::X86,
            "aarch64" => Arch::AArch64,
            "arm" => Arch::Armhf,
            "riscv64" => Arch::Riscv64,
            other => Arch::Other(other),
        }
    }

    /// RPM architecture label.
    pub fn rpm_name(&self) -> Result<&'static str> {
        match self {
            Arch::X86_64 => Ok("x86_64"),
            Arch::X86 => Ok("i686"),
            Arch::AArch64 => Ok("aarch64"),
            Arch::Armhf => Ok("armhfp"),
            Arch::Riscv64 => Ok("riscv64"),
            Arch::Other(name) => Err(PackError::UnsupportedArch {
                arch: name.to_string(),
                format: "RPM",
            }),
        }
    }

    /// Debian architecture label.
    pub fn debian_name(&self) -> Result<&'static str> {
        match self {
            Arch::X86_64 => Ok("amd64"),
            Arch::X86 => Ok("i386"),
            Arch::AArch64 => Ok("arm64"),
            Arch::Armhf => Ok("armhf"),
            Arch::Riscv64 => Ok("riscv64"),
            Arch::Other(name) => Err(PackError::UnsupportedArch {
                arch: name.to_string(),
                format: "DEB",
            }),
        }
    }
}

/// Where a layout entry is installed by a system package, relative to `/`.
pub(crate) fn system_install_path(package_name: &str, entry: &LayoutEntry) -> PathBuf {
    match entry.dest.strip_prefix(BIN_DIR) {
        Ok(binary) if entry.is_file() => Path::new("usr/bin").join(binary),
        _ => Path::new(SYSTEM_PREFIX).join(package_name).join(&entry.dest),
    }
}

/// Install scripts named by the request, checked for existence.
pub(crate) struct InstallScripts {
    pub(crate) pre_install: Option<PathBuf>,
    pub(crate) post_install: Option<PathBuf>,
}

impl InstallScripts {
    pub(crate) fn resolve(opts: &RpmDebOptions) -> Result<Self> {
        let check = |path: &Option<PathBuf>, kind: &'static str| -> Result<Option<PathBuf>> {
            match path {
                Some(path) if !path.is_file() => Err(MissingDependencyError::File {
                    kind,
                    path: path.clone(),
                }
                .into()),
                other => Ok(other.clone()),
            }
        };
        Ok(Self {
            pre_install: check(&opts.pre_inst_script_path, "pre-install script")?,
            post_install: check(&opts.post_inst_script_path, "post-install script")?,
        })
    }
}

/// Appends a directory entry with fixed ownership and timestamp.
pub(crate) fn append_dir<W: Write>(builder: &mut tar::Builder<W>, path: &Path) -> io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Directory);
    header.set_mode(0o755);
    header.set_size(0);
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    builder.append_data(&mut header, path, io::empty())
}

/// Appends file content with fixed ownership and timestamp.
pub(crate) fn append_file<W: Write>(
    builder: &mut tar::Builder<W>,
    path: &Path,
    source: &Path,
    mode: u32,
) -> io::Result<()> {
    let file = File::open(source)?;
    let size = file.metadata()?.len();
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_mode(mode);
    header.set_size(size);
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    builder.append_data(&mut header, path, file)
}

/// Appends in-memory content with fixed ownership and timestamp.
pub(crate) fn append_bytes<W: Write>(
    builder: &mut tar::Builder<W>,
    path: &Path,
    content: &[u8],
    mode: u32,
) -> io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_mode(mode);
    header.set_size(content.len() as u64);
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    builder.append_data(&mut header, path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::layout::EntryKind;

    #[test]
    fn test_binaries_install_to_usr_bin() {
        let entry = LayoutEntry {
            source: PathBuf::from("/opt/env/bin/tt"),
            dest: PathBuf::from("bin/tt"),
            kind: EntryKind::File { executable: true },
        };
        assert_eq!(system_install_path("myapp", &entry), PathBuf::from("usr/bin/tt"));
    }

    #[test]
    fn test_apps_install_under_prefix() {
        let entry = LayoutEntry {
            source: PathBuf::from("/opt/env/instances.enabled/app/init.lua"),
            dest: PathBuf::from("instances.enabled/app/init.lua"),
            kind: EntryKind::File { executable: false },
        };
        assert_eq!(
            system_install_path("myapp", &entry),
            PathBuf::from("usr/share/tarantool/myapp/instances.enabled/app/init.lua")
        );
    }

    #[test]
    fn test_missing_script_is_reported() {
        let opts = RpmDebOptions {
            post_inst_script_path: Some(PathBuf::from("/nonexistent/postinst.sh")),
            ..Default::default()
        };
        let err = InstallScripts::resolve(&opts).err().expect("script is missing");
        assert!(err.as_missing_dependency().is_some());
    }
}
