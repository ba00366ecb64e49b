//! Collects what goes into a bundle.
//!
//! Every packer writes the same logical content; only the container and
//! the install prefix differ. Paths in a [`BundleLayout`] are relative to
//! the bundle root:
//!
//! - `bin/tarantool`, `bin/tt` when binaries are included
//! - `instances.enabled/<app>/...` for each application
//! - `tt.toml` when the environment has a configuration file

use crate::pack::{
    error::{ErrorExt, MissingDependencyError, PackError, Result},
    packer::PackContext,
    request::{BinariesMode, PackRequest, PackageFormat},
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Runtime binaries shipped with the environment.
pub const RUNTIME_BINARIES: [&str; 2] = ["tarantool", "tt"];

/// Extensions of files an instance produces while running.
const RUNTIME_ARTIFACT_EXTENSIONS: [&str; 7] = ["log", "pid", "snap", "xlog", "vylog", "control", "sock"];

/// Bundle directory holding applications.
pub const INSTANCES_DIR: &str = "instances.enabled";

/// Bundle directory holding binaries.
pub const BIN_DIR: &str = "bin";

/// Bundle-relative name of the environment configuration.
pub const CONFIG_FILE: &str = "tt.toml";

/// Kind of a layout entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKind {
    /// Directory.
    Dir,
    /// Regular file.
    File {
        /// Whether the file carries the executable bit.
        executable: bool,
    },
}

/// One path in the bundle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LayoutEntry {
    /// Where the content comes from on disk.
    pub source: PathBuf,
    /// Path relative to the bundle root.
    pub dest: PathBuf,
    /// Directory or file.
    pub kind: EntryKind,
}

impl LayoutEntry {
    /// Unix permission bits used when packing the entry.
    pub fn mode(&self) -> u32 {
        match self.kind {
            EntryKind::Dir => 0o755,
            EntryKind::File { executable: true } => 0o755,
            EntryKind::File { executable: false } => 0o644,
        }
    }

    /// Whether the entry is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File { .. })
    }
}

/// The resolved content of a bundle, sorted by destination path.
#[derive(Clone, Debug, Default)]
pub struct BundleLayout {
    entries: Vec<LayoutEntry>,
    binaries: Vec<String>,
    applications: Vec<String>,
}

impl BundleLayout {
    /// Resolves the layout for `request` in environment `ctx`.
    pub fn collect(ctx: &PackContext, request: &PackRequest) -> Result<Self> {
        let mut layout = BundleLayout::default();
        let keep_artifacts =
            request.format == PackageFormat::TarGz && request.archive_options.include_all;

        for (name, path) in find_applications(ctx.instances_dir(), &request.app_list)? {
            layout.add_tree(&path, &Path::new(INSTANCES_DIR).join(&name), keep_artifacts)?;
            layout.applications.push(name);
        }

        for (name, path) in find_binaries(ctx, request.include_binaries)? {
            layout.entries.push(LayoutEntry {
                source: path,
                dest: Path::new(BIN_DIR).join(&name),
                kind: EntryKind::File { executable: true },
            });
            layout.binaries.push(name);
        }

        if let Some(config) = ctx.config_file().filter(|p| p.is_file()) {
            layout.entries.push(LayoutEntry {
                source: config.to_path_buf(),
                dest: PathBuf::from(CONFIG_FILE),
                kind: EntryKind::File { executable: false },
            });
        }

        layout.entries.sort_by(|a, b| a.dest.cmp(&b.dest));
        log::debug!(
            "Bundle layout: {} entries, applications {:?}, binaries {:?}",
            layout.entries.len(),
            layout.applications,
            layout.binaries
        );
        Ok(layout)
    }

    /// All entries, sorted by destination.
    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    /// Regular file entries only.
    pub fn files(&self) -> impl Iterator<Item = &LayoutEntry> {
        self.entries.iter().filter(|e| e.is_file())
    }

    /// Names of the binaries that were found and included.
    pub fn binaries(&self) -> &[String] {
        &self.binaries
    }

    /// Names of the included applications.
    pub fn applications(&self) -> &[String] {
        &self.applications
    }

    fn add_tree(&mut self, root: &Path, dest_root: &Path, keep_artifacts: bool) -> Result<()> {
        let walker = WalkDir::new(root).follow_links(true).sort_by_file_name();
        for entry in walker {
            let entry = entry
                .map_err(std::io::Error::from)
                .fs_context("walking application tree", root)?;
            let path = entry.path();

            if entry.file_type().is_file() && !keep_artifacts && is_runtime_artifact(path) {
                log::debug!("Skipping runtime artifact {}", path.display());
                continue;
            }

            let rel = path.strip_prefix(root).unwrap_or(Path::new(""));
            let dest = if rel.as_os_str().is_empty() {
                dest_root.to_path_buf()
            } else {
                dest_root.join(rel)
            };

            let kind = if entry.file_type().is_dir() {
                EntryKind::Dir
            } else {
                let metadata = entry
                    .metadata()
                    .map_err(std::io::Error::from)
                    .fs_context("reading metadata", path)?;
                EntryKind::File {
                    executable: is_executable(&metadata),
                }
            };

            self.entries.push(LayoutEntry {
                source: path.to_path_buf(),
                dest,
                kind,
            });
        }
        Ok(())
    }
}

/// Whether `path` is something a running instance leaves behind.
pub fn is_runtime_artifact(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| RUNTIME_ARTIFACT_EXTENSIONS.contains(&ext))
}

fn find_applications(instances_dir: &Path, app_list: &[String]) -> Result<Vec<(String, PathBuf)>> {
    let mut apps = Vec::new();
    if instances_dir.is_dir() {
        for entry in fs::read_dir(instances_dir).fs_context("reading applications directory", instances_dir)? {
            let entry = entry.fs_context("reading applications directory", instances_dir)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            apps.push((name, entry.path()));
        }
    } else {
        log::warn!("Applications directory {} does not exist", instances_dir.display());
    }
    apps.sort();

    if app_list.is_empty() {
        return Ok(apps);
    }

    app_list
        .iter()
        .map(|wanted| {
            apps.iter()
                .find(|(name, _)| name == wanted || name.strip_suffix(".lua") == Some(wanted.as_str()))
                .cloned()
                .ok_or_else(|| {
                    PackError::from(MissingDependencyError::Application {
                        name: wanted.clone(),
                        dir: instances_dir.to_path_buf(),
                    })
                })
        })
        .collect()
}

fn find_binaries(ctx: &PackContext, mode: BinariesMode) -> Result<Vec<(String, PathBuf)>> {
    if mode == BinariesMode::ForceExclude {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for name in RUNTIME_BINARIES {
        let local = ctx.bin_dir().join(name);
        let path = if local.is_file() {
            Some(local)
        } else {
            match ctx.search_path() {
                Some(paths) => which::which_in(name, Some(paths), ctx.env_dir()).ok(),
                None => which::which(name).ok(),
            }
        };

        match path {
            Some(path) => {
                log::debug!("Found {} at {}", name, path.display());
                found.push((name.to_string(), path));
            }
            None if mode == BinariesMode::ForceInclude => {
                return Err(MissingDependencyError::Binary {
                    name: name.to_string(),
                }
                .into());
            }
            None => log::debug!("{} not found, packing without it", name),
        }
    }
    Ok(found)
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}
