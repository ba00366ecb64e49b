//! RAII guard for artifact output paths.
//!
//! Packers write into a sibling `.partial` file and only move it to the
//! final name on [`OutputGuard::commit`]. If the guard is dropped first
//! (early return, `?`, panic) the partial file is removed, so a failed run
//! never leaves something that looks like a finished artifact.

use crate::pack::error::{ErrorExt, Result};
use std::{
    ffi::OsString,
    fs::{self, File},
    path::{Path, PathBuf},
};

/// Scoped ownership of an artifact output path.
#[derive(Debug)]
pub struct OutputGuard {
    target: PathBuf,
    partial: PathBuf,
    committed: bool,
}

impl OutputGuard {
    /// Acquires `target`, creating its parent directory.
    ///
    /// A stale partial file from an earlier crashed run is removed. An
    /// existing file at `target` itself is left untouched until commit.
    pub fn acquire(target: impl Into<PathBuf>) -> Result<Self> {
        let target = target.into();
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).fs_context("creating output directory", parent)?;
        }

        let mut partial_name = target
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        partial_name.push(".partial");
        let partial = target.with_file_name(partial_name);

        if partial.exists() {
            fs::remove_file(&partial).fs_context("removing stale partial output", &partial)?;
        }

        Ok(Self {
            target,
            partial,
            committed: false,
        })
    }

    /// Path the packer writes to while building.
    pub fn partial_path(&self) -> &Path {
        &self.partial
    }

    /// Final artifact path.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Creates the partial file for writing.
    pub fn create(&self) -> Result<File> {
        File::create(&self.partial).fs_context("creating artifact", &self.partial)
    }

    /// Moves the finished partial file into place.
    pub fn commit(mut self) -> Result<PathBuf> {
        fs::rename(&self.partial, &self.target).fs_context("moving artifact into place", &self.target)?;
        self.committed = true;
        Ok(self.target.clone())
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Best effort; drop must not panic.
        if self.partial.exists() {
            if let Err(e) = fs::remove_file(&self.partial) {
                log::warn!(
                    "Failed to remove partial artifact {}: {}",
                    self.partial.display(),
                    e
                );
            } else {
                log::debug!("Removed partial artifact {}", self.partial.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_uncommitted_output_is_removed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("out/app-1.0.tar.gz");
        {
            let guard = OutputGuard::acquire(&target).expect("acquire");
            let mut file = guard.create().expect("create");
            file.write_all(b"half written").expect("write");
            assert!(guard.partial_path().exists());
        }
        assert!(!target.exists());
        assert!(!dir.path().join("out/app-1.0.tar.gz.partial").exists());
    }

    #[test]
    fn test_commit_moves_into_place() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("app.rpm");
        let guard = OutputGuard::acquire(&target).expect("acquire");
        guard.create().expect("create");
        let path = guard.commit().expect("commit");
        assert_eq!(path, target);
        assert!(target.exists());
    }
}
