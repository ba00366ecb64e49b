//! Tarball (.tar.gz) packer.
//!
//! The archive mirrors the environment layout at its root. Headers carry
//! fixed ownership and zero timestamps and entries are written in sorted
//! order, so repeated runs over the same tree produce identical bytes.

use crate::pack::{
    error::{Context, ErrorExt, Result},
    format::{append_dir, append_file},
    guard::OutputGuard,
    layout::{BundleLayout, EntryKind},
    packer::{PackContext, Packer},
    request::{PackRequest, PackageFormat},
};
use flate2::{Compression, write::GzEncoder};
use std::{
    io::{BufWriter, Write},
    path::PathBuf,
};

/// Builds `.tar.gz` bundles.
#[derive(Debug, Default, Clone, Copy)]
pub struct TarGzPacker;

impl Packer for TarGzPacker {
    fn format(&self) -> PackageFormat {
        PackageFormat::TarGz
    }

    fn run(&self, ctx: &PackContext, request: &PackRequest) -> Result<PathBuf> {
        let layout = BundleLayout::collect(ctx, request).context("failed to collect bundle content")?;

        let package_name = request.artifact_file_name("");
        let guard = OutputGuard::acquire(ctx.output_dir().join(&package_name))?;
        log::info!("Bundling {} ({})", package_name, guard.target().display());

        let file = guard.create()?;
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        let mut tar = tar::Builder::new(encoder);

        for entry in layout.entries() {
            let appended = match entry.kind {
                EntryKind::Dir => append_dir(&mut tar, &entry.dest),
                EntryKind::File { .. } => append_file(&mut tar, &entry.dest, &entry.source, entry.mode()),
            };
            appended.fs_context("adding to archive", &entry.source)?;
        }

        let encoder = tar.into_inner().fs_context("finishing archive", guard.partial_path())?;
        let mut writer = encoder.finish().fs_context("compressing archive", guard.partial_path())?;
        writer.flush().fs_context("flushing archive", guard.partial_path())?;
        drop(writer);

        let path = guard.commit()?;
        log::info!("✓ Created tarball: {}", path.display());
        Ok(path)
    }
}
