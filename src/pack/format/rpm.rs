//! RPM package (.rpm) packer for Red Hat-based distributions.
//!
//! Creates RPM packages using the rpm-rs crate. The environment lands in
//! `/usr/share/tarantool/<name>/`, runtime binaries in `/usr/bin/`.

use crate::pack::{
    deps::collect_dependencies,
    error::{Context, ErrorExt, Result},
    format::{Arch, InstallScripts, system_install_path},
    guard::OutputGuard,
    layout::{BundleLayout, EntryKind},
    packer::{PackContext, Packer},
    request::{PackRequest, PackageFormat},
};
use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

const LICENSE: &str = "Unknown";

/// Builds `.rpm` packages.
#[derive(Debug, Default, Clone, Copy)]
pub struct RpmPacker;

impl Packer for RpmPacker {
    fn format(&self) -> PackageFormat {
        PackageFormat::Rpm
    }

    fn run(&self, ctx: &PackContext, request: &PackRequest) -> Result<PathBuf> {
        let arch = Arch::host().rpm_name()?;
        let scripts = InstallScripts::resolve(&request.rpm_deb_options)?;
        let dependencies = collect_dependencies(&request.rpm_deb_options)?;
        let layout = BundleLayout::collect(ctx, request).context("failed to collect bundle content")?;

        log::info!("Building RPM package for {}", request.name);

        let summary = format!("Tarantool environment {}", request.name);
        let build_config = ::rpm::BuildConfig::default().compression(::rpm::CompressionType::Gzip);
        let mut builder = ::rpm::PackageBuilder::new(
            &request.name,
            &request.version,
            LICENSE,
            arch,
            &summary,
        )
        .using_config(build_config)
        .release("1".to_string());

        for dep in &dependencies {
            log::debug!("Requires: {}", dep);
            builder = builder.requires(dep.to_rpm());
        }

        for entry in layout.files() {
            let dest = Path::new("/").join(system_install_path(&request.name, entry));
            log::debug!("Adding file: {} -> {}", entry.source.display(), dest.display());

            let content = std::fs::read(&entry.source).fs_context("reading file", &entry.source)?;
            let mode = match entry.kind {
                EntryKind::File { executable: true } => 0o755,
                _ => 0o644,
            };
            builder = builder.with_file_contents(
                content,
                ::rpm::FileOptions::new(dest.to_string_lossy().as_ref())
                    .mode(::rpm::FileMode::regular(mode))
                    .user("root")
                    .group("root"),
            )?;
        }

        if let Some(pre_install) = &scripts.pre_install {
            let script = std::fs::read_to_string(pre_install)
                .fs_context("reading pre-install script", pre_install)?;
            builder = builder.pre_install_script(script);
        }

        if let Some(post_install) = &scripts.post_install {
            let script = std::fs::read_to_string(post_install)
                .fs_context("reading post-install script", post_install)?;
            builder = builder.post_install_script(script);
        }

        let pkg = builder.build()?;

        let package_name = request.artifact_file_name(arch);
        let guard = OutputGuard::acquire(ctx.output_dir().join(package_name))?;
        let mut file = BufWriter::new(guard.create()?);
        pkg.write(&mut file)?;
        file.flush().fs_context("flushing RPM file", guard.partial_path())?;
        drop(file);

        let path = guard.commit()?;
        log::info!("✓ Created RPM: {}", path.display());
        Ok(path)
    }
}
