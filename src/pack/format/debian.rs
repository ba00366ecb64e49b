//! Debian package (.deb) packer.
//!
//! A .deb file is an ar archive containing:
//! - debian-binary: Format version (2.0)
//! - control.tar.gz: Package metadata (control, md5sums, scripts)
//! - data.tar.gz: Files to install
//!
//! Both tarballs are assembled in a scratch directory that is removed when
//! the packer returns.

use crate::pack::{
    deps::{Dependency, collect_dependencies},
    error::{Context, ErrorExt, Result},
    format::{Arch, InstallScripts, append_bytes, append_dir, append_file, system_install_path},
    guard::OutputGuard,
    layout::BundleLayout,
    packer::{PackContext, Packer},
    request::{PackRequest, PackageFormat},
};
use flate2::{Compression, write::GzEncoder};
use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

const MAINTAINER: &str = "Unknown";

/// Builds `.deb` packages.
#[derive(Debug, Default, Clone, Copy)]
pub struct DebPacker;

impl Packer for DebPacker {
    fn format(&self) -> PackageFormat {
        PackageFormat::Deb
    }

    fn run(&self, ctx: &PackContext, request: &PackRequest) -> Result<PathBuf> {
        let arch = Arch::host().debian_name()?;
        let scripts = InstallScripts::resolve(&request.rpm_deb_options)?;
        let dependencies = collect_dependencies(&request.rpm_deb_options)?;
        let layout = BundleLayout::collect(ctx, request).context("failed to collect bundle content")?;

        let package_name = request.artifact_file_name(arch);
        log::info!("Bundling {} for {}", package_name, arch);

        let staging = tempfile::Builder::new()
            .prefix("tt-pack-deb")
            .tempdir()
            .fs_context("creating staging directory", std::env::temp_dir())?;

        let items = data_items(&request.name, &layout);

        let data_tar_gz = staging.path().join("data.tar.gz");
        write_data_archive(&items, &data_tar_gz).context("failed to create data archive")?;

        let control = ControlFile {
            package: request.name.to_lowercase().replace(' ', "-"),
            version: request.version.clone(),
            arch,
            installed_size_kb: installed_size_kb(&items)?,
            depends: dependencies,
        };
        let md5sums = md5sums(&items)?;
        let control_tar_gz = staging.path().join("control.tar.gz");
        write_control_archive(&control, &md5sums, &scripts, &control_tar_gz)
            .context("failed to create control archive")?;

        let guard = OutputGuard::acquire(ctx.output_dir().join(&package_name))?;
        create_ar_archive(&guard, &data_tar_gz, &control_tar_gz).context("failed to create ar archive")?;

        let path = guard.commit()?;
        log::info!("✓ Created DEB: {}", path.display());
        Ok(path)
    }
}

/// Package metadata written to `control`.
struct ControlFile {
    package: String,
    version: String,
    arch: &'static str,
    installed_size_kb: u64,
    depends: Vec<Dependency>,
}

impl ControlFile {
    fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Package: {}\n", self.package));
        out.push_str(&format!("Version: {}\n", self.version));
        out.push_str(&format!("Architecture: {}\n", self.arch));
        out.push_str(&format!("Installed-Size: {}\n", self.installed_size_kb));
        out.push_str(&format!("Maintainer: {}\n", MAINTAINER));
        out.push_str("Priority: optional\n");
        if !self.depends.is_empty() {
            let depends: Vec<String> = self.depends.iter().map(Dependency::to_debian).collect();
            out.push_str(&format!("Depends: {}\n", depends.join(", ")));
        }
        out.push_str(&format!("Description: Tarantool environment {}\n", self.package));
        out
    }
}

/// Data archive member: a synthesized directory or a file from the layout.
enum DataItem {
    Dir,
    File { source: PathBuf, mode: u32 },
}

/// Maps the layout to install paths, adding every parent directory.
fn data_items(package_name: &str, layout: &BundleLayout) -> BTreeMap<PathBuf, DataItem> {
    let mut items = BTreeMap::new();
    for entry in layout.entries() {
        let path = system_install_path(package_name, entry);
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            items.entry(ancestor.to_path_buf()).or_insert(DataItem::Dir);
        }
        let item = if entry.is_file() {
            DataItem::File {
                source: entry.source.clone(),
                mode: entry.mode(),
            }
        } else {
            DataItem::Dir
        };
        items.insert(path, item);
    }
    items
}

fn write_data_archive(items: &BTreeMap<PathBuf, DataItem>, dest: &Path) -> Result<()> {
    let file = File::create(dest).fs_context("creating data archive", dest)?;
    let mut tar = tar::Builder::new(GzEncoder::new(BufWriter::new(file), Compression::default()));
    for (path, item) in items {
        let appended = match item {
            DataItem::Dir => append_dir(&mut tar, path),
            DataItem::File { source, mode } => append_file(&mut tar, path, source, *mode),
        };
        appended.fs_context("adding to data archive", path)?;
    }
    finish_tar_gz(tar, dest)
}

fn write_control_archive(
    control: &ControlFile,
    md5sums: &str,
    scripts: &InstallScripts,
    dest: &Path,
) -> Result<()> {
    let file = File::create(dest).fs_context("creating control archive", dest)?;
    let mut tar = tar::Builder::new(GzEncoder::new(BufWriter::new(file), Compression::default()));

    append_bytes(&mut tar, Path::new("control"), control.render().as_bytes(), 0o644)
        .fs_context("adding control file", dest)?;
    append_bytes(&mut tar, Path::new("md5sums"), md5sums.as_bytes(), 0o644)
        .fs_context("adding md5sums", dest)?;

    let named = [
        (&scripts.pre_install, "preinst"),
        (&scripts.post_install, "postinst"),
    ];
    for (script, name) in named {
        if let Some(script) = script {
            append_file(&mut tar, Path::new(name), script, 0o755)
                .fs_context("adding maintainer script", script)?;
        }
    }

    finish_tar_gz(tar, dest)
}

fn finish_tar_gz(tar: tar::Builder<GzEncoder<BufWriter<File>>>, dest: &Path) -> Result<()> {
    let encoder = tar.into_inner().fs_context("finishing archive", dest)?;
    let mut writer = encoder.finish().fs_context("compressing archive", dest)?;
    writer.flush().fs_context("flushing archive", dest)?;
    Ok(())
}

/// `md5sums` body: `<hex digest>  <path>` per installed file.
fn md5sums(items: &BTreeMap<PathBuf, DataItem>) -> Result<String> {
    let mut out = String::new();
    for (path, item) in items {
        if let DataItem::File { source, .. } = item {
            let mut src = File::open(source).fs_context("opening file for MD5", source)?;
            let mut context = md5::Context::new();
            io::copy(&mut src, &mut context).fs_context("hashing file", source)?;
            let digest = context.finalize();
            out.push_str(&format!("{}  {}\n", hex::encode(digest.0), path.display()));
        }
    }
    Ok(out)
}

fn installed_size_kb(items: &BTreeMap<PathBuf, DataItem>) -> Result<u64> {
    let mut total = 0u64;
    for item in items.values() {
        if let DataItem::File { source, .. } = item {
            total += fs::metadata(source).fs_context("reading metadata", source)?.len();
        }
    }
    Ok(total.div_ceil(1024))
}

fn create_ar_archive(guard: &OutputGuard, data_tar_gz: &Path, control_tar_gz: &Path) -> Result<()> {
    let dest = guard.partial_path();
    let mut builder = ar::Builder::new(BufWriter::new(guard.create()?));

    let debian_binary: &[u8] = b"2.0\n";
    let mut header = ar::Header::new(b"debian-binary".to_vec(), debian_binary.len() as u64);
    header.set_mode(0o100644);
    builder.append(&header, debian_binary).fs_context("writing debian-binary", dest)?;

    for (member, path) in [("control.tar.gz", control_tar_gz), ("data.tar.gz", data_tar_gz)] {
        let file = File::open(path).fs_context("opening archive member", path)?;
        let size = file.metadata().fs_context("reading metadata", path)?.len();
        let mut header = ar::Header::new(member.as_bytes().to_vec(), size);
        header.set_mode(0o100644);
        builder.append(&header, file).fs_context("writing archive member", dest)?;
    }

    let mut writer = builder.into_inner().fs_context("finishing .deb archive", dest)?;
    writer.flush().fs_context("flushing .deb archive", dest)?;
    Ok(())
}
