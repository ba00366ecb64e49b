use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tt_pack::error::DispatchError;
use tt_pack::pack::format::targz::TarGzPacker;
use tt_pack::pack::{
    BinariesMode, FormatValidator, MissingDependencyError, PackContext, PackErrorKind,
    PackRequest, PackageFormat, Packer, PackerRegistry, create_packer,
};
use tt_pack::{DispatchStage, Dispatcher};

/// Environment with one application and a leftover instance log.
fn environment() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = dir.path().join("instances.enabled/myapp");
    fs::create_dir_all(&app).expect("create app dir");
    fs::write(app.join("init.lua"), "box.cfg{}\n").expect("write init.lua");
    fs::write(app.join("instances.yml"), "master:\n").expect("write instances.yml");
    fs::write(app.join("master.log"), "started\n").expect("write log");
    dir
}

fn tarball_entries(path: &Path) -> Vec<String> {
    let file = File::open(path).expect("open tarball");
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive
        .entries()
        .expect("entries")
        .map(|entry| {
            let entry = entry.expect("entry");
            entry.path().expect("path").to_string_lossy().trim_end_matches('/').to_string()
        })
        .collect()
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files
}

#[test]
fn test_tarball_warns_for_each_system_package_option() {
    let mut request = PackRequest::new(PackageFormat::TarGz, "myapp", "1.0");
    request.rpm_deb_options.explicit_dependencies = vec!["tarantool".to_string()];
    request.rpm_deb_options.pre_inst_script_path = Some(PathBuf::from("preinst.sh"));
    request.rpm_deb_options.post_inst_script_path = Some(PathBuf::from("postinst.sh"));

    let warnings = FormatValidator::new().validate(&request);
    let options: Vec<_> = warnings.iter().map(|w| w.option).collect();
    assert_eq!(options, ["--deps", "--preinst", "--postinst"]);
    assert!(
        warnings[0]
            .to_string()
            .contains("you are not packaging RPM or DEB. Flag will be ignored")
    );
}

#[test]
fn test_system_packages_warn_once_for_all() {
    for format in [PackageFormat::Rpm, PackageFormat::Deb] {
        let mut request = PackRequest::new(format, "myapp", "1.0");
        request.archive_options.include_all = true;
        let warnings = FormatValidator::new().validate(&request);
        assert_eq!(warnings.len(), 1, "{format}");
        assert_eq!(warnings[0].option, "--all");
        assert!(warnings[0].to_string().contains("not packaging a tarball"));
    }
}

#[test]
fn test_unknown_format_never_resolves() {
    let registry = PackerRegistry::new();
    for name in ["unknown-format", "zip", ""] {
        let err = registry.resolve_name(name).err().expect("must not resolve");
        assert_eq!(err.format, name);
    }
    assert!(create_packer("unknown-format").is_none());
    assert!(create_packer("rpm").is_some());
}

#[test]
fn test_registry_covers_exactly_three_formats() {
    let registry = PackerRegistry::new();
    let formats: Vec<_> = registry.formats().collect();
    assert_eq!(formats, PackageFormat::ALL);
    for format in PackageFormat::ALL {
        assert_eq!(registry.resolve(format).expect("packer").format(), format);
    }
}

fn tarball_packer() -> Box<dyn Packer> {
    Box::new(TarGzPacker)
}

#[test]
fn test_registered_packer_is_resolved() {
    let registry = PackerRegistry::empty().register(PackageFormat::Deb, tarball_packer);
    assert_eq!(registry.formats().collect::<Vec<_>>(), [PackageFormat::Deb]);
    assert_eq!(registry.resolve(PackageFormat::Deb).expect("packer").format(), PackageFormat::TarGz);
    assert!(registry.resolve(PackageFormat::Rpm).is_err());

    let registry = registry.register(PackageFormat::Deb, tarball_packer);
    assert_eq!(registry.formats().count(), 1);
}

#[test]
fn test_binaries_resolution_is_reproducible() {
    let first = BinariesMode::resolve(true, true);
    for _ in 0..10 {
        assert_eq!(BinariesMode::resolve(true, true), first);
    }
    assert_eq!(first, BinariesMode::ForceExclude);
    assert_ne!(first.as_flags(), (true, true));
}

#[test]
fn test_tarball_end_to_end() {
    let env = environment();
    let ctx = PackContext::new(env.path());
    let mut request = PackRequest::new(PackageFormat::TarGz, "myapp", "1.0");
    request.archive_options.include_all = true;

    let outcome = Dispatcher::default().dispatch(&ctx, &request).expect("pack succeeds");

    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.artifact.path, env.path().join("myapp-1.0.tar.gz"));
    assert!(outcome.artifact.path.is_file());
    assert_eq!(outcome.artifact.checksum.len(), 64);

    let entries = tarball_entries(&outcome.artifact.path);
    assert!(entries.contains(&"instances.enabled/myapp/init.lua".to_string()));
    assert!(entries.contains(&"instances.enabled/myapp/master.log".to_string()));
    assert!(!env.path().join("myapp-1.0.tar.gz.partial").exists());
}

#[test]
fn test_tarball_skips_runtime_artifacts_by_default() {
    let env = environment();
    let ctx = PackContext::new(env.path());
    let mut request = PackRequest::new(PackageFormat::TarGz, "myapp", "1.0");
    request.include_binaries = BinariesMode::ForceExclude;

    let outcome = Dispatcher::default().dispatch(&ctx, &request).expect("pack succeeds");
    let entries = tarball_entries(&outcome.artifact.path);
    assert!(entries.contains(&"instances.enabled/myapp/init.lua".to_string()));
    assert!(!entries.iter().any(|e| e.ends_with(".log")));
    assert!(!entries.iter().any(|e| e.starts_with("bin")));
}

#[test]
fn test_tarball_is_byte_identical_across_runs() {
    let env = environment();
    let out_a = tempfile::tempdir().expect("tempdir");
    let out_b = tempfile::tempdir().expect("tempdir");
    let mut request = PackRequest::new(PackageFormat::TarGz, "myapp", "1.0");
    request.include_binaries = BinariesMode::ForceExclude;

    let a = Dispatcher::default()
        .dispatch(&PackContext::new(env.path()).with_output_dir(out_a.path()), &request)
        .expect("first run");
    let b = Dispatcher::default()
        .dispatch(&PackContext::new(env.path()).with_output_dir(out_b.path()), &request)
        .expect("second run");

    assert_eq!(a.artifact.checksum, b.artifact.checksum);
    assert_eq!(
        fs::read(&a.artifact.path).expect("read a"),
        fs::read(&b.artifact.path).expect("read b")
    );
}

#[test]
fn test_explicit_file_name_is_used_verbatim() {
    let env = environment();
    let mut request = PackRequest::new(PackageFormat::TarGz, "myapp", "1.0");
    request.include_binaries = BinariesMode::ForceExclude;
    request.file_name = Some("bundle.tgz".to_string());

    let outcome = Dispatcher::default()
        .dispatch(&PackContext::new(env.path()), &request)
        .expect("pack succeeds");
    assert_eq!(outcome.artifact.path, env.path().join("bundle.tgz"));
}

#[test]
fn test_missing_application_fails() {
    let env = environment();
    let mut request = PackRequest::new(PackageFormat::TarGz, "myapp", "1.0");
    request.include_binaries = BinariesMode::ForceExclude;
    request.app_list = vec!["absent".to_string()];

    let failure = Dispatcher::default()
        .dispatch(&PackContext::new(env.path()), &request)
        .expect_err("pack fails");
    let pack_error = failure.error.pack_error().expect("packer error");
    assert_eq!(pack_error.kind(), PackErrorKind::MissingDependency);
    assert!(files_in(env.path()).is_empty());
}

#[test]
fn test_rpm_missing_preinst_leaves_no_artifact() {
    let env = environment();
    let out = tempfile::tempdir().expect("tempdir");
    let ctx = PackContext::new(env.path()).with_output_dir(out.path());
    let mut request = PackRequest::new(PackageFormat::Rpm, "myapp", "1.0");
    request.include_binaries = BinariesMode::ForceExclude;
    request.rpm_deb_options.pre_inst_script_path = Some(PathBuf::from("/nonexistent"));

    let failure = Dispatcher::default().dispatch(&ctx, &request).expect_err("pack fails");

    assert_eq!(failure.failed_at, DispatchStage::Running);
    let pack_error = failure.error.pack_error().expect("packer error");
    assert_eq!(pack_error.kind(), PackErrorKind::MissingDependency);
    assert!(pack_error.as_missing_dependency().is_some());
    assert!(failure.error.to_string().starts_with("Failed to pack: "));
    assert!(failure.error.to_string().contains("/nonexistent"));
    assert!(files_in(out.path()).is_empty());
}

#[test]
fn test_missing_deps_file_is_a_missing_dependency() {
    let env = environment();
    let out = tempfile::tempdir().expect("tempdir");
    let ctx = PackContext::new(env.path()).with_output_dir(out.path());
    let mut request = PackRequest::new(PackageFormat::Deb, "myapp", "1.0");
    request.include_binaries = BinariesMode::ForceExclude;
    request.rpm_deb_options.dependencies_file_path = Some(env.path().join("deps.txt"));

    let failure = Dispatcher::default().dispatch(&ctx, &request).expect_err("pack fails");
    assert_eq!(
        failure.error.pack_error().map(|e| e.kind()),
        Some(PackErrorKind::MissingDependency)
    );
    assert!(files_in(out.path()).is_empty());
}

#[test]
fn test_empty_registry_fails_before_running() {
    let env = environment();
    let request = PackRequest::new(PackageFormat::TarGz, "myapp", "1.0");

    let failure = Dispatcher::new(PackerRegistry::empty())
        .dispatch(&PackContext::new(env.path()), &request)
        .expect_err("no packer");

    assert_eq!(failure.failed_at, DispatchStage::Validated);
    assert!(matches!(failure.error, DispatchError::UnsupportedFormat(_)));
    assert!(files_in(env.path()).is_empty());
}

#[test]
fn test_warnings_survive_failure() {
    let env = environment();
    let mut request = PackRequest::new(PackageFormat::Rpm, "myapp", "1.0");
    request.archive_options.include_all = true;

    let failure = Dispatcher::new(PackerRegistry::empty())
        .dispatch(&PackContext::new(env.path()), &request)
        .expect_err("no packer");
    assert_eq!(failure.warnings.len(), 1);
}

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
#[test]
fn test_deb_structure() {
    let env = environment();
    let out = tempfile::tempdir().expect("tempdir");
    let ctx = PackContext::new(env.path()).with_output_dir(out.path());
    let mut request = PackRequest::new(PackageFormat::Deb, "myapp", "1.0");
    request.include_binaries = BinariesMode::ForceExclude;
    request.rpm_deb_options.explicit_dependencies = vec!["tarantool >= 2.10".to_string()];

    let outcome = Dispatcher::default().dispatch(&ctx, &request).expect("pack succeeds");
    let file_name = outcome.artifact.path.file_name().expect("file name").to_string_lossy();
    assert!(file_name.starts_with("myapp_1.0_"));
    assert!(file_name.ends_with(".deb"));

    let mut archive = ar::Archive::new(File::open(&outcome.artifact.path).expect("open deb"));
    let mut members = Vec::new();
    while let Some(entry) = archive.next_entry() {
        let entry = entry.expect("ar entry");
        members.push(String::from_utf8_lossy(entry.header().identifier()).into_owned());
    }
    assert_eq!(members, ["debian-binary", "control.tar.gz", "data.tar.gz"]);
}

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
#[test]
fn test_rpm_package_metadata() {
    let env = environment();
    let out = tempfile::tempdir().expect("tempdir");
    let ctx = PackContext::new(env.path()).with_output_dir(out.path());
    let mut request = PackRequest::new(PackageFormat::Rpm, "myapp", "1.0");
    request.include_binaries = BinariesMode::ForceExclude;

    let outcome = Dispatcher::default().dispatch(&ctx, &request).expect("pack succeeds");
    let file_name = outcome.artifact.path.file_name().expect("file name").to_string_lossy();
    assert!(file_name.starts_with("myapp-1.0-1."));

    let package = rpm::Package::open(&outcome.artifact.path).expect("read rpm");
    assert_eq!(package.metadata.get_name().expect("name"), "myapp");
    assert_eq!(package.metadata.get_version().expect("version"), "1.0");
}

#[test]
fn test_force_include_fails_without_binaries() {
    let env = environment();
    let empty_path = tempfile::tempdir().expect("tempdir");
    let ctx = PackContext::new(env.path()).with_search_path(empty_path.path());
    let mut request = PackRequest::new(PackageFormat::TarGz, "myapp", "1.0");
    request.include_binaries = BinariesMode::ForceInclude;

    let failure = Dispatcher::default().dispatch(&ctx, &request).expect_err("pack fails");
    let pack_error = failure.error.pack_error().expect("packer error");
    assert!(matches!(
        pack_error.as_missing_dependency(),
        Some(MissingDependencyError::Binary { .. })
    ));
    assert!(files_in(env.path()).is_empty());
}

#[test]
fn test_blocked_output_directory_is_a_write_failure() {
    let env = environment();
    let blocked = env.path().join("dist");
    fs::write(&blocked, "not a directory").expect("write blocker");
    let ctx = PackContext::new(env.path()).with_output_dir(&blocked);
    let mut request = PackRequest::new(PackageFormat::TarGz, "myapp", "1.0");
    request.include_binaries = BinariesMode::ForceExclude;

    let failure = Dispatcher::default().dispatch(&ctx, &request).expect_err("pack fails");

    assert_eq!(failure.failed_at, DispatchStage::Running);
    let pack_error = failure.error.pack_error().expect("packer error");
    assert_eq!(pack_error.kind(), PackErrorKind::WriteFailure);
    assert!(failure.error.to_string().starts_with("Failed to pack: "));
    assert_eq!(files_in(env.path()), [blocked]);
}
