use std::fs;
use tt_pack::config::PackConfig;
use tt_pack::error::ConfigError;
use tt_pack::pack::PackContext;

#[test]
fn test_defaults_without_config_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = PackConfig::load(None, dir.path()).expect("load");

    assert!(config.source().is_none());
    assert_eq!(config.instances_dir(), dir.path().join("instances.enabled"));
    assert_eq!(config.bin_dir(), dir.path().join("bin"));
    assert_eq!(config.output_dir(), dir.path());
    assert_eq!(config.default_version(), "0.1.0");
}

#[test]
fn test_config_file_in_current_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("tt.toml"),
        "[env]\ninstances_enabled = \"apps\"\n\n[pack]\noutput_dir = \"dist\"\ndefault_version = \"2.0.0\"\n",
    )
    .expect("write config");

    let config = PackConfig::load(None, dir.path()).expect("load");
    assert_eq!(config.source(), Some(dir.path().join("tt.toml").as_path()));
    assert_eq!(config.instances_dir(), dir.path().join("apps"));
    assert_eq!(config.bin_dir(), dir.path().join("bin"));
    assert_eq!(config.output_dir(), dir.path().join("dist"));
    assert_eq!(config.default_version(), "2.0.0");

    let ctx = PackContext::from_config(&config);
    assert_eq!(ctx.config_file(), Some(dir.path().join("tt.toml").as_path()));
}

#[test]
fn test_explicit_config_roots_the_environment() {
    let cwd = tempfile::tempdir().expect("tempdir");
    let env = tempfile::tempdir().expect("tempdir");
    let path = env.path().join("custom.toml");
    fs::write(&path, "[env]\nbin_dir = \"/opt/tarantool/bin\"\n").expect("write config");

    let config = PackConfig::load(Some(&path), cwd.path()).expect("load");
    assert_eq!(config.env_dir(), env.path());
    assert_eq!(config.instances_dir(), env.path().join("instances.enabled"));
    assert_eq!(config.bin_dir(), std::path::Path::new("/opt/tarantool/bin"));
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = PackConfig::load(Some(&dir.path().join("absent.toml")), dir.path()).expect_err("missing");
    assert!(matches!(err, ConfigError::NotFound { .. }));
}

#[test]
fn test_unknown_keys_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("tt.toml"), "[pack]\ncompression = \"xz\"\n").expect("write config");
    let err = PackConfig::load(None, dir.path()).expect_err("invalid");
    assert!(matches!(err, ConfigError::Parse { .. }));
}
