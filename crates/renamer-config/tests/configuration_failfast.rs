//! Loading must fail loudly rather than silently falling back to defaults.

use std::ffi::OsString;
use std::fs;

use tempfile::TempDir;

use ortho_config::OrthoConfig;
use renamer_config::Config;

#[test]
fn malformed_configuration_file_is_reported() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("renamer.toml");
    fs::write(&path, "transaction_label = \"unterminated\nlog_format = ").expect("write config");

    let args = vec![
        OsString::from("renamer"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];

    let result = Config::load_from_iter(args);
    assert!(result.is_err(), "malformed file should not load: {result:?}");
}

#[test]
fn unknown_log_format_in_file_is_reported() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("renamer.toml");
    fs::write(&path, "log_format = \"yaml\"\n").expect("write config");

    let args = vec![
        OsString::from("renamer"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];

    let error = Config::load_from_iter(args).expect_err("unknown format must fail");
    assert!(!error.to_string().is_empty());
}
