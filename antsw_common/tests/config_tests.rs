//! Station configuration loading tests.
//!
//! Covers `StationConfig::load_or_default()` against real files: full and
//! partial configurations, missing files, bad TOML, unknown fields and pin
//! validation.

use antsw_common::config::{ConfigError, ConfigLoader, LogLevel, StationConfig};
use antsw_common::hal::config::PinMap;
use antsw_common::relay::{PinRef, RelayId};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("antsw.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn full_config_loads() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(
        tmp.path(),
        r#"
[shared]
log_level = "debug"
service_name = "antsw-shack"

[driver]
name = "sysfs"
sysfs_root = "/tmp/fake-gpio"

[pins]
active_low = false
preamp_70cm = 2
preamp_2m = 3
beam_2m = 4
beam_70cm = 17
ts2k_antenna = 27
sdr_antenna = 22
spare = [23]
"#,
    );

    let config = StationConfig::load_or_default(&path).unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Debug);
    assert_eq!(config.shared.service_name, "antsw-shack");
    assert_eq!(config.driver.sysfs_root, PathBuf::from("/tmp/fake-gpio"));
    assert!(!config.pins.active_low);
    assert_eq!(config.pins.pin(RelayId::Beam70), PinRef(17));
    assert_eq!(config.pins.spare, vec![PinRef(23)]);
    // Active-high board: energized means HIGH.
    assert!(config.pins.level(true));
}

#[test]
fn empty_file_gives_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), "");
    assert_eq!(
        StationConfig::load_or_default(&path).unwrap(),
        StationConfig::default()
    );
}

#[test]
fn shared_section_fields_are_optional() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), "[shared]\nlog_level = \"warn\"\n");
    let config = StationConfig::load_or_default(&path).unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Warn);
    assert_eq!(config.shared.service_name, "antsw");
}

#[test]
fn missing_file_is_not_an_error_for_load_or_default() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("absent.toml");

    assert!(matches!(
        StationConfig::load(&path),
        Err(ConfigError::FileNotFound)
    ));
    assert_eq!(
        StationConfig::load_or_default(&path).unwrap(),
        StationConfig::default()
    );
}

#[test]
fn unknown_section_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), "[relays]\npreamp70 = 9\n");
    assert!(matches!(
        StationConfig::load_or_default(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn spare_colliding_with_relay_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), "[pins]\nspare = [26, 19]\n");
    let err = StationConfig::load_or_default(&path).unwrap_err();
    match err {
        ConfigError::ValidationError(msg) => assert!(msg.contains("spare[1]"), "{msg}"),
        other => panic!("expected ValidationError, got {other:?}"),
    }
}

#[test]
fn empty_driver_name_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), "[driver]\nname = \"\"\n");
    assert!(matches!(
        StationConfig::load_or_default(&path),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn default_pin_map_is_valid() {
    PinMap::default().validate().unwrap();
}
