//! Unit tests for the settings engine: file persistence, dot-path updates
//! and validation.

use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

use vaultdesk::services::settings_engine::{apply_overrides, validate, SettingsEngine, SettingsEngineTrait, BACKEND_URL_ENV};
use vaultdesk::types::errors::SettingsError;
use vaultdesk::types::settings::ClientSettings;

fn engine(tmp: &TempDir) -> SettingsEngine {
    let path = tmp.path().join("config").join("settings.json");
    SettingsEngine::new(Some(path.to_string_lossy().to_string()))
}

#[test]
fn missing_file_loads_defaults() {
    let tmp = TempDir::new().unwrap();
    let mut e = engine(&tmp);
    let loaded = e.load().unwrap();
    assert_eq!(loaded.kdf, ClientSettings::default().kdf);
    assert_eq!(e.stored_settings(), &ClientSettings::default());
}

#[test]
fn set_value_persists_and_reloads() {
    let tmp = TempDir::new().unwrap();
    let mut e = engine(&tmp);
    e.load().unwrap();
    e.set_value("backend.timeout_secs", json!(5)).unwrap();
    e.set_value("logging.level", json!("debug")).unwrap();

    let mut reloaded = engine(&tmp);
    let settings = reloaded.load().unwrap();
    assert_eq!(settings.backend.timeout_secs, 5);
    assert_eq!(reloaded.stored_settings().logging.level, "debug");
}

#[rstest]
#[case("kdf.iterations", json!(2))]
#[case("kdf.memory_kib", json!(1024))]
#[case("proof.login_max", json!(1500))]
#[case("kdf", json!({"memory_kib": 64, "iterations": 1, "parallelism": 1}))]
fn protocol_sections_are_file_only(#[case] key: &str, #[case] value: serde_json::Value) {
    let tmp = TempDir::new().unwrap();
    let mut e = engine(&tmp);
    e.load().unwrap();

    let err = e.set_value(key, value).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidKey(_)), "got {err:?}");
    assert_eq!(e.stored_settings(), &ClientSettings::default());
    assert!(!std::path::Path::new(e.get_config_path()).exists(), "nothing was saved");
}

#[test]
fn failed_save_keeps_previous_settings() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();
    let path = blocker.join("settings.json");
    let mut e = SettingsEngine::new(Some(path.to_string_lossy().to_string()));
    e.load().unwrap();

    let err = e.set_value("backend.timeout_secs", json!(7)).unwrap_err();
    assert!(matches!(err, SettingsError::IoError(_)), "got {err:?}");
    assert_eq!(e.stored_settings(), &ClientSettings::default());
    assert_eq!(e.get_settings().backend.timeout_secs, ClientSettings::default().backend.timeout_secs);
}

#[test]
fn reset_keeps_file_tuned_protocol_sections() {
    let tmp = TempDir::new().unwrap();
    let e = engine(&tmp);
    std::fs::create_dir_all(tmp.path().join("config")).unwrap();
    std::fs::write(
        e.get_config_path(),
        r#"{"kdf":{"memory_kib":64,"iterations":1,"parallelism":1},"logging":{"level":"trace"}}"#,
    )
    .unwrap();
    let mut e = engine(&tmp);
    e.load().unwrap();

    e.reset().unwrap();
    assert_eq!(e.get_settings().kdf.memory_kib, 64);
    assert_eq!(e.stored_settings().logging.level, ClientSettings::default().logging.level);
}

#[test]
fn unknown_keys_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let mut e = engine(&tmp);
    assert!(matches!(e.set_value("", json!(1)).unwrap_err(), SettingsError::InvalidKey(_)));
    assert!(matches!(e.set_value("backend.nope", json!(1)).unwrap_err(), SettingsError::InvalidKey(_)));
    assert!(matches!(
        e.set_value("backend.timeout_secs.deeper", json!(1)).unwrap_err(),
        SettingsError::InvalidKey(_)
    ));
}

#[test]
fn wrongly_typed_values_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let mut e = engine(&tmp);
    let err = e.set_value("backend.timeout_secs", json!("soon")).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidValue(_)));
}

#[test]
fn cross_field_violations_roll_back() {
    let tmp = TempDir::new().unwrap();
    let mut e = engine(&tmp);
    e.load().unwrap();
    let before = e.get_settings().clone();

    assert!(e.set_value("backend.base_url", json!("ftp://vault")).is_err());
    assert!(e.set_value("backend.timeout_secs", json!(0)).is_err());
    assert_eq!(e.get_settings(), &before);
    assert!(!std::path::Path::new(e.get_config_path()).exists(), "nothing was saved");
}

#[test]
fn malformed_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let e = engine(&tmp);
    std::fs::create_dir_all(tmp.path().join("config")).unwrap();
    std::fs::write(e.get_config_path(), "{ not json").unwrap();
    let mut e = engine(&tmp);
    assert!(matches!(e.load().unwrap_err(), SettingsError::SerializationError(_)));
}

#[test]
fn partial_file_fills_missing_sections() {
    let tmp = TempDir::new().unwrap();
    let e = engine(&tmp);
    std::fs::create_dir_all(tmp.path().join("config")).unwrap();
    std::fs::write(
        e.get_config_path(),
        r#"{"backend":{"base_url":"https://vault.example.com","timeout_secs":10}}"#,
    )
    .unwrap();
    let mut e = engine(&tmp);
    let settings = e.load().unwrap();
    assert_eq!(settings.proof, ClientSettings::default().proof);
    assert_eq!(e.stored_settings().backend.timeout_secs, 10);
}

#[test]
fn reset_writes_defaults() {
    let tmp = TempDir::new().unwrap();
    let mut e = engine(&tmp);
    e.set_value("logging.level", json!("debug")).unwrap();
    e.reset().unwrap();
    let mut reloaded = engine(&tmp);
    reloaded.load().unwrap();
    assert_eq!(reloaded.stored_settings(), &ClientSettings::default());
}

#[test]
fn overrides_apply_to_effective_settings_only() {
    let mut settings = ClientSettings::default();
    apply_overrides(&mut settings, |k| {
        (k == BACKEND_URL_ENV).then(|| "https://staging.example.com".to_string())
    });
    assert_eq!(settings.backend.base_url, "https://staging.example.com");
    assert!(validate(&settings).is_ok());
}

#[test]
fn validate_requires_disjoint_proof_ranges() {
    let mut settings = ClientSettings::default();
    settings.proof.login_max = settings.proof.register_min;
    assert!(validate(&settings).is_err());
    settings.proof.login_max = settings.proof.register_min - 1;
    assert!(validate(&settings).is_ok());
}
