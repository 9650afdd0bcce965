use super::*;
use crate::error::ErrorCode;

fn temp_store() -> (tempfile::TempDir, SettingsStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::open_in(Some(dir.path()), Tuning::default()).unwrap();
    (dir, store)
}

// =============================================================================
// API key
// =============================================================================

#[test]
fn api_key_absent_until_saved() {
    let (_dir, store) = temp_store();
    assert_eq!(store.api_key(), None);

    store.save_api_key("X").unwrap();
    assert_eq!(store.api_key().as_deref(), Some("X"));
}

#[test]
fn api_key_survives_reopen() {
    let (dir, store) = temp_store();
    store.save_api_key("AIza-test").unwrap();
    drop(store);

    let reopened = SettingsStore::open_in(Some(dir.path()), Tuning::default()).unwrap();
    assert_eq!(reopened.api_key().as_deref(), Some("AIza-test"));
}

#[test]
fn clear_api_key_removes_it() {
    let (_dir, store) = temp_store();
    store.save_api_key("X").unwrap();
    store.clear_api_key().unwrap();
    assert_eq!(store.api_key(), None);
}

// =============================================================================
// config
// =============================================================================

#[test]
fn missing_file_yields_defaults_without_creating_it() {
    let (dir, store) = temp_store();
    assert_eq!(store.config(), AiConfig::default());
    assert!(!dir.path().join(SETTINGS_FILE).exists());
}

#[test]
fn save_config_round_trips_model_and_flags() {
    let (dir, store) = temp_store();
    let config = AiConfig {
        model: AiModel::Quality,
        context_enabled: false,
        auto_complete_enabled: false,
        code_review_enabled: true,
        temperature: 0.1,
        max_tokens: 10,
    };
    store.save_config(&config).unwrap();

    let reopened = SettingsStore::open_in(Some(dir.path()), Tuning::default()).unwrap();
    let loaded = reopened.config();
    assert_eq!(loaded.model, AiModel::Quality);
    assert!(!loaded.context_enabled);
    assert!(!loaded.auto_complete_enabled);
    assert!(loaded.code_review_enabled);
    // Tuning is not persisted.
    assert_eq!(loaded.max_tokens, Tuning::default().max_tokens);
}

#[test]
fn tuning_feeds_config_snapshot() {
    let store = SettingsStore::in_memory(Tuning { temperature: 0.3, max_tokens: 99 });
    let cfg = store.config();
    assert!((cfg.temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(cfg.max_tokens, 99);
}

#[test]
fn partial_file_falls_back_per_key() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(SETTINGS_FILE), r#"{"context_enabled": false}"#).unwrap();

    let store = SettingsStore::open_in(Some(dir.path()), Tuning::default()).unwrap();
    let cfg = store.config();
    assert!(!cfg.context_enabled);
    assert!(cfg.auto_complete_enabled);
    assert_eq!(cfg.model, AiModel::Fast);
    assert_eq!(store.api_key(), None);
}

#[test]
fn unknown_model_reads_as_default() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(SETTINGS_FILE), r#"{"model": "gemini-ultra-9"}"#).unwrap();

    let store = SettingsStore::open_in(Some(dir.path()), Tuning::default()).unwrap();
    assert_eq!(store.config().model, AiModel::Fast);
}

#[test]
fn corrupt_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();

    let err = SettingsStore::open_in(Some(dir.path()), Tuning::default()).err().unwrap();
    assert!(matches!(err, SettingsError::Parse { .. }));
    assert_eq!(err.error_code(), "E_SETTINGS_PARSE");
}

#[test]
fn written_file_uses_snake_case_keys() {
    let (dir, store) = temp_store();
    store.save_api_key("k").unwrap();
    let raw = fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["api_key"], "k");
    assert_eq!(value["model"], "gemini-1.5-flash");
    assert_eq!(value["code_review_enabled"], true);
}

#[test]
fn in_memory_store_has_no_path() {
    let store = SettingsStore::in_memory(Tuning::default());
    assert!(store.path().is_none());
    store.save_api_key("mem").unwrap();
    assert_eq!(store.api_key().as_deref(), Some("mem"));
}
