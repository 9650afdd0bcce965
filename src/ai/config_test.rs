use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn from_lookup_defaults() {
    let cfg = AssistConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, AssistConfig::default());
    assert_eq!(cfg.base_url, DEFAULT_GEMINI_BASE_URL);
    assert_eq!(cfg.timeouts, Timeouts { connect_secs: 30, read_secs: 60, write_secs: 30 });
    assert_eq!(cfg.tuning.max_tokens, 2048);
    assert!(cfg.config_dir.is_none());
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = AssistConfig::from_lookup(lookup_from(&[
        ("GEMINI_BASE_URL", "http://127.0.0.1:9999/v1beta/"),
        ("AI_CONNECT_TIMEOUT_SECS", "5"),
        ("AI_READ_TIMEOUT_SECS", "7"),
        ("AI_WRITE_TIMEOUT_SECS", "9"),
        ("AI_TEMPERATURE", "0.2"),
        ("AI_MAX_TOKENS", "512"),
        ("POCKET_ASSIST_CONFIG_DIR", "/tmp/pa"),
    ]))
    .unwrap();

    assert_eq!(cfg.base_url, "http://127.0.0.1:9999/v1beta");
    assert_eq!(cfg.timeouts, Timeouts { connect_secs: 5, read_secs: 7, write_secs: 9 });
    assert!((cfg.tuning.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(cfg.tuning.max_tokens, 512);
    assert_eq!(cfg.config_dir, Some(PathBuf::from("/tmp/pa")));
}

#[test]
fn garbage_timeout_falls_back() {
    let cfg = AssistConfig::from_lookup(lookup_from(&[("AI_READ_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.timeouts.read_secs, DEFAULT_READ_TIMEOUT_SECS);
}

#[test]
fn temperature_out_of_range_errors() {
    let err = AssistConfig::from_lookup(lookup_from(&[("AI_TEMPERATURE", "1.5")]))
        .unwrap_err()
        .to_string();
    assert!(err.contains("out of range"));
}

#[test]
fn temperature_unparseable_errors() {
    let err = AssistConfig::from_lookup(lookup_from(&[("AI_TEMPERATURE", "warm")]))
        .unwrap_err()
        .to_string();
    assert!(err.contains("invalid AI_TEMPERATURE"));
}

#[test]
fn zero_max_tokens_errors() {
    let err = AssistConfig::from_lookup(lookup_from(&[("AI_MAX_TOKENS", "0")]))
        .unwrap_err()
        .to_string();
    assert!(err.contains("greater than 0"));
}
