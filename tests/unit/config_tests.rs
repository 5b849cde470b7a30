//! Unit tests for configuration parsing and validation.

use std::path::PathBuf;

use agent_parley::config::AppConfig;
use agent_parley::models::turn::Language;

const MINIMAL: &str = r#"
[model]
name = "gpt-4o-mini"
"#;

#[test]
fn minimal_config_parses_with_defaults() {
    let config = AppConfig::from_toml_str(MINIMAL).expect("valid config");

    assert_eq!(config.model.name, "gpt-4o-mini");
    assert_eq!(config.model.endpoint, "https://api.openai.com/v1");
    assert_eq!(config.language, Language::En);
    assert_eq!(config.http_port, 8000);
    assert!(config.logging);
    assert!(!config.verbose_llm);
    assert_eq!(config.db_path, PathBuf::from("memory/conversations.db"));
    assert_eq!(config.allowed_origins, vec!["http://localhost:5501"]);
    assert!(config.speech.endpoint.is_empty());
    assert_eq!(config.speech.voice_en, "am_adam");
    assert_eq!(config.speech.voice_es, "em_alex");
}

#[test]
fn full_config_overrides_defaults() {
    let raw = r#"
language = "ES"
verbose_llm = true
logging = false
http_port = 9100
db_path = "state/threads.db"
log_dir = "telemetry"
allowed_origins = ["https://app.example.com"]
software_version = "9.9.9"

[model]
endpoint = "http://localhost:11434/v1"
name = "qwen3"
temperature = 0.2

[speech]
endpoint = "http://localhost:8880"
voice_en = "af_bella"
"#;
    let config = AppConfig::from_toml_str(raw).expect("valid config");

    assert_eq!(config.language, Language::Es);
    assert!(config.verbose_llm);
    assert!(!config.logging);
    assert_eq!(config.http_port, 9100);
    assert_eq!(config.model.endpoint, "http://localhost:11434/v1");
    assert!((config.model.temperature - 0.2).abs() < f64::EPSILON);
    assert_eq!(config.speech.voice_en, "af_bella");
    assert_eq!(config.software_version, "9.9.9");
}

#[test]
fn empty_model_name_is_rejected() {
    let raw = r#"
[model]
name = "  "
"#;
    assert!(AppConfig::from_toml_str(raw).is_err());
}

#[test]
fn out_of_range_temperature_is_rejected() {
    let raw = r#"
[model]
name = "gpt-4o-mini"
temperature = 3.5
"#;
    assert!(AppConfig::from_toml_str(raw).is_err());
}

#[test]
fn missing_model_table_is_rejected() {
    assert!(AppConfig::from_toml_str("http_port = 8000").is_err());
}

#[test]
fn unknown_language_is_rejected() {
    let raw = r#"
language = "FR"

[model]
name = "gpt-4o-mini"
"#;
    assert!(AppConfig::from_toml_str(raw).is_err());
}
