//! Tests for configuration loading.

use std::io::Write;
use std::sync::{Mutex, OnceLock};

use pretty_assertions::assert_eq;
use promptgraph::config::{BridgeConfig, CONFIG_PATH_ENV};
use promptgraph::error::GraphError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 6] = [
    "PROMPTGRAPH_CONFIG",
    "PROMPTGRAPH_MAX_ITERATIONS",
    "PROMPTGRAPH_BLANK_PROMPT_REPLY",
    "PROMPTGRAPH_AGENT_NAME",
    "PROMPTGRAPH_AGENT_VERSION",
    "PROMPTGRAPH_PROMPT_PREVIEW_CHARS",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clear_config_env() -> EnvGuard {
    let guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
    guard
}

#[test]
fn load_reads_the_file_named_by_env() {
    let _lock = env_lock_guard();
    let _env = clear_config_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_iterations = 4").unwrap();
    writeln!(file, "agent_name = \"FileAgent\"").unwrap();
    std::env::set_var(CONFIG_PATH_ENV, file.path());

    let config = BridgeConfig::load().unwrap();
    assert_eq!(config.max_iterations, 4);
    assert_eq!(config.agent_name, "FileAgent");
    assert_eq!(config.agent_version, "1.0.0");
}

#[test]
fn env_values_override_the_file() {
    let _lock = env_lock_guard();
    let _env = clear_config_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_iterations = 4").unwrap();
    std::env::set_var(CONFIG_PATH_ENV, file.path());
    std::env::set_var("PROMPTGRAPH_MAX_ITERATIONS", "9");
    std::env::set_var("PROMPTGRAPH_BLANK_PROMPT_REPLY", "Type something.");

    let config = BridgeConfig::load().unwrap();
    assert_eq!(config.max_iterations, 9);
    assert_eq!(config.blank_prompt_reply, "Type something.");
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let _lock = env_lock_guard();
    let _env = clear_config_env();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var(CONFIG_PATH_ENV, dir.path().join("absent.toml"));

    let config = BridgeConfig::load().unwrap();
    assert_eq!(config, BridgeConfig::default());
}

#[test]
fn zero_iterations_from_env_fail_validation() {
    let _lock = env_lock_guard();
    let _env = clear_config_env();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var(CONFIG_PATH_ENV, dir.path().join("absent.toml"));
    std::env::set_var("PROMPTGRAPH_MAX_ITERATIONS", "0");

    let err = BridgeConfig::load().unwrap_err();
    assert!(matches!(err, GraphError::Configuration(_)));
}

#[test]
fn blank_prompt_reply_fails_validation() {
    for reply in ["", "   ", "\n\t"] {
        let config = BridgeConfig {
            blank_prompt_reply: reply.into(),
            ..BridgeConfig::default()
        };
        assert!(
            matches!(config.validate(), Err(GraphError::Configuration(_))),
            "reply {reply:?}"
        );
    }
}

#[test]
fn empty_blank_prompt_reply_from_env_fails_load() {
    let _lock = env_lock_guard();
    let _env = clear_config_env();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var(CONFIG_PATH_ENV, dir.path().join("absent.toml"));
    std::env::set_var("PROMPTGRAPH_BLANK_PROMPT_REPLY", "");

    let err = BridgeConfig::load().unwrap_err();
    assert!(matches!(err, GraphError::Configuration(_)));
}

#[test]
fn config_serializes_back_to_toml() {
    let config = BridgeConfig {
        agent_name: "Serialized".into(),
        ..BridgeConfig::default()
    };
    let raw = toml::to_string(&config).unwrap();
    assert_eq!(BridgeConfig::from_toml_str(&raw).unwrap(), config);
}
