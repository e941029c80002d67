//! Bridge configuration (layered: defaults < TOML file < environment).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::DEFAULT_MAX_ITERATIONS;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "PROMPTGRAPH_CONFIG";

const ENV_MAX_ITERATIONS: &str = "PROMPTGRAPH_MAX_ITERATIONS";
const ENV_BLANK_PROMPT_REPLY: &str = "PROMPTGRAPH_BLANK_PROMPT_REPLY";
const ENV_AGENT_NAME: &str = "PROMPTGRAPH_AGENT_NAME";
const ENV_AGENT_VERSION: &str = "PROMPTGRAPH_AGENT_VERSION";
const ENV_PROMPT_PREVIEW_CHARS: &str = "PROMPTGRAPH_PROMPT_PREVIEW_CHARS";

/// Settings shared by the adapter and the sessions built on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Node executions allowed per run.
    pub max_iterations: usize,
    /// Chunk sent instead of running the graph when the prompt is blank.
    pub blank_prompt_reply: String,
    pub agent_name: String,
    pub agent_version: String,
    /// How much of each prompt is echoed into logs.
    pub prompt_preview_chars: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            blank_prompt_reply: "Please provide a prompt.".to_string(),
            agent_name: "CodePromptAgent".to_string(),
            agent_version: "1.0.0".to_string(),
            prompt_preview_chars: 50,
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Defaults overridden by `PROMPTGRAPH_*` variables (`.env` included).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::default().apply_env()
    }

    /// Resolve the full layering and validate the result.
    ///
    /// The file comes from `PROMPTGRAPH_CONFIG` when set, otherwise from the
    /// platform config directory. A missing file leaves the defaults in place.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(default_config_path);

        let base = match path {
            Some(path) => match fs::read_to_string(&path) {
                Ok(raw) => {
                    tracing::debug!(path = %path.display(), "loaded config file");
                    Self::from_toml_str(&raw)?
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
                Err(err) => return Err(err.into()),
            },
            None => Self::default(),
        };
        let config = base.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup, keyed by variable name.
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(raw) = lookup(ENV_MAX_ITERATIONS) {
            self.max_iterations = parse_count(ENV_MAX_ITERATIONS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PROMPT_PREVIEW_CHARS) {
            self.prompt_preview_chars = parse_count(ENV_PROMPT_PREVIEW_CHARS, &raw)?;
        }
        if let Some(reply) = lookup(ENV_BLANK_PROMPT_REPLY) {
            self.blank_prompt_reply = reply;
        }
        if let Some(name) = lookup(ENV_AGENT_NAME) {
            self.agent_name = name;
        }
        if let Some(version) = lookup(ENV_AGENT_VERSION) {
            self.agent_version = version;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(GraphError::Configuration(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.blank_prompt_reply.trim().is_empty() {
            return Err(GraphError::Configuration(
                "blank_prompt_reply must not be blank".into(),
            ));
        }
        Ok(())
    }
}

/// `<config_dir>/promptgraph/config.toml`, when a config dir exists.
pub fn default_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join("promptgraph").join("config.toml"))
}

fn parse_count(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| GraphError::Configuration(format!("{key} must be a non-negative integer, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_documented_values() {
        let config = BridgeConfig::default();
        assert_eq!(config.max_iterations, 20);
        assert_eq!(config.blank_prompt_reply, "Please provide a prompt.");
        assert_eq!(config.agent_name, "CodePromptAgent");
        assert_eq!(config.agent_version, "1.0.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = BridgeConfig::from_toml_str("max_iterations = 3\nagent_name = \"Tester\"\n").unwrap();
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.agent_name, "Tester");
        assert_eq!(config.agent_version, "1.0.0");
    }

    #[test]
    fn reads_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "blank_prompt_reply = \"Say something.\"").unwrap();
        let config = BridgeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.blank_prompt_reply, "Say something.");
    }

    #[test]
    fn malformed_toml_is_a_configuration_error() {
        let err = BridgeConfig::from_toml_str("max_iterations = \"many\"").unwrap_err();
        assert!(matches!(err, GraphError::Toml(_)));
        assert_eq!(err.category(), crate::error::ErrorCategory::Configuration);
    }

    #[test]
    fn env_overrides_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PROMPTGRAPH_MAX_ITERATIONS", "7"),
            ("PROMPTGRAPH_AGENT_VERSION", "2.0.0"),
        ]);
        let config = BridgeConfig::from_toml_str("max_iterations = 3\n")
            .unwrap()
            .apply_env_with(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.max_iterations, 7);
        assert_eq!(config.agent_version, "2.0.0");
    }

    #[test]
    fn non_numeric_env_value_is_rejected() {
        let err = BridgeConfig::default()
            .apply_env_with(|key| (key == "PROMPTGRAPH_MAX_ITERATIONS").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, GraphError::Configuration(_)));
    }

    #[test]
    fn zero_iterations_fail_validation() {
        let config = BridgeConfig {
            max_iterations: 0,
            ..BridgeConfig::default()
        };
        assert!(matches!(config.validate(), Err(GraphError::Configuration(_))));
    }
}
