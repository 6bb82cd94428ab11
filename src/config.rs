//! Configuration for the evaluation harness.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Model backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL for the OpenAI-compatible API (e.g., "http://127.0.0.1:8000/v1")
    pub api_base: String,

    /// API key sent as a bearer token (empty means no Authorization header)
    #[serde(default)]
    pub api_key: String,

    /// Maximum tokens for a response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Model identifiers a trial may be run against
    #[serde(default = "default_models")]
    pub models: Vec<String>,
}

fn default_api_base() -> String {
    "http://127.0.0.1:8000/v1".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_models() -> Vec<String> {
    [
        "qwen2.5-7b-sft",
        "llama3.1-8b-sft",
        "chatglm3-6b-sft",
        "internlm2-7b-sft",
        "baichuan2-7b-sft",
    ]
    .iter()
    .map(|m| m.to_string())
    .collect()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/judgments")
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            models: default_models(),
        }
    }
}

impl BackendConfig {
    /// Default timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Judgment persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory receiving one snapshot file per persist.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Scenario catalog source.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScenarioConfig {
    /// Optional YAML/JSON catalog file; the built-in catalog is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Model backend settings
    pub backend: BackendConfig,
    /// Judgment store settings
    pub store: StoreConfig,
    /// Scenario catalog settings
    pub scenarios: ScenarioConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    backend: Option<BackendFileSection>,
    store: Option<StoreFileSection>,
    scenarios: Option<ScenarioFileSection>,
}

#[derive(Debug, Deserialize)]
struct BackendFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
    models: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct StoreFileSection {
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ScenarioFileSection {
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JUDGE_API_BASE, JUDGE_MODELS, JUDGE_OUTPUT_DIR, ...)
    /// 2. Config file (~/.config/human-judge/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Load from `path` (or the default config file when `None`), then apply
    /// environment overrides.
    pub fn load_with(path: Option<&Path>) -> Result<Self> {
        Self::load_with_lookup(path, |key| env::var(key).ok())
    }

    fn load_with_lookup(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::config_file_path() {
                Some(config_path) if config_path.exists() => Self::load_from_file(&config_path)?,
                _ => Config::default(),
            },
        };

        config.apply_overrides(lookup);
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_base) = lookup("JUDGE_API_BASE") {
            self.backend.api_base = api_base;
        }

        if let Some(api_key) = lookup("JUDGE_API_KEY") {
            self.backend.api_key = api_key;
        }

        if let Some(max_tokens) = lookup("JUDGE_MAX_TOKENS") {
            if let Ok(tokens) = max_tokens.parse() {
                self.backend.max_tokens = tokens;
            }
        }

        if let Some(temperature) = lookup("JUDGE_TEMPERATURE") {
            if let Ok(temp) = temperature.parse() {
                self.backend.temperature = temp;
            }
        }

        if let Some(timeout) = lookup("JUDGE_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.backend.timeout_secs = secs;
            }
        }

        if let Some(models) = lookup("JUDGE_MODELS") {
            self.backend.models = parse_model_list(&models);
        }

        if let Some(dir) = lookup("JUDGE_OUTPUT_DIR") {
            self.store.output_dir = PathBuf::from(dir);
        }

        if let Some(path) = lookup("JUDGE_SCENARIOS") {
            self.scenarios.path = Some(PathBuf::from(path));
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text; absent keys keep their defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| EvalError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(backend) = file_config.backend {
            if let Some(api_base) = backend.api_base {
                config.backend.api_base = api_base;
            }
            if let Some(api_key) = backend.api_key {
                config.backend.api_key = api_key;
            }
            if let Some(max_tokens) = backend.max_tokens {
                config.backend.max_tokens = max_tokens;
            }
            if let Some(temperature) = backend.temperature {
                config.backend.temperature = temperature;
            }
            if let Some(timeout_secs) = backend.timeout_secs {
                config.backend.timeout_secs = timeout_secs;
            }
            if let Some(models) = backend.models {
                config.backend.models = models;
            }
        }

        if let Some(store) = file_config.store {
            if let Some(output_dir) = store.output_dir {
                config.store.output_dir = output_dir;
            }
        }

        if let Some(scenarios) = file_config.scenarios {
            config.scenarios.path = scenarios.path;
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "human-judge")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present and sane.
    pub fn validate(&self) -> Result<()> {
        if self.backend.api_base.trim().is_empty() {
            return Err(EvalError::Config(
                "Backend base URL is required. Set JUDGE_API_BASE environment variable or add to config file.".to_string()
            ));
        }

        if self.backend.timeout_secs == 0 {
            return Err(EvalError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.backend.max_tokens == 0 {
            return Err(EvalError::Config(
                "max_tokens must be greater than zero".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.backend.temperature) {
            return Err(EvalError::Config(format!(
                "temperature must be within [0, 2], got {}",
                self.backend.temperature
            )));
        }

        if self.backend.models.iter().any(|m| m.trim().is_empty()) {
            return Err(EvalError::Config(
                "model identifiers must not be blank".to_string(),
            ));
        }

        if self.store.output_dir.as_os_str().is_empty() {
            return Err(EvalError::Config("output_dir must not be empty".to_string()));
        }

        Ok(())
    }

    /// Create a config from explicit values (useful for testing).
    pub fn with_backend(
        api_base: impl Into<String>,
        models: &[&str],
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            backend: BackendConfig {
                api_base: api_base.into(),
                models: models.iter().map(|m| m.to_string()).collect(),
                ..Default::default()
            },
            store: StoreConfig {
                output_dir: output_dir.into(),
            },
            scenarios: ScenarioConfig::default(),
        }
    }
}

fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.api_base, "http://127.0.0.1:8000/v1");
        assert!(config.backend.api_key.is_empty());
        assert_eq!(config.backend.max_tokens, 500);
        assert_eq!(config.backend.temperature, 0.7);
        assert_eq!(config.backend.timeout(), Duration::from_secs(30));
        assert_eq!(config.backend.models.len(), 5);
        assert_eq!(config.store.output_dir, PathBuf::from("data/judgments"));
        assert!(config.scenarios.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.backend.api_base = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.backend.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.backend.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.backend.models.push("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_yaml_partial_override() {
        let yaml = r#"
backend:
  api_base: "https://models.internal/v1"
  timeout_secs: 10
  models: ["model-a", "model-b"]
store:
  output_dir: "/tmp/judgments"
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.backend.api_base, "https://models.internal/v1");
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.backend.models, vec!["model-a", "model-b"]);
        assert_eq!(config.backend.max_tokens, 500);
        assert_eq!(config.store.output_dir, PathBuf::from("/tmp/judgments"));
    }

    #[test]
    fn test_from_yaml_invalid() {
        assert!(matches!(
            Config::from_yaml("backend: [not, a, map]"),
            Err(EvalError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "backend:\n  api_base: http://file-host/v1\n  timeout_secs: 12\nstore:\n  output_dir: from-file"
        )
        .unwrap();

        let env = HashMap::from([
            ("JUDGE_API_BASE", "http://env-host/v1"),
            ("JUDGE_MODELS", "m1, m2"),
        ]);
        let config = Config::load_with_lookup(Some(file.path()), |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.backend.api_base, "http://env-host/v1");
        assert_eq!(config.backend.models, vec!["m1", "m2"]);
        assert_eq!(config.backend.timeout_secs, 12);
        assert_eq!(config.store.output_dir, PathBuf::from("from-file"));
    }

    #[test]
    fn test_unparseable_env_number_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "JUDGE_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert_eq!(config.backend.timeout_secs, 30);
    }

    #[test]
    fn test_parse_model_list() {
        assert_eq!(
            parse_model_list("model-a, model-b,,model-c "),
            vec!["model-a", "model-b", "model-c"]
        );
    }

    #[test]
    fn test_with_backend() {
        let config = Config::with_backend("http://localhost:9000", &["model-a"], "/tmp/out");
        assert_eq!(config.backend.api_base, "http://localhost:9000");
        assert_eq!(config.backend.models, vec!["model-a"]);
        assert_eq!(config.store.output_dir, PathBuf::from("/tmp/out"));
    }
}
