use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ValuesFinderError};

pub const DEFAULT_CONFIG_PATH: &str = "config.yml";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-lite";

/// Main configuration structure for values-finder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of pairwise rounds before the final ranking
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default = "default_options_per_question")]
    pub options_per_question: u32,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub prompts: PromptConfig,
    #[serde(default)]
    pub transcript: TranscriptConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    Mock,
}

impl std::str::FromStr for LlmProvider {
    type Err = ValuesFinderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            other => Err(ValuesFinderError::Config(format!(
                "unknown llm provider '{other}' (expected gemini or mock)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
}

fn default_rounds() -> u32 {
    20
}

fn default_options_per_question() -> u32 {
    2
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
        }
    }
}

/// Template file locations; `None` selects the built-in template
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PromptConfig {
    #[serde(default)]
    pub options_template: Option<PathBuf>,
    #[serde(default)]
    pub rank_template: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    #[serde(default = "default_transcript_dir")]
    pub directory: PathBuf,
}

fn default_transcript_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            directory: default_transcript_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            options_per_question: default_options_per_question(),
            llm: LlmConfig::default(),
            gemini: GeminiConfig::default(),
            prompts: PromptConfig::default(),
            transcript: TranscriptConfig::default(),
        }
    }
}

impl Config {
    /// Read and parse a YAML configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ValuesFinderError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&contents).map_err(|e| {
            ValuesFinderError::Config(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Load configuration from file with environment variable overrides.
    /// Always returns a usable config; problems are logged.
    pub fn load() -> Self {
        if dotenvy::dotenv().is_ok() {
            tracing::info!("Loaded .env from working directory");
        }

        let config_path =
            env::var("VALUES_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&config_path).exists() {
            match Self::from_path(&config_path) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {}", config_path);
                    config
                }
                Err(e) => {
                    tracing::error!("{} - using defaults", e);
                    Self::default()
                }
            }
        } else {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from a key lookup, usually the process environment
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rounds) = lookup("VALUES_ROUNDS") {
            match rounds.parse() {
                Ok(n) => self.rounds = n,
                Err(_) => tracing::warn!("Ignoring non-numeric VALUES_ROUNDS: {}", rounds),
            }
        }
        if let Some(provider) = lookup("VALUES_LLM_PROVIDER") {
            match provider.parse() {
                Ok(p) => self.llm.provider = p,
                Err(e) => tracing::warn!("Ignoring VALUES_LLM_PROVIDER: {}", e),
            }
        }
        if let Some(api_key) = lookup("GOOGLE_GENAI_API_KEY") {
            self.gemini.api_key = api_key;
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(dir) = lookup("VALUES_TRANSCRIPT_DIR") {
            self.transcript.directory = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(ValuesFinderError::Config("rounds must be at least 1".into()));
        }
        if self.options_per_question < 2 {
            return Err(ValuesFinderError::Config(
                "options_per_question must be at least 2".into(),
            ));
        }
        if self.llm.provider == LlmProvider::Gemini && self.gemini.api_key.is_empty() {
            return Err(ValuesFinderError::Config(
                "GOOGLE_GENAI_API_KEY must be set for the gemini provider".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_from_path_flat_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "rounds: 20\noptions_per_question: 2").unwrap();

        let config = Config::from_path(file.path()).unwrap();
        assert_eq!(config.rounds, 20);
        assert_eq!(config.options_per_question, 2);
        assert_eq!(config.llm.provider, LlmProvider::Gemini);
        assert_eq!(config.gemini.model, DEFAULT_GEMINI_MODEL);
        assert!(config.prompts.options_template.is_none());
        assert_eq!(config.transcript.directory, PathBuf::from("."));
    }

    #[test]
    fn test_from_path_full_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "rounds: 3\noptions_per_question: 2\nllm:\n  provider: mock\ngemini:\n  model: gemini-2.5-flash\nprompts:\n  rank_template: doc/rank_prompt.md\ntranscript:\n  directory: /tmp/sessions\n"
        )
        .unwrap();

        let config = Config::from_path(file.path()).unwrap();
        assert_eq!(config.rounds, 3);
        assert_eq!(config.llm.provider, LlmProvider::Mock);
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(
            config.prompts.rank_template,
            Some(PathBuf::from("doc/rank_prompt.md"))
        );
        assert_eq!(config.transcript.directory, PathBuf::from("/tmp/sessions"));
    }

    #[test]
    fn test_from_path_missing_file() {
        assert!(matches!(
            Config::from_path("non_existent_file.yml"),
            Err(ValuesFinderError::Config(_))
        ));
    }

    #[test]
    fn test_from_path_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "rounds: [not a number").unwrap();
        assert!(Config::from_path(file.path()).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("VALUES_ROUNDS", "5"),
            ("VALUES_LLM_PROVIDER", "MOCK"),
            ("GOOGLE_GENAI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-x"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.rounds, 5);
        assert_eq!(config.llm.provider, LlmProvider::Mock);
        assert_eq!(config.gemini.api_key, "secret");
        assert_eq!(config.gemini.model, "gemini-x");
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|k| match k {
            "VALUES_ROUNDS" => Some("many".to_string()),
            "VALUES_LLM_PROVIDER" => Some("openai".to_string()),
            _ => None,
        });
        assert_eq!(config.rounds, 20);
        assert_eq!(config.llm.provider, LlmProvider::Gemini);
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_err(), "gemini without api key");

        config.gemini.api_key = "key".to_string();
        assert!(config.validate().is_ok());

        config.rounds = 0;
        assert!(config.validate().is_err());

        let mut mock = Config::default();
        mock.llm.provider = LlmProvider::Mock;
        assert!(mock.validate().is_ok());
    }
}
