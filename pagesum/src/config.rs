use std::{env, fs, path::Path};

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{PagesumError, Result};

/// Environment variables consulted for the API key, in priority order.
const API_KEY_ENV_VARS: &[&str] = &["PAGESUM_API_KEY", "OPENAI_API_KEY"];

/// Bounds the original options page enforced on the completion budget.
const MIN_MAX_TOKENS: u32 = 500;
const MAX_MAX_TOKENS: u32 = 4000;

fn default_api_url() -> String {
  "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
  "gpt-4o-mini".to_string()
}

const fn default_max_tokens() -> u32 {
  1500
}

const fn default_true() -> bool {
  true
}

/// Configuration options for pagesum
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  /// API key for the summarization endpoint. The `PAGESUM_API_KEY` and
  /// `OPENAI_API_KEY` environment variables take precedence over this.
  #[serde(default)]
  pub api_key: Option<String>,

  /// Chat-completion endpoint URL
  #[serde(default = "default_api_url")]
  pub api_url: String,

  /// Model name sent with every request
  #[serde(default = "default_model")]
  pub model: String,

  /// Completion token budget (500-4000)
  #[serde(default = "default_max_tokens")]
  pub max_tokens: u32,

  /// Ask the model for maximum factual detail
  #[serde(default = "default_true")]
  pub include_facts: bool,

  /// Ask the model for headers, lists, and emphasis in its output
  #[serde(default = "default_true")]
  pub structured_format: bool,

  /// Translate summaries into this language (ISO 639-1 code)
  #[serde(default)]
  pub translate_to: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api_key:           None,
      api_url:           default_api_url(),
      model:             default_model(),
      max_tokens:        default_max_tokens(),
      include_facts:     true,
      structured_format: true,
      translate_to:      None,
    }
  }
}

/// Annotated template written by `pagesum init`.
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# pagesum configuration
#
# The API key may also be provided through the PAGESUM_API_KEY or
# OPENAI_API_KEY environment variables, which take precedence over this file.

# api_key = "sk-..."

# Chat-completion endpoint. Any OpenAI-compatible server works.
api_url = "https://api.openai.com/v1/chat/completions"

model = "gpt-4o-mini"

# Completion token budget, between 500 and 4000.
max_tokens = 1500

# Ask for maximum factual detail (statistics, dates, names, quotes).
include_facts = true

# Ask for structured output (headers, lists, emphasis).
structured_format = true

# Translate summaries into this language (ISO 639-1 code), e.g. "de".
# translate_to = "de"
"#;

impl Config {
  /// Load configuration from the given file, falling back to `pagesum.toml`
  /// in the working directory, then to built-in defaults. Environment
  /// variables override the file's API key either way.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let mut config = match path {
      Some(path) => Self::from_file(path)?,
      None => {
        let fallback = Path::new("pagesum.toml");
        if fallback.exists() {
          Self::from_file(fallback)?
        } else {
          debug!("No configuration file found, using defaults");
          Self::default()
        }
      },
    };

    for var in API_KEY_ENV_VARS {
      if let Ok(key) = env::var(var) {
        if !key.trim().is_empty() {
          debug!("Using API key from {var}");
          config.api_key = Some(key.trim().to_string());
          break;
        }
      }
    }

    config.validate()?;
    Ok(config)
  }

  fn from_file(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path).map_err(|e| {
      PagesumError::Config(format!(
        "Failed to read configuration file {}: {e}",
        path.display()
      ))
    })?;
    let config = toml::from_str(&content)?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
  }

  /// Check value ranges and warn about suspicious keys.
  fn validate(&self) -> Result<()> {
    if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&self.max_tokens) {
      return Err(PagesumError::Config(format!(
        "max_tokens must be between {MIN_MAX_TOKENS} and {MAX_MAX_TOKENS}, \
         got {}",
        self.max_tokens
      )));
    }

    if let Some(key) = &self.api_key {
      if !key.starts_with("sk-") {
        warn!("API key does not start with \"sk-\"; it may be invalid");
      }
    }

    Ok(())
  }

  /// The API key, or a configuration error telling the user how to set one.
  pub fn require_api_key(&self) -> Result<&str> {
    self
      .api_key
      .as_deref()
      .map(str::trim)
      .filter(|key| !key.is_empty())
      .ok_or_else(|| {
        PagesumError::Config(
          "No API key configured. Set PAGESUM_API_KEY, or add api_key to \
           pagesum.toml (see `pagesum init`)."
            .to_string(),
        )
      })
  }

  /// Write the annotated default configuration template.
  pub fn generate_default_config(path: &Path) -> Result<()> {
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::Config;

  #[test]
  fn defaults_are_sane() {
    let config = Config::default();
    assert_eq!(config.model, "gpt-4o-mini");
    assert_eq!(config.max_tokens, 1500);
    assert!(config.include_facts);
    assert!(config.structured_format);
    assert!(config.translate_to.is_none());
  }

  #[test]
  fn template_round_trips_through_the_parser() {
    let config: Config = toml::from_str(super::DEFAULT_CONFIG_TEMPLATE)
      .expect("default template must parse");
    assert_eq!(config.max_tokens, 1500);
    assert_eq!(config.model, "gpt-4o-mini");
  }

  #[test]
  fn partial_file_fills_in_defaults() {
    let config: Config = toml::from_str("model = \"gpt-4o\"")
      .expect("partial config must parse");
    assert_eq!(config.model, "gpt-4o");
    assert_eq!(config.max_tokens, 1500);
    assert!(config.structured_format);
  }

  #[test]
  fn out_of_range_token_budget_is_rejected() {
    let config: Config =
      toml::from_str("max_tokens = 100").expect("config must parse");
    assert!(config.validate().is_err());
    let config: Config =
      toml::from_str("max_tokens = 9000").expect("config must parse");
    assert!(config.validate().is_err());
  }

  #[test]
  fn file_loading_reads_values() {
    let mut file =
      tempfile::NamedTempFile::new().expect("temp file must be created");
    write!(file, "model = \"local-llama\"\nmax_tokens = 2000")
      .expect("temp file must be writable");
    let config =
      Config::load(Some(file.path())).expect("config must load from file");
    assert_eq!(config.model, "local-llama");
    assert_eq!(config.max_tokens, 2000);
  }

  #[test]
  fn missing_api_key_is_a_config_error() {
    let config = Config::default();
    assert!(config.require_api_key().is_err());
  }
}
