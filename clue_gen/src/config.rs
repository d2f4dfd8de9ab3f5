use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use util::error::{XWordError, XWordResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
  pub host: String,
  pub port: u16,
  pub path: String,
}

impl Default for RelayConfig {
  fn default() -> Self {
    Self { host: "127.0.0.1".to_owned(), port: 3001, path: "/api/chat".to_owned() }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
  pub model: String,
  /// Retried once when a request with `model` fails.
  pub fallback_model: String,
  pub temperature: f64,
  pub max_tokens: u32,
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      model: "gpt-4o-mini".to_owned(),
      fallback_model: "gpt-3.5-turbo".to_owned(),
      temperature: 0.7,
      max_tokens: 800,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub enabled: bool,
  pub ttl_minutes: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { enabled: true, ttl_minutes: 60 }
  }
}

/// Clue generation settings. Every field is optional in the JSON file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClueConfig {
  pub relay: RelayConfig,
  #[serde(alias = "openai")]
  pub model: ModelConfig,
  pub cache: CacheConfig,
  pub timeout_secs: u64,
  pub batch_size: usize,
}

impl Default for ClueConfig {
  fn default() -> Self {
    Self {
      relay: RelayConfig::default(),
      model: ModelConfig::default(),
      cache: CacheConfig::default(),
      timeout_secs: 30,
      batch_size: 15,
    }
  }
}

impl ClueConfig {
  pub fn parse_json(json: &str) -> XWordResult<Self> {
    let config: Self = serde_json::from_str(json)
      .map_err(|err| XWordError::Parse(format!("Failed to parse clue config: {err}")))?;
    if config.batch_size == 0 {
      return Err(XWordError::InvalidInput("Clue batch size must be at least 1".to_owned()).into());
    }
    Ok(config)
  }

  pub fn load(path: impl AsRef<Path>) -> XWordResult<Self> {
    Self::parse_json(&fs::read_to_string(path)?)
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  pub fn cache_ttl(&self) -> Duration {
    Duration::from_secs(self.cache.ttl_minutes * 60)
  }
}
