use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use util::error::{XWordError, XWordResult};

use crate::entry::{DictEntry, Difficulty};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WordMeta {
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub difficulty: Difficulty,
  /// When absent the word inherits the list's theme.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub themes: Option<Vec<String>>,
}

/// On-disk word list:
///
/// ```json
/// { "theme": "love", "words": { "LOVE": { "category": "emotion", "difficulty": "easy" } } }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WordList {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub theme: Option<String>,
  pub words: BTreeMap<String, WordMeta>,
}

impl WordList {
  pub fn parse_json(json: &str) -> XWordResult<Self> {
    serde_json::from_str(json)
      .map_err(|err| XWordError::Parse(format!("Failed to parse word list: {err}")).into())
  }

  pub fn into_entries(self) -> impl Iterator<Item = DictEntry> {
    let theme = self.theme;
    self.words.into_iter().map(move |(word, meta)| DictEntry {
      word,
      themes: meta
        .themes
        .unwrap_or_else(|| theme.iter().cloned().collect()),
      category: meta.category,
      difficulty: meta.difficulty,
    })
  }
}
