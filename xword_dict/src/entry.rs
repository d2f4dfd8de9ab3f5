use std::{fmt::Display, str::FromStr};

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use util::error::XWordError;

#[derive(
  Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  #[default]
  Medium,
  Hard,
}

impl Display for Difficulty {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Difficulty::Easy => write!(f, "easy"),
      Difficulty::Medium => write!(f, "medium"),
      Difficulty::Hard => write!(f, "hard"),
    }
  }
}

impl FromStr for Difficulty {
  type Err = XWordError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "easy" => Ok(Difficulty::Easy),
      "medium" => Ok(Difficulty::Medium),
      "hard" => Ok(Difficulty::Hard),
      other => Err(XWordError::Parse(format!("Unknown difficulty \"{other}\""))),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct DictEntry {
  pub word: String,
  pub themes: Vec<String>,
  pub category: String,
  pub difficulty: Difficulty,
}

impl DictEntry {
  pub fn new(word: impl Into<String>) -> Self {
    Self {
      word: word.into(),
      themes: vec![],
      category: String::new(),
      difficulty: Difficulty::default(),
    }
  }

  pub fn with_themes<S: Into<String>>(mut self, themes: impl IntoIterator<Item = S>) -> Self {
    self.themes = themes.into_iter().map(Into::into).collect();
    self
  }

  pub fn canonicalize_word(word: &str) -> String {
    word.trim().to_ascii_uppercase()
  }

  /// Words are at least two letters, A-Z only.
  pub fn is_valid_word(word: &str) -> bool {
    word.len() >= 2 && word.chars().all(|c| c.is_ascii_uppercase())
  }

  pub fn has_theme(&self, theme: &str) -> bool {
    self
      .themes
      .iter()
      .any(|tag| tag.eq_ignore_ascii_case(theme.trim()))
  }
}

#[cfg(test)]
mod tests {
  use googletest::prelude::*;

  use super::{DictEntry, Difficulty};

  #[gtest]
  fn test_valid_words() {
    expect_true!(DictEntry::is_valid_word("LOVE"));
    expect_true!(DictEntry::is_valid_word("OK"));
    expect_false!(DictEntry::is_valid_word("A"));
    expect_false!(DictEntry::is_valid_word("love"));
    expect_false!(DictEntry::is_valid_word("ICE CREAM"));
    expect_false!(DictEntry::is_valid_word("CAFÉ"));
  }

  #[gtest]
  fn test_has_theme() {
    let entry = DictEntry::new("LOVE").with_themes(["Love", "romance"]);
    expect_true!(entry.has_theme("love"));
    expect_true!(entry.has_theme(" ROMANCE "));
    expect_false!(entry.has_theme("war"));
  }

  #[gtest]
  fn test_difficulty_from_str() {
    expect_eq!("Hard".parse::<Difficulty>().ok(), Some(Difficulty::Hard));
    expect_that!("extreme".parse::<Difficulty>(), err(anything()));
  }
}
