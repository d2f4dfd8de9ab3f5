use std::{collections::HashMap, time::Duration};

use common::crossword::fallback_clue;
use itertools::Itertools;
use serde_json::Value;
use tokio::time::timeout;
use util::error::{XWordError, XWordResult};
use xword_dict::Difficulty;

use crate::{
  cache::{ClueCache, ClueKey},
  config::ClueConfig,
  relay::CompletionSource,
};

fn difficulty_guidance(difficulty: Difficulty) -> &'static str {
  match difficulty {
    Difficulty::Easy => "Write plain, direct clues that most solvers will get.",
    Difficulty::Medium => "Write moderately tricky clues with some wordplay or indirection.",
    Difficulty::Hard => "Write hard clues using clever wordplay, trivia or cryptic elements.",
  }
}

fn build_prompt(words: &[String], theme: &str, difficulty: Difficulty) -> String {
  format!(
    "Write crossword clues for these words, themed around \"{theme}\":\n\n\
     Words: [{}]\n\n\
     Difficulty: {difficulty}\n\
     {}\n\n\
     Keep each clue short (3 to 8 words) and tie it to the theme when you can. \
     Mix definitions, fill-in-the-blank and trivia.\n\n\
     Answer with ONLY a JSON object mapping each word to its clue, for example \
     {{\"WORD\": \"Clue for word\"}}.",
    words.iter().map(|word| format!("\"{word}\"")).join(", "),
    difficulty_guidance(difficulty)
  )
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
fn strip_code_fence(reply: &str) -> &str {
  let reply = reply.trim();
  let Some(inner) = reply.strip_prefix("```") else {
    return reply;
  };
  let inner = match inner.split_once('\n') {
    Some((_tag, rest)) => rest,
    None => inner,
  };
  inner.trim_end().strip_suffix("```").unwrap_or(inner).trim()
}

/// Parses a `{"WORD": "clue"}` reply. Keys are upper-cased and non-string
/// values are dropped.
fn parse_clues(reply: &str) -> XWordResult<HashMap<String, String>> {
  let object: HashMap<String, Value> = serde_json::from_str(strip_code_fence(reply))
    .map_err(|err| XWordError::Clue(format!("Clue reply is not a JSON object: {err}")))?;
  Ok(
    object
      .into_iter()
      .filter_map(|(word, clue)| match clue {
        Value::String(clue) => Some((word.trim().to_ascii_uppercase(), clue)),
        _ => None,
      })
      .collect(),
  )
}

/// Trims, drops a leading and a trailing quote and capitalizes the first
/// letter.
pub fn clean_clue(clue: &str) -> String {
  let quotes = ['"', '\''];
  let clue = clue.trim();
  let clue = clue.strip_prefix(quotes).unwrap_or(clue);
  let clue = clue.strip_suffix(quotes).unwrap_or(clue).trim();
  let mut chars = clue.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

pub struct ClueGenerator<S> {
  source: S,
  cache: Option<ClueCache>,
  timeout: Duration,
  batch_size: usize,
}

impl<S: CompletionSource> ClueGenerator<S> {
  pub fn new(source: S, config: &ClueConfig) -> Self {
    Self {
      source,
      cache: config
        .cache
        .enabled
        .then(|| ClueCache::new(config.cache_ttl())),
      timeout: config.timeout(),
      batch_size: config.batch_size.max(1),
    }
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  pub fn cache(&self) -> Option<&ClueCache> {
    self.cache.as_ref()
  }

  pub async fn generate_clue(&self, word: &str, theme: &str, difficulty: Difficulty) -> String {
    let word = word.trim().to_ascii_uppercase();
    self
      .generate_clues(&[word.as_str()], theme, difficulty)
      .await
      .remove(&word)
      .unwrap_or_else(|| fallback_clue(&word))
  }

  /// Clues for every word, keyed by the upper-cased word. Words the service
  /// cannot clue get the fallback clue, so every word is present.
  pub async fn generate_clues(
    &self,
    words: &[&str],
    theme: &str,
    difficulty: Difficulty,
  ) -> HashMap<String, String> {
    if let Some(cache) = &self.cache {
      let remaining = cache.purge_expired().await;
      log::trace!("{remaining} cached clues after purge");
    }

    let mut clues = HashMap::new();
    let mut missing = vec![];
    for word in words.iter().map(|word| word.trim().to_ascii_uppercase()).unique() {
      let cached = match &self.cache {
        Some(cache) => cache.get(&ClueKey::new(&word, theme, difficulty)).await,
        None => None,
      };
      match cached {
        Some(clue) => {
          clues.insert(word, clue);
        }
        None => missing.push(word),
      }
    }
    log::debug!(
      "{} clues cached, {} to generate",
      clues.len(),
      missing.len()
    );

    let batch_count = missing.len().div_ceil(self.batch_size);
    for (idx, batch) in missing.chunks(self.batch_size).enumerate() {
      log::info!("Generating clue batch {}/{batch_count}", idx + 1);
      clues.extend(self.generate_batch(batch, theme, difficulty).await);
    }
    clues
  }

  async fn request_batch(
    &self,
    words: &[String],
    theme: &str,
    difficulty: Difficulty,
  ) -> XWordResult<HashMap<String, String>> {
    let prompt = build_prompt(words, theme, difficulty);
    let reply = timeout(self.timeout, self.source.complete(&prompt))
      .await
      .map_err(|_| {
        XWordError::Clue(format!("Clue request timed out after {:?}", self.timeout))
      })??;
    parse_clues(&reply)
  }

  async fn generate_batch(
    &self,
    words: &[String],
    theme: &str,
    difficulty: Difficulty,
  ) -> HashMap<String, String> {
    let generated = match self.request_batch(words, theme, difficulty).await {
      Ok(generated) => generated,
      Err(err) => {
        log::warn!("Falling back to placeholder clues for {} words: {err}", words.len());
        HashMap::new()
      }
    };

    let mut clues = HashMap::new();
    for word in words {
      match generated.get(word).map(|clue| clean_clue(clue)) {
        Some(clue) if !clue.is_empty() => {
          if let Some(cache) = &self.cache {
            cache
              .insert(ClueKey::new(word, theme, difficulty), clue.clone())
              .await;
          }
          clues.insert(word.clone(), clue);
        }
        _ => {
          if !generated.is_empty() {
            log::warn!("No clue returned for {word}");
          }
          clues.insert(word.clone(), fallback_clue(word));
        }
      }
    }
    clues
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use std::{collections::VecDeque, time::Duration};

  use googletest::prelude::*;
  use tokio::sync::Mutex;
  use util::error::{XWordError, XWordResult};
  use xword_dict::Difficulty;

  use crate::{config::ClueConfig, relay::CompletionSource};

  use super::{clean_clue, parse_clues, strip_code_fence, ClueGenerator};

  /// Replays canned replies in order and records every prompt.
  #[derive(Default)]
  struct ScriptedSource {
    replies: Mutex<VecDeque<XWordResult<String>>>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
  }

  impl ScriptedSource {
    fn new(replies: impl IntoIterator<Item = XWordResult<String>>) -> Self {
      Self { replies: Mutex::new(replies.into_iter().collect()), ..Self::default() }
    }

    fn ok(reply: &str) -> XWordResult<String> {
      Ok(reply.to_owned())
    }
  }

  impl CompletionSource for ScriptedSource {
    async fn complete(&self, prompt: &str) -> XWordResult<String> {
      self.prompts.lock().await.push(prompt.to_owned());
      if let Some(delay) = self.delay {
        tokio::time::sleep(delay).await;
      }
      self
        .replies
        .lock()
        .await
        .pop_front()
        .unwrap_or_else(|| Err(XWordError::Clue("no scripted reply".to_owned()).into()))
    }
  }

  fn config() -> ClueConfig {
    ClueConfig { timeout_secs: 5, ..ClueConfig::default() }
  }

  #[gtest]
  fn test_strip_code_fence() {
    expect_eq!(strip_code_fence("```json\n{\"A\": \"b\"}\n```"), "{\"A\": \"b\"}");
    expect_eq!(strip_code_fence("```\n{}\n```\n"), "{}");
    expect_eq!(strip_code_fence("  {}  "), "{}");
  }

  #[gtest]
  fn test_parse_clues() {
    let clues = parse_clues("```json\n{\"love\": \"Affection\", \"KISS\": 3}\n```").unwrap();
    expect_eq!(clues.len(), 1);
    expect_eq!(clues.get("LOVE").map(String::as_str), Some("Affection"));
    expect_that!(parse_clues("Sure! Here are your clues."), err(anything()));
    expect_that!(parse_clues("[\"LOVE\"]"), err(anything()));
  }

  #[gtest]
  fn test_clean_clue() {
    expect_eq!(clean_clue("  \"deep affection\" "), "Deep affection");
    expect_eq!(clean_clue("'tis the season"), "Tis the season");
    expect_eq!(clean_clue("ends with quote\""), "Ends with quote");
    expect_eq!(clean_clue("  "), "");
    expect_eq!(clean_clue("élan"), "Élan");
  }

  #[gtest]
  #[tokio::test]
  async fn test_generate_clues() {
    let source = ScriptedSource::new([ScriptedSource::ok(
      "```json\n{\"LOVE\": \"\\\"deep affection\\\"\", \"DOVE\": \"peace bird\"}\n```",
    )]);
    let generator = ClueGenerator::new(source, &config());
    let clues = generator
      .generate_clues(&["love", "DOVE", "KISS", "love"], "romance", Difficulty::Easy)
      .await;

    expect_eq!(clues.len(), 3);
    expect_eq!(clues["LOVE"].as_str(), "Deep affection");
    expect_eq!(clues["DOVE"].as_str(), "Peace bird");
    expect_eq!(clues["KISS"].as_str(), "KISS (4)");

    let prompts = generator.source().prompts.lock().await;
    expect_eq!(prompts.len(), 1);
    expect_that!(prompts[0].as_str(), contains_substring("\"LOVE\", \"DOVE\", \"KISS\""));
    expect_that!(prompts[0].as_str(), contains_substring("\"romance\""));
    expect_that!(prompts[0].as_str(), contains_substring("Difficulty: easy"));
  }

  #[gtest]
  #[tokio::test]
  async fn test_cache_skips_repeat_requests() {
    let source = ScriptedSource::new([
      ScriptedSource::ok("{\"LOVE\": \"Affection\"}"),
      ScriptedSource::ok("{\"LOVE\": \"Other\"}"),
    ]);
    let generator = ClueGenerator::new(source, &config());
    expect_eq!(generator.generate_clue("love", "love", Difficulty::Medium).await, "Affection");
    expect_eq!(generator.generate_clue("LOVE", "love", Difficulty::Medium).await, "Affection");
    expect_eq!(generator.source().prompts.lock().await.len(), 1);

    expect_eq!(generator.generate_clue("LOVE", "love", Difficulty::Hard).await, "Other");
    expect_eq!(generator.source().prompts.lock().await.len(), 2);
  }

  #[gtest]
  #[tokio::test]
  async fn test_fallbacks_are_not_cached() {
    let source = ScriptedSource::new([
      Err(XWordError::Clue("relay down".to_owned()).into()),
      ScriptedSource::ok("{\"LOVE\": \"Affection\"}"),
    ]);
    let generator = ClueGenerator::new(source, &config());
    expect_eq!(generator.generate_clue("LOVE", "love", Difficulty::Medium).await, "LOVE (4)");
    expect_true!(generator.cache().unwrap().is_empty().await);
    expect_eq!(generator.generate_clue("LOVE", "love", Difficulty::Medium).await, "Affection");
    expect_eq!(generator.cache().unwrap().len().await, 1);
  }

  #[gtest]
  #[tokio::test]
  async fn test_malformed_reply_falls_back() {
    let source = ScriptedSource::new([ScriptedSource::ok("LOVE: affection")]);
    let generator = ClueGenerator::new(source, &config());
    let clues = generator
      .generate_clues(&["LOVE", "OVER"], "love", Difficulty::Medium)
      .await;
    expect_eq!(clues["LOVE"].as_str(), "LOVE (4)");
    expect_eq!(clues["OVER"].as_str(), "OVER (4)");
  }

  #[gtest]
  #[tokio::test]
  async fn test_timeout_falls_back() {
    let source = ScriptedSource {
      delay: Some(Duration::from_secs(5)),
      ..ScriptedSource::new([ScriptedSource::ok("{\"LOVE\": \"Affection\"}")])
    };
    let mut config = config();
    config.timeout_secs = 0;
    let generator = ClueGenerator::new(source, &config);
    expect_eq!(generator.generate_clue("LOVE", "love", Difficulty::Medium).await, "LOVE (4)");
  }

  #[gtest]
  #[tokio::test]
  async fn test_batches() {
    let words: Vec<String> = (b'A'..=b'T').map(|c| format!("W{}", char::from(c))).collect();
    let replies = words.chunks(15).map(|batch| {
      let object: serde_json::Map<_, _> = batch
        .iter()
        .map(|word| (word.clone(), serde_json::Value::from(format!("clue {word}"))))
        .collect();
      Ok(serde_json::Value::Object(object).to_string())
    });

    let generator = ClueGenerator::new(ScriptedSource::new(replies), &config());
    let refs: Vec<&str> = words.iter().map(String::as_str).collect();
    let clues = generator.generate_clues(&refs, "x", Difficulty::Medium).await;

    expect_eq!(clues.len(), 20);
    expect_eq!(clues["WA"].as_str(), "Clue WA");
    expect_eq!(clues["WT"].as_str(), "Clue WT");
    expect_eq!(generator.source().prompts.lock().await.len(), 2);
  }

  #[gtest]
  #[tokio::test]
  async fn test_expired_clues_are_purged() {
    let source = ScriptedSource::new([
      ScriptedSource::ok("{\"LOVE\": \"Affection\"}"),
      ScriptedSource::ok("{\"DOVE\": \"Peace bird\"}"),
    ]);
    let mut config = config();
    config.cache.ttl_minutes = 0;
    let generator = ClueGenerator::new(source, &config);

    generator.generate_clues(&["LOVE"], "love", Difficulty::Medium).await;
    expect_eq!(generator.cache().unwrap().len().await, 1);
    generator.generate_clues(&["DOVE"], "love", Difficulty::Medium).await;
    expect_eq!(generator.cache().unwrap().len().await, 1);
    expect_eq!(generator.source().prompts.lock().await.len(), 2);
  }

  #[gtest]
  #[tokio::test]
  async fn test_disabled_cache() {
    let source = ScriptedSource::new([
      ScriptedSource::ok("{\"LOVE\": \"Affection\"}"),
      ScriptedSource::ok("{\"LOVE\": \"Affection\"}"),
    ]);
    let mut config = config();
    config.cache.enabled = false;
    let generator = ClueGenerator::new(source, &config);
    generator.generate_clue("LOVE", "love", Difficulty::Medium).await;
    generator.generate_clue("LOVE", "love", Difficulty::Medium).await;
    expect_true!(generator.cache().is_none());
    expect_eq!(generator.source().prompts.lock().await.len(), 2);
  }
}
