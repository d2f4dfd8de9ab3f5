use std::{
  collections::HashMap,
  time::{Duration, Instant},
};

use tokio::sync::Mutex;
use xword_dict::Difficulty;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClueKey {
  pub word: String,
  pub theme: String,
  pub difficulty: Difficulty,
}

impl ClueKey {
  pub fn new(word: &str, theme: &str, difficulty: Difficulty) -> Self {
    Self {
      word: word.to_ascii_uppercase(),
      theme: theme.trim().to_ascii_lowercase(),
      difficulty,
    }
  }
}

struct CachedClue {
  clue: String,
  stored: Instant,
}

/// Generated clues, each kept for `ttl` after it was stored.
pub struct ClueCache {
  ttl: Duration,
  entries: Mutex<HashMap<ClueKey, CachedClue>>,
}

impl ClueCache {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl, entries: Mutex::new(HashMap::new()) }
  }

  async fn get_at(&self, key: &ClueKey, now: Instant) -> Option<String> {
    let mut entries = self.entries.lock().await;
    let cached = entries.get(key)?;
    if now.saturating_duration_since(cached.stored) >= self.ttl {
      entries.remove(key);
      return None;
    }
    Some(cached.clue.clone())
  }

  pub async fn get(&self, key: &ClueKey) -> Option<String> {
    self.get_at(key, Instant::now()).await
  }

  pub async fn insert(&self, key: ClueKey, clue: String) {
    self
      .entries
      .lock()
      .await
      .insert(key, CachedClue { clue, stored: Instant::now() });
  }

  /// Drops every expired entry. Returns how many remain.
  pub async fn purge_expired(&self) -> usize {
    let now = Instant::now();
    let mut entries = self.entries.lock().await;
    entries.retain(|_, cached| now.saturating_duration_since(cached.stored) < self.ttl);
    entries.len()
  }

  pub async fn len(&self) -> usize {
    self.entries.lock().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.entries.lock().await.is_empty()
  }
}
