use std::collections::{hash_map::Entry, HashMap};

use bitcode::{Decode, Encode};
use itertools::Itertools;
use util::error::{XWordError, XWordResult};

use crate::{entry::DictEntry, word_list::WordList};

/// One occurrence of a letter: word `id` has it at `position`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode)]
struct LetterSlot {
  id: u32,
  position: u32,
}

/// A word that can cross another at a shared letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crossing<'a> {
  pub word: &'a str,
  pub position: u32,
}

#[derive(Debug, Encode, Decode)]
pub struct XWordDict {
  entries: Vec<DictEntry>,
  ids: HashMap<String, u32>,
  /// letter -> every (word, position) holding it, in dictionary order.
  letters: HashMap<char, Vec<LetterSlot>>,
  by_length: HashMap<u32, Vec<u32>>,
}

impl XWordDict {
  /// Builds the index. Words are upper-cased; entries that are still not
  /// two or more A-Z letters are skipped, and duplicates are merged.
  pub fn from_entries(entries: impl IntoIterator<Item = DictEntry>) -> XWordResult<Self> {
    let mut merged: Vec<DictEntry> = vec![];
    let mut ids = HashMap::new();

    for mut entry in entries {
      entry.word = DictEntry::canonicalize_word(&entry.word);
      if !DictEntry::is_valid_word(&entry.word) {
        log::warn!("Skipping dictionary entry \"{}\"", entry.word);
        continue;
      }

      match ids.entry(entry.word.clone()) {
        Entry::Occupied(existing) => {
          let existing: &mut DictEntry = &mut merged[*existing.get() as usize];
          for theme in entry.themes {
            if !existing.has_theme(&theme) {
              existing.themes.push(theme);
            }
          }
        }
        Entry::Vacant(slot) => {
          slot.insert(merged.len() as u32);
          entry.themes = entry.themes.into_iter().unique().collect();
          merged.push(entry);
        }
      }
    }

    if merged.is_empty() {
      return Err(XWordError::InvalidInput("Dictionary contains no usable words".to_owned()).into());
    }

    let mut letters: HashMap<char, Vec<LetterSlot>> = HashMap::new();
    let mut by_length: HashMap<u32, Vec<u32>> = HashMap::new();
    for (id, entry) in merged.iter().enumerate() {
      let id = id as u32;
      for (position, letter) in entry.word.chars().enumerate() {
        letters
          .entry(letter)
          .or_default()
          .push(LetterSlot { id, position: position as u32 });
      }
      by_length
        .entry(entry.word.len() as u32)
        .or_default()
        .push(id);
    }

    log::debug!(
      "Indexed {} words, {} letter occurrences",
      merged.len(),
      letters.values().map(Vec::len).sum::<usize>()
    );

    Ok(Self { entries: merged, ids, letters, by_length })
  }

  pub fn from_word_list(list: WordList) -> XWordResult<Self> {
    Self::from_word_lists([list])
  }

  /// Merges several lists. A word listed more than once keeps the metadata
  /// of its first list and the union of all its themes.
  pub fn from_word_lists(lists: impl IntoIterator<Item = WordList>) -> XWordResult<Self> {
    Self::from_entries(lists.into_iter().flat_map(WordList::into_entries))
  }

  pub fn parse_json(json: &str) -> XWordResult<Self> {
    Self::from_word_list(WordList::parse_json(json)?)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Exact, case-sensitive membership.
  pub fn contains(&self, word: &str) -> bool {
    self.ids.contains_key(word)
  }

  pub fn entry(&self, word: &str) -> Option<&DictEntry> {
    self
      .ids
      .get(word)
      .and_then(|&id| self.entries.get(id as usize))
  }

  pub fn has_theme(&self, word: &str, theme: &str) -> bool {
    self.entry(word).is_some_and(|entry| entry.has_theme(theme))
  }

  /// All words in dictionary order.
  pub fn words(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|entry| entry.word.as_str())
  }

  pub fn by_length(&self, length: u32) -> Vec<&str> {
    self
      .by_length
      .get(&length)
      .into_iter()
      .flatten()
      .filter_map(|&id| self.entries.get(id as usize))
      .map(|entry| entry.word.as_str())
      .collect()
  }

  /// Every other word containing `word[position]`, with the position where it
  /// does. Empty for unknown words and out-of-range positions.
  pub fn crossing_words<'a>(
    &'a self,
    word: &str,
    position: u32,
  ) -> impl Iterator<Item = Crossing<'a>> + 'a {
    self
      .ids
      .get(word)
      .and_then(|&id| {
        word
          .chars()
          .nth(position as usize)
          .and_then(|letter| self.letters.get(&letter))
          .map(|slots| (id, slots))
      })
      .into_iter()
      .flat_map(move |(id, slots)| {
        slots
          .iter()
          .filter(move |slot| slot.id != id)
          .filter_map(move |slot| {
            self.entries.get(slot.id as usize).map(|entry| Crossing {
              word: entry.word.as_str(),
              position: slot.position,
            })
          })
      })
  }
}
