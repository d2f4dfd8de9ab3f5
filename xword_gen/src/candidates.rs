use std::collections::HashSet;

use common::{
  board::{Board, Direction},
  placement::Placement,
};
use itertools::Itertools;
use rand::{Rng, RngCore};
use util::pos::Pos;
use xword_dict::XWordDict;

use crate::validator::PlacementValidator;

const THEME_BONUS: f64 = 100.0;
const OVERLAP_BONUS: f64 = 20.0;
const LENGTH_WEIGHT: f64 = 3.0;
const COMMON_LETTERS: &str = "EARSTOIN";

#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
  pub placement: Placement,
  pub score: f64,
}

/// Random noise added to every candidate score.
pub struct Jitter<'r> {
  rng: &'r mut dyn RngCore,
  amount: f64,
}

impl<'r> Jitter<'r> {
  pub fn new(rng: &'r mut dyn RngCore, amount: f64) -> Self {
    Self { rng, amount }
  }

  fn sample(&mut self) -> f64 {
    self.rng.random::<f64>() * self.amount
  }
}

#[derive(Clone, Copy)]
pub struct Scorer<'a> {
  dict: &'a XWordDict,
  theme: &'a str,
}

impl<'a> Scorer<'a> {
  pub fn new(dict: &'a XWordDict, theme: &'a str) -> Self {
    Self { dict, theme }
  }

  /// Deterministic part of the score: theme bonus, one bonus per letter
  /// shared with the board, word length and letter commonness.
  pub fn score(&self, board: &Board, placement: &Placement) -> f64 {
    let theme = if !self.theme.trim().is_empty() && self.dict.has_theme(&placement.word, self.theme)
    {
      THEME_BONUS
    } else {
      0.0
    };
    let overlaps = placement
      .cells()
      .filter(|&(pos, _)| board.is_letter(pos))
      .count() as f64;
    let common = placement
      .word
      .chars()
      .filter(|&c| COMMON_LETTERS.contains(c))
      .count() as f64;

    theme + overlaps * OVERLAP_BONUS + placement.len() as f64 * LENGTH_WEIGHT + common
  }
}

pub struct CandidateGenerator<'a> {
  dict: &'a XWordDict,
  validator: PlacementValidator<'a>,
  scorer: Scorer<'a>,
  themed: Vec<&'a str>,
  general: Vec<&'a str>,
  general_word_limit: Option<usize>,
}

impl<'a> CandidateGenerator<'a> {
  /// `general_word_limit` caps how many unused non-themed words each step
  /// considers.
  pub fn new(
    dict: &'a XWordDict,
    theme: &'a str,
    min_validated_run: u32,
    general_word_limit: Option<usize>,
  ) -> Self {
    let themed = |word: &&str| !theme.trim().is_empty() && dict.has_theme(word, theme);
    let (themed, general): (Vec<_>, Vec<_>) = dict.words().partition(themed);
    log::debug!(
      "{} themed and {} general words for theme \"{theme}\"",
      themed.len(),
      general.len()
    );

    Self {
      dict,
      validator: PlacementValidator::new(dict, min_validated_run),
      scorer: Scorer::new(dict, theme),
      themed,
      general,
      general_word_limit,
    }
  }

  pub fn validator(&self) -> &PlacementValidator<'a> {
    &self.validator
  }

  pub fn scorer(&self) -> &Scorer<'a> {
    &self.scorer
  }

  /// Unused themed words, then the first `general_word_limit` unused general
  /// words, in dictionary order.
  pub fn available_words(&self, used: &HashSet<String>) -> Vec<&'a str> {
    let unused = |word: &&str| !used.contains(*word);
    self
      .themed
      .iter()
      .copied()
      .filter(unused)
      .chain(
        self
          .general
          .iter()
          .copied()
          .filter(unused)
          .take(self.general_word_limit.unwrap_or(usize::MAX)),
      )
      .collect()
  }

  fn seed_placements<'s>(
    board: &'s Board,
    available: &'s [&'a str],
  ) -> impl Iterator<Item = Placement> + 's {
    let center = board.center();
    available.iter().flat_map(move |&word| {
      let offset = |mid: i32| (mid - word.len() as i32 / 2).max(0);
      [
        Placement::new(word, Pos::at(center.row(), offset(center.col())), Direction::Across),
        Placement::new(word, Pos::at(offset(center.row()), center.col()), Direction::Down),
      ]
    })
  }

  fn crossing_placements<'s>(
    &'s self,
    board: &'s Board,
    placed: &'s [Placement],
    allowed: &'s HashSet<&'a str>,
  ) -> impl Iterator<Item = Placement> + 's {
    placed.iter().flat_map(move |anchor| {
      let direction = anchor.direction.perpendicular();
      anchor
        .cells()
        .enumerate()
        .flat_map(move |(idx, (cell, _))| {
          self
            .dict
            .crossing_words(&anchor.word, idx as u32)
            .filter(move |crossing| allowed.contains(crossing.word))
            .map(move |crossing| {
              Placement::new(
                crossing.word,
                cell - crossing.position as i32 * direction.step(),
                direction,
              )
            })
        })
        .filter(move |placement| board.in_bounds(placement.pos))
    })
  }

  /// Every legal placement for the next step, best first. Ties keep the order
  /// in which placements were found, and a placement reachable from several
  /// anchors is listed once.
  pub fn find_candidates(
    &self,
    board: &Board,
    placed: &[Placement],
    used: &HashSet<String>,
    mut jitter: Option<&mut Jitter<'_>>,
  ) -> Vec<Candidate> {
    let available = self.available_words(used);
    let allowed: HashSet<&str> = available.iter().copied().collect();
    let placements: Box<dyn Iterator<Item = Placement> + '_> = if placed.is_empty() {
      Box::new(Self::seed_placements(board, &available))
    } else {
      Box::new(self.crossing_placements(board, placed, &allowed))
    };

    placements
      .unique()
      .filter(|placement| self.validator.can_place(board, placement))
      .map(|placement| {
        let noise = jitter.as_mut().map_or(0.0, |jitter| jitter.sample());
        Candidate { score: self.scorer.score(board, &placement) + noise, placement }
      })
      .sorted_by(|a, b| b.score.total_cmp(&a.score))
      .collect()
  }
}
