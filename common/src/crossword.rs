use std::{collections::HashMap, fmt::Write};

use itertools::Itertools;
use serde::Serialize;
use util::{error::XWordResult, pos::Pos};

use crate::board::{Board, Direction, XWordTile};

/// A numbered answer slot, as printed next to the clue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClueSlot {
  pub number: u32,
  pub pos: Pos,
  pub direction: Direction,
  pub answer: String,
  pub clue: Option<String>,
}

impl ClueSlot {
  pub fn len(&self) -> usize {
    self.answer.chars().count()
  }

  pub fn is_empty(&self) -> bool {
    self.answer.is_empty()
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct XwSize {
  pub rows: u32,
  pub cols: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct XwClues {
  pub across: Vec<String>,
  pub down: Vec<String>,
}

/// Puzzle file layout understood by the Phil crossword editor.
#[derive(Clone, Debug, Serialize)]
pub struct XwPuzzle {
  pub title: String,
  pub author: String,
  pub size: XwSize,
  pub grid: Vec<String>,
  pub clues: XwClues,
}

/// Placeholder used whenever no real clue is available for an answer.
pub fn fallback_clue(answer: &str) -> String {
  format!("{answer} ({})", answer.chars().count())
}

#[derive(Clone, Debug)]
pub struct Crossword {
  board: Board,
  slots: Vec<ClueSlot>,
}

impl Crossword {
  fn starts_slot(board: &Board, pos: Pos, direction: Direction) -> bool {
    let step = direction.step();
    board.is_letter(pos) && !board.is_letter(pos - step) && board.is_letter(pos + step)
  }

  /// Numbers every slot start in row-major order. A cell that starts both an
  /// across and a down answer gets a single number.
  fn build_slots(board: &Board) -> Vec<ClueSlot> {
    board
      .grid()
      .positions()
      .filter_map(|pos| {
        let directions: Vec<_> = Direction::ALL
          .into_iter()
          .filter(|&direction| Self::starts_slot(board, pos, direction))
          .collect();
        (!directions.is_empty()).then_some((pos, directions))
      })
      .zip(1..)
      .flat_map(|((pos, directions), number)| {
        directions.into_iter().map(move |direction| ClueSlot {
          number,
          pos,
          direction,
          answer: board.run_at(pos, direction, None).text,
          clue: None,
        })
      })
      .collect()
  }

  pub fn from_board(board: Board) -> Self {
    let slots = Self::build_slots(&board);
    Self { board, slots }
  }

  pub fn board(&self) -> &Board {
    &self.board
  }

  pub fn slots(&self) -> &[ClueSlot] {
    &self.slots
  }

  pub fn slots_in(&self, direction: Direction) -> impl Iterator<Item = &ClueSlot> {
    self
      .slots
      .iter()
      .filter(move |slot| slot.direction == direction)
  }

  /// Distinct answers in slot order.
  pub fn answers(&self) -> Vec<String> {
    self
      .slots
      .iter()
      .map(|slot| slot.answer.clone())
      .unique()
      .collect()
  }

  /// Sets the clue of every slot whose answer is `answer`.
  pub fn set_clue(&mut self, answer: &str, clue: impl Into<String>) -> usize {
    let clue = clue.into();
    self
      .slots
      .iter_mut()
      .filter(|slot| slot.answer == answer)
      .map(|slot| slot.clue = Some(clue.clone()))
      .count()
  }

  /// Attaches clues by answer text. Returns the number of slots annotated.
  pub fn apply_clues(&mut self, clues: &HashMap<String, String>) -> usize {
    self
      .slots
      .iter_mut()
      .filter_map(|slot| {
        clues
          .get(&slot.answer)
          .map(|clue| slot.clue = Some(clue.clone()))
      })
      .count()
  }

  fn clue_line(slot: &ClueSlot) -> String {
    match &slot.clue {
      Some(clue) => format!("{}. {clue}", slot.number),
      None if slot.len() == 2 => format!("{}. {} (abbreviation)", slot.number, slot.answer),
      None => format!("{}. {}", slot.number, fallback_clue(&slot.answer)),
    }
  }

  pub fn to_xw(&self, title: &str, author: &str) -> XwPuzzle {
    XwPuzzle {
      title: title.to_owned(),
      author: author.to_owned(),
      size: XwSize { rows: self.board.rows(), cols: self.board.cols() },
      grid: self
        .board
        .grid()
        .iter()
        .map(|tile| match tile {
          XWordTile::Letter(c) => c.to_string(),
          XWordTile::Empty => " ".to_owned(),
          XWordTile::Wall => ".".to_owned(),
        })
        .collect(),
      clues: XwClues {
        across: self.slots_in(Direction::Across).map(Self::clue_line).collect(),
        down: self.slots_in(Direction::Down).map(Self::clue_line).collect(),
      },
    }
  }

  pub fn to_markdown(&self, title: &str, theme: &str) -> XWordResult<String> {
    let mut md = String::new();
    let long_words = self.slots.iter().filter(|slot| slot.len() >= 3).count();
    let two_letters = self.slots.len() - long_words;

    writeln!(md, "# {title}\n")?;
    writeln!(md, "**Theme:** \"{theme}\"")?;
    writeln!(
      md,
      "**Size:** {}×{} ({} cells)\n",
      self.board.rows(),
      self.board.cols(),
      self.board.grid().cell_count()
    )?;
    writeln!(md, "## Grid\n\n```\n{}\n```\n", self.board)?;

    writeln!(md, "## Statistics\n")?;
    writeln!(md, "- **Total Sequences:** {}", self.slots.len())?;
    writeln!(md, "- **3+ Letter Words:** {long_words}")?;
    writeln!(md, "- **2-Letter Abbreviations:** {two_letters}")?;
    writeln!(md, "- **Coverage:** {:.1}%\n", self.board.coverage())?;

    for (heading, direction) in [("Across", Direction::Across), ("Down", Direction::Down)] {
      writeln!(md, "## {heading}\n")?;
      for slot in self.slots_in(direction) {
        let clue = slot
          .clue
          .clone()
          .unwrap_or_else(|| fallback_clue(&slot.answer));
        writeln!(md, "- **{}. {}**: {clue}", slot.number, slot.answer)?;
      }
      writeln!(md)?;
    }

    Ok(md)
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use std::collections::HashMap;

  use googletest::prelude::*;
  use util::pos::Pos;

  use crate::board::{Board, Direction};

  use super::{ClueSlot, Crossword};

  fn sample() -> Crossword {
    Crossword::from_board(
      Board::from_layout(
        "LOVE_
         I__V_
         VERY_
         E____",
      )
      .unwrap(),
    )
  }

  #[gtest]
  fn test_numbering() {
    let xword = sample();
    let slots: Vec<_> = xword
      .slots()
      .iter()
      .map(|slot| (slot.number, slot.direction, slot.answer.as_str()))
      .collect();
    expect_that!(
      slots,
      container_eq([
        (1, Direction::Across, "LOVE"),
        (1, Direction::Down, "LIVE"),
        (2, Direction::Down, "EVY"),
        (3, Direction::Across, "VERY"),
      ])
    );
    expect_eq!(xword.slots()[3].pos, Pos::at(2, 0));
  }

  #[gtest]
  fn test_single_letters_are_not_slots() {
    let xword = Crossword::from_board(Board::from_layout("A_B\n___\nC__").unwrap());
    expect_true!(xword.slots().is_empty());
  }

  #[gtest]
  fn test_apply_clues() {
    let mut xword = sample();
    let clues = HashMap::from([
      ("LOVE".to_owned(), "Deep affection".to_owned()),
      ("VERY".to_owned(), "Extremely".to_owned()),
    ]);
    expect_eq!(xword.apply_clues(&clues), 2);
    expect_eq!(
      &xword.slots()[0],
      &ClueSlot {
        number: 1,
        pos: Pos::zero(),
        direction: Direction::Across,
        answer: "LOVE".to_owned(),
        clue: Some("Deep affection".to_owned()),
      }
    );
  }

  #[gtest]
  fn test_set_clue() {
    let mut xword = sample();
    expect_eq!(xword.set_clue("LIVE", "Be alive"), 1);
    expect_eq!(xword.set_clue("NOPE", "Absent"), 0);
    expect_eq!(xword.slots()[1].clue.as_deref(), Some("Be alive"));
    expect_true!(xword.slots()[0].clue.is_none());
  }

  #[gtest]
  fn test_xw_export() {
    let mut xword = Crossword::from_board(Board::from_layout("CAT#\nO___\nW_#_").unwrap());
    xword.apply_clues(&HashMap::from([("CAT".to_owned(), "Feline".to_owned())]));
    let xw = xword.to_xw("Test", "Tester");
    expect_eq!(xw.size.rows, 3);
    expect_eq!(xw.size.cols, 4);
    expect_eq!(xw.grid.len(), 12);
    expect_eq!(xw.grid[3].as_str(), ".");
    expect_eq!(xw.grid[5].as_str(), " ");
    expect_that!(xw.clues.across.clone(), container_eq(["1. Feline".to_owned()]));
    expect_that!(xw.clues.down.clone(), container_eq(["1. COW (3)".to_owned()]));
  }

  #[gtest]
  fn test_two_letter_abbreviation() {
    let xword = Crossword::from_board(Board::from_layout("OK\n__").unwrap());
    let xw = xword.to_xw("t", "a");
    expect_that!(xw.clues.across.clone(), container_eq(["1. OK (abbreviation)".to_owned()]));
  }

  #[gtest]
  fn test_markdown() {
    let xword = sample();
    let md = xword.to_markdown("Puzzle", "love").unwrap();
    expect_that!(md.as_str(), contains_substring("**Theme:** \"love\""));
    expect_that!(md.as_str(), contains_substring("**Size:** 4×5 (20 cells)"));
    expect_that!(md.as_str(), contains_substring("- **3. VERY**: VERY (4)"));
    expect_that!(md.as_str(), contains_substring("**3+ Letter Words:** 4"));
  }
}
