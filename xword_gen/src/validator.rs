use std::fmt::Display;

use common::{
  board::{Board, XWordTile},
  placement::Placement,
};
use util::pos::Pos;
use xword_dict::XWordDict;

/// Why a placement was refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
  EmptyWord,
  OutOfBounds { pos: Pos },
  Blocked { pos: Pos },
  /// The cell before or after the word holds a letter, so the word would
  /// merge with its neighbor.
  Boundary { pos: Pos },
  Conflict { pos: Pos, expected: char, found: char },
  /// Writing the letter at `pos` forms a perpendicular run that is not a word.
  InvalidCrossing { pos: Pos, run: String },
  /// Every cell already holds the right letter.
  NoNewLetters,
}

impl Display for Rejection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Rejection::EmptyWord => write!(f, "empty word"),
      Rejection::OutOfBounds { pos } => write!(f, "{pos} is off the board"),
      Rejection::Blocked { pos } => write!(f, "{pos} is a wall"),
      Rejection::Boundary { pos } => write!(f, "letter at {pos} touches the word end"),
      Rejection::Conflict { pos, expected, found } => {
        write!(f, "{pos} holds {found}, needs {expected}")
      }
      Rejection::InvalidCrossing { pos, run } => {
        write!(f, "crossing at {pos} would spell {run}")
      }
      Rejection::NoNewLetters => write!(f, "adds no letters"),
    }
  }
}

#[derive(Clone, Copy)]
pub struct PlacementValidator<'a> {
  dict: &'a XWordDict,
  min_validated_run: u32,
}

impl<'a> PlacementValidator<'a> {
  /// Perpendicular runs shorter than `min_validated_run` are accepted without
  /// a dictionary lookup.
  pub fn new(dict: &'a XWordDict, min_validated_run: u32) -> Self {
    Self { dict, min_validated_run }
  }

  pub fn min_validated_run(&self) -> u32 {
    self.min_validated_run
  }

  pub fn check(&self, board: &Board, placement: &Placement) -> Result<(), Rejection> {
    if placement.is_empty() {
      return Err(Rejection::EmptyWord);
    }

    for (pos, _) in placement.cells() {
      match board.tile(pos) {
        None => return Err(Rejection::OutOfBounds { pos }),
        Some(XWordTile::Wall) => return Err(Rejection::Blocked { pos }),
        Some(XWordTile::Empty | XWordTile::Letter(_)) => {}
      }
    }

    for pos in [placement.before(), placement.after()] {
      if board.is_letter(pos) {
        return Err(Rejection::Boundary { pos });
      }
    }

    let cross = placement.direction.perpendicular();
    let mut adds_letter = false;
    for (pos, c) in placement.cells() {
      match board.letter_at(pos) {
        Some(found) if found == c => {}
        Some(found) => return Err(Rejection::Conflict { pos, expected: c, found }),
        None => {
          adds_letter = true;
          let run = board.run_at(pos, cross, Some(c));
          if run.length >= self.min_validated_run && !self.dict.contains(&run.text) {
            return Err(Rejection::InvalidCrossing { pos, run: run.text });
          }
        }
      }
    }

    if adds_letter {
      Ok(())
    } else {
      Err(Rejection::NoNewLetters)
    }
  }

  pub fn can_place(&self, board: &Board, placement: &Placement) -> bool {
    self.check(board, placement).is_ok()
  }
}
