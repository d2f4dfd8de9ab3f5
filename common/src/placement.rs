use serde::{Deserialize, Serialize};
use util::pos::Pos;

use crate::board::Direction;

/// A committed word on the board. `pos` is the cell of the first letter.
#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
  pub word: String,
  pub pos: Pos,
  pub direction: Direction,
}

impl Placement {
  pub fn new(word: impl Into<String>, pos: Pos, direction: Direction) -> Self {
    Self { word: word.into(), pos, direction }
  }

  pub fn len(&self) -> u32 {
    self.word.chars().count() as u32
  }

  pub fn is_empty(&self) -> bool {
    self.word.is_empty()
  }

  /// Each letter with the cell it occupies.
  pub fn cells(&self) -> impl Iterator<Item = (Pos, char)> + '_ {
    let step = self.direction.step();
    let start = self.pos;
    self
      .word
      .chars()
      .enumerate()
      .map(move |(idx, c)| (start + idx as i32 * step, c))
  }

  /// The cell just before the first letter.
  pub fn before(&self) -> Pos {
    self.pos - self.direction.step()
  }

  /// The cell just after the last letter.
  pub fn after(&self) -> Pos {
    self.pos + self.len() as i32 * self.direction.step()
  }
}

#[cfg(test)]
mod tests {
  use googletest::prelude::*;
  use util::pos::Pos;

  use crate::board::Direction;

  use super::Placement;

  #[gtest]
  fn test_cells() {
    let placement = Placement::new("OVER", Pos::at(1, 2), Direction::Down);
    expect_that!(
      placement.cells().collect::<Vec<_>>(),
      container_eq([
        (Pos::at(1, 2), 'O'),
        (Pos::at(2, 2), 'V'),
        (Pos::at(3, 2), 'E'),
        (Pos::at(4, 2), 'R'),
      ])
    );
    expect_eq!(placement.before(), Pos::at(0, 2));
    expect_eq!(placement.after(), Pos::at(5, 2));
  }

  #[gtest]
  fn test_across_boundaries() {
    let placement = Placement::new("LOVE", Pos::at(2, 0), Direction::Across);
    expect_eq!(placement.before(), Pos::at(2, -1));
    expect_eq!(placement.after(), Pos::at(2, 4));
    expect_eq!(placement.len(), 4);
  }
}
