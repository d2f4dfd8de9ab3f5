use std::{
  fmt::Display,
  ops::{Add, Mul, Sub},
};

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A cell coordinate. `x` is the column, `y` is the row.
#[derive(
  Clone, Copy, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Encode, Decode, Serialize, Deserialize,
)]
pub struct Pos {
  pub x: i32,
  pub y: i32,
}

impl Pos {
  pub const fn zero() -> Self {
    Self { x: 0, y: 0 }
  }

  pub const fn at(row: i32, col: i32) -> Self {
    Self { x: col, y: row }
  }

  pub const fn row(&self) -> i32 {
    self.y
  }

  pub const fn col(&self) -> i32 {
    self.x
  }
}

impl Add<Diff> for Pos {
  type Output = Self;

  fn add(self, rhs: Diff) -> Self {
    Self { x: self.x + rhs.x, y: self.y + rhs.y }
  }
}

impl Sub<Diff> for Pos {
  type Output = Self;

  fn sub(self, rhs: Diff) -> Self {
    Self { x: self.x - rhs.x, y: self.y - rhs.y }
  }
}

impl Display for Pos {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "(row {}, col {})", self.y, self.x)
  }
}

/// Offset between two cells, used to step along a word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Diff {
  pub x: i32,
  pub y: i32,
}

impl Diff {
  /// One column to the right.
  pub const DX: Diff = Diff { x: 1, y: 0 };
  /// One row down.
  pub const DY: Diff = Diff { x: 0, y: 1 };
}

impl Mul<Diff> for i32 {
  type Output = Diff;

  fn mul(self, rhs: Diff) -> Diff {
    Diff { x: self * rhs.x, y: self * rhs.y }
  }
}
