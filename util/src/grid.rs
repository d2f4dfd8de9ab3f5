use std::fmt::Display;

use bitcode::{Decode, Encode};

use crate::{
  error::{XWordError, XWordResult},
  pos::{Diff, Pos},
};

/// Dense row-major storage for a `width` x `height` board.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct Grid<T> {
  cells: Vec<T>,
  width: u32,
  height: u32,
}

impl<T> Grid<T> {
  fn check_dimensions(width: u32, height: u32) -> XWordResult {
    if width == 0 || height == 0 {
      return Err(
        XWordError::InvalidInput(format!("Grid dimensions must be positive, got {width}x{height}"))
          .into(),
      );
    }
    Ok(())
  }

  pub fn from_vec(cells: Vec<T>, width: u32, height: u32) -> XWordResult<Self> {
    Self::check_dimensions(width, height)?;
    let expected = width as usize * height as usize;
    if cells.len() != expected {
      return Err(
        XWordError::Internal(format!("{width}x{height} grid needs {expected} cells, got {}", cells.len()))
          .into(),
      );
    }
    Ok(Self { cells, width, height })
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn in_bounds(&self, pos: Pos) -> bool {
    (0..self.width as i32).contains(&pos.x) && (0..self.height as i32).contains(&pos.y)
  }

  fn index(&self, pos: Pos) -> Option<usize> {
    self
      .in_bounds(pos)
      .then(|| pos.x as usize + pos.y as usize * self.width as usize)
  }

  /// `None` for positions outside of the grid.
  pub fn get(&self, pos: Pos) -> Option<&T> {
    self.index(pos).and_then(|idx| self.cells.get(idx))
  }

  pub fn get_mut(&mut self, pos: Pos) -> Option<&mut T> {
    self.index(pos).and_then(|idx| self.cells.get_mut(idx))
  }

  pub fn cell_count(&self) -> usize {
    self.cells.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.cells.iter()
  }

  /// All positions in row-major order.
  pub fn positions(&self) -> impl Iterator<Item = Pos> {
    let width = self.width as i32;
    (0..self.height as i32).flat_map(move |y| (0..width).map(move |x| Pos { x, y }))
  }

  /// Walks from `start` in steps of `step` until leaving the grid.
  pub fn line(&self, start: Pos, step: Diff) -> impl Iterator<Item = (Pos, &T)> {
    std::iter::successors(Some(start), move |&pos| Some(pos + step))
      .map_while(|pos| self.get(pos).map(|cell| (pos, cell)))
  }

  pub fn row(&self, y: u32) -> impl Iterator<Item = (Pos, &T)> {
    self.line(Pos { x: 0, y: y as i32 }, Diff::DX)
  }

  pub fn col(&self, x: u32) -> impl Iterator<Item = (Pos, &T)> {
    self.line(Pos { x: x as i32, y: 0 }, Diff::DY)
  }
}

impl<T: Default> Grid<T> {
  pub fn new(width: u32, height: u32) -> XWordResult<Self> {
    Self::check_dimensions(width, height)?;
    Ok(Self {
      cells: (0..width as usize * height as usize).map(|_| T::default()).collect(),
      width,
      height,
    })
  }
}

impl<T: Display> Display for Grid<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for y in 0..self.height {
      for (_, cell) in self.row(y) {
        write!(f, "{cell}")?;
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;

  use crate::pos::{Diff, Pos};

  use super::Grid;

  #[gtest]
  fn test_zero_dimensions() {
    expect_that!(Grid::<u8>::new(0, 3), err(anything()));
    expect_that!(Grid::<u8>::new(3, 0), err(anything()));
    expect_that!(Grid::<u8>::from_vec(vec![], 0, 0), err(anything()));
  }

  #[gtest]
  fn test_wrong_size() {
    expect_that!(Grid::from_vec(vec![1, 2, 3], 2, 2), err(anything()));
  }

  #[gtest]
  fn test_out_of_bounds() {
    let grid = Grid::from_vec(vec![1, 2, 3, 4, 5, 6], 3, 2).unwrap();
    expect_that!(grid.get(Pos::at(1, 2)).cloned(), some(eq(6)));
    expect_that!(grid.get(Pos::at(0, 3)).cloned(), none());
    expect_that!(grid.get(Pos::at(0, -1)).cloned(), none());
    expect_that!(grid.get(Pos::at(2, 0)).cloned(), none());
  }

  #[gtest]
  fn test_lines() {
    let grid = Grid::from_vec(vec![1, 2, 3, 4, 5, 6], 3, 2).unwrap();
    expect_that!(
      grid.row(1).map(|(_, &n)| n).collect::<Vec<_>>(),
      container_eq([4, 5, 6])
    );
    expect_that!(
      grid.col(2).collect::<Vec<_>>(),
      container_eq([(Pos::at(0, 2), &3), (Pos::at(1, 2), &6)])
    );
    expect_eq!(grid.line(Pos::at(0, 0), Diff { x: 1, y: 1 }).count(), 2);
    expect_eq!(grid.row(2).count(), 0);
  }

  #[gtest]
  fn test_get_mut() {
    let mut grid = Grid::<u8>::new(2, 2).unwrap();
    *grid.get_mut(Pos::at(1, 1)).unwrap() = 7;
    expect_true!(grid.get_mut(Pos::at(1, 2)).is_none());
    expect_that!(grid.iter().cloned().collect::<Vec<_>>(), container_eq([0, 0, 0, 7]));
    expect_eq!(grid.to_string(), "00\n07\n");
    expect_that!(
      grid.positions().collect::<Vec<_>>(),
      container_eq([Pos::at(0, 0), Pos::at(0, 1), Pos::at(1, 0), Pos::at(1, 1)])
    );
  }
}
