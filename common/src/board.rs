use std::{
  fmt::Display,
  iter::{once, successors},
};

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use util::{
  error::{XWordError, XWordResult},
  grid::Grid,
  pos::{Diff, Pos},
};

use crate::placement::Placement;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Encode, Decode)]
pub enum XWordTile {
  Letter(char),
  #[default]
  Empty,
  Wall,
}

impl XWordTile {
  pub fn empty(&self) -> bool {
    matches!(self, XWordTile::Empty)
  }

  /// Empty or lettered, i.e. not a wall.
  pub fn available(&self) -> bool {
    matches!(self, XWordTile::Empty | XWordTile::Letter(_))
  }

  pub fn letter(&self) -> Option<char> {
    match self {
      XWordTile::Letter(c) => Some(*c),
      XWordTile::Empty | XWordTile::Wall => None,
    }
  }
}

impl Display for XWordTile {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}",
      match self {
        XWordTile::Letter(c) => *c,
        XWordTile::Empty => '.',
        XWordTile::Wall => '#',
      }
    )
  }
}

#[derive(
  Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Encode, Decode, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Across,
  Down,
}

impl Direction {
  pub const ALL: [Direction; 2] = [Direction::Across, Direction::Down];

  pub const fn step(self) -> Diff {
    match self {
      Direction::Across => Diff::DX,
      Direction::Down => Diff::DY,
    }
  }

  pub const fn perpendicular(self) -> Self {
    match self {
      Direction::Across => Direction::Down,
      Direction::Down => Direction::Across,
    }
  }
}

impl Display for Direction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Direction::Across => write!(f, "across"),
      Direction::Down => write!(f, "down"),
    }
  }
}

/// A maximal contiguous sequence of letters in one direction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Run {
  pub text: String,
  pub start: Pos,
  pub direction: Direction,
  pub length: u32,
}

#[derive(Clone, PartialEq, Eq, Encode, Decode)]
pub struct Board {
  grid: Grid<XWordTile>,
}

impl Board {
  pub fn new(rows: u32, cols: u32) -> XWordResult<Self> {
    Ok(Self { grid: Grid::new(cols, rows)? })
  }

  /// Parses a layout with one line per row: `_` or `.` for an empty cell,
  /// `#` for a wall and `A-Z` for a pre-filled letter.
  pub fn from_layout(layout: &str) -> XWordResult<Self> {
    let (width, height, tiles) = layout
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .try_fold(
        (None, 0u32, vec![]),
        |(width, height, mut tiles), line| -> XWordResult<_> {
          tiles.extend(
            line
              .chars()
              .map(|c| match c {
                '_' | '.' => Ok(XWordTile::Empty),
                '#' => Ok(XWordTile::Wall),
                'A'..='Z' => Ok(XWordTile::Letter(c)),
                _ => Err(XWordError::Parse(format!("Unrecognized board character '{c}'")).into()),
              })
              .collect::<XWordResult<Vec<_>>>()?,
          );
          let line_len = line.chars().count();
          if let Some(width) = width {
            if line_len != width {
              return Err(
                XWordError::Parse(format!("Board line lengths differ: {line_len} vs {width}"))
                  .into(),
              );
            }
          }

          Ok((Some(line_len), height + 1, tiles))
        },
      )?;

    let width = width.ok_or_else(|| XWordError::Parse("Empty board string".to_owned()))? as u32;
    Ok(Self { grid: Grid::from_vec(tiles, width, height)? })
  }

  pub fn rows(&self) -> u32 {
    self.grid.height()
  }

  pub fn cols(&self) -> u32 {
    self.grid.width()
  }

  pub fn grid(&self) -> &Grid<XWordTile> {
    &self.grid
  }

  pub fn center(&self) -> Pos {
    Pos::at((self.rows() / 2) as i32, (self.cols() / 2) as i32)
  }

  pub fn in_bounds(&self, pos: Pos) -> bool {
    self.grid.in_bounds(pos)
  }

  /// `None` means out of bounds, which callers treat like a wall.
  pub fn tile(&self, pos: Pos) -> Option<XWordTile> {
    self.grid.get(pos).copied()
  }

  pub fn letter_at(&self, pos: Pos) -> Option<char> {
    self.tile(pos).and_then(|tile| tile.letter())
  }

  /// In bounds and not a wall.
  pub fn is_open(&self, pos: Pos) -> bool {
    self.tile(pos).is_some_and(|tile| tile.available())
  }

  pub fn is_letter(&self, pos: Pos) -> bool {
    self.letter_at(pos).is_some()
  }

  pub fn is_empty(&self) -> bool {
    self.grid.iter().all(|tile| tile.letter().is_none())
  }

  fn tile_mut(&mut self, pos: Pos) -> XWordResult<&mut XWordTile> {
    self
      .grid
      .get_mut(pos)
      .ok_or_else(|| XWordError::Internal(format!("Pos is out of bounds: {pos}")).into())
  }

  pub fn set_letter(&mut self, pos: Pos, letter: char) -> XWordResult {
    let tile = self.tile_mut(pos)?;
    if matches!(tile, XWordTile::Wall) {
      return Err(XWordError::Internal(format!("Cannot write '{letter}' onto wall at {pos}")).into());
    }
    *tile = XWordTile::Letter(letter);
    Ok(())
  }

  /// Writes every letter of `placement`. Fails without a partial write if a
  /// cell is out of bounds, a wall, or holds a different letter.
  pub fn place(&mut self, placement: &Placement) -> XWordResult {
    for (pos, c) in placement.cells() {
      match self.tile(pos) {
        Some(XWordTile::Empty) => {}
        Some(XWordTile::Letter(existing)) if existing == c => {}
        Some(XWordTile::Letter(existing)) => {
          return Err(
            XWordError::Internal(format!(
              "Conflicting letter assignment at position {pos}: {c} vs {existing}"
            ))
            .into(),
          );
        }
        Some(XWordTile::Wall) | None => {
          return Err(
            XWordError::Internal(format!("Placement of {} covers unavailable cell {pos}", placement.word))
              .into(),
          );
        }
      }
    }
    placement
      .cells()
      .try_for_each(|(pos, c)| self.set_letter(pos, c))
  }

  /// Reads the run through `pos` in `direction` as it would look with
  /// `hypothetical` written at `pos`. The board is not modified.
  pub fn run_at(&self, pos: Pos, direction: Direction, hypothetical: Option<char>) -> Run {
    let letter = |p: Pos| -> Option<char> {
      if p == pos && self.in_bounds(p) {
        hypothetical.or_else(|| self.letter_at(p))
      } else {
        self.letter_at(p)
      }
    };
    let step = direction.step();

    if letter(pos).is_none() {
      return Run { text: String::new(), start: pos, direction, length: 0 };
    }

    let start = successors(Some(pos), |&p| Some(p - step).filter(|&prev| letter(prev).is_some()))
      .last()
      .unwrap_or(pos);
    let text: String = successors(Some(start), |&p| Some(p + step))
      .map_while(letter)
      .collect();
    let length = text.chars().count() as u32;
    Run { text, start, direction, length }
  }

  fn scan_line<'a>(
    line: impl Iterator<Item = (Pos, &'a XWordTile)>,
    direction: Direction,
    min_len: u32,
    runs: &mut Vec<Run>,
  ) {
    let mut current: Option<(Pos, String)> = None;
    for cell in line.map(Some).chain(once(None)) {
      match cell.and_then(|(pos, tile)| tile.letter().map(|c| (pos, c))) {
        Some((pos, c)) => current.get_or_insert_with(|| (pos, String::new())).1.push(c),
        None => {
          if let Some((start, text)) = current.take() {
            let length = text.chars().count() as u32;
            if length >= min_len {
              runs.push(Run { text, start, direction, length });
            }
          }
        }
      }
    }
  }

  /// Every maximal run of at least `min_len` letters: across runs in
  /// row-major order, then down runs in column-major order.
  pub fn runs(&self, min_len: u32) -> Vec<Run> {
    let mut runs = vec![];
    for y in 0..self.rows() {
      Self::scan_line(self.grid.row(y), Direction::Across, min_len, &mut runs);
    }
    for x in 0..self.cols() {
      Self::scan_line(self.grid.col(x), Direction::Down, min_len, &mut runs);
    }
    runs
  }

  pub fn filled_cells(&self) -> usize {
    self.grid.iter().filter(|tile| tile.letter().is_some()).count()
  }

  /// Percentage of all cells holding a letter.
  pub fn coverage(&self) -> f64 {
    self.filled_cells() as f64 / self.grid.cell_count() as f64 * 100.0
  }

  /// Compact one-line-per-row rendering, parseable by `from_layout`.
  pub fn row_strings(&self) -> Vec<String> {
    (0..self.rows())
      .map(|y| self.grid.row(y).map(|(_, tile)| tile.to_string()).collect())
      .collect()
  }
}

impl Display for Board {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let cols = self.cols() as usize;
    let border = |left: &str, mid: &str, right: &str| {
      format!("{left}{}───{right}", format!("───{mid}").repeat(cols - 1))
    };
    writeln!(f, "{}", border("┌", "┬", "┐"))?;
    for y in 0..self.rows() {
      let cells: Vec<String> = self
        .grid
        .row(y)
        .map(|(_, tile)| match tile {
          XWordTile::Letter(c) => c.to_string(),
          XWordTile::Empty => " ".to_owned(),
          XWordTile::Wall => "█".to_owned(),
        })
        .collect();
      writeln!(f, "│ {} │", cells.join(" │ "))?;
      if y + 1 < self.rows() {
        writeln!(f, "{}", border("├", "┼", "┤"))?;
      }
    }
    write!(f, "{}", border("└", "┴", "┘"))
  }
}

impl std::fmt::Debug for Board {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.grid)
  }
}
