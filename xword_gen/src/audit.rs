use common::board::{Board, Run};
use serde::Serialize;
use xword_dict::XWordDict;

/// Result of re-reading a finished board against the dictionary.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Audit {
  /// Runs of at least the validated length that are not dictionary words.
  pub invalid_runs: Vec<Run>,
  pub valid_words: usize,
  /// Runs too short to be validated that are not dictionary words either.
  pub short_fragments: usize,
  pub coverage: f64,
}

impl Audit {
  pub fn is_valid(&self) -> bool {
    self.invalid_runs.is_empty()
  }
}

pub fn audit(board: &Board, dict: &XWordDict, min_validated_run: u32) -> Audit {
  let mut result = Audit { coverage: board.coverage(), ..Audit::default() };
  for run in board.runs(2) {
    let known = dict.contains(&run.text);
    if run.length >= min_validated_run {
      if known {
        result.valid_words += 1;
      } else {
        result.invalid_runs.push(run);
      }
    } else if !known {
      result.short_fragments += 1;
    }
  }
  result
}
