use std::fmt::Write;

use common::{
  board::Direction,
  crossword::{fallback_clue, Crossword},
};
use util::error::XWordResult;
use xword_gen::fill::FillResult;

use crate::args::OutputFormat;

fn render_text(xword: &Crossword, result: &FillResult) -> XWordResult<String> {
  let mut out = String::new();
  writeln!(out, "{}\n", xword.board())?;
  writeln!(
    out,
    "{} words, {:.1}% coverage, stopped after {} iterations ({})",
    result.placements.len(),
    result.coverage(),
    result.iterations,
    result.termination
  )?;
  for run in result.invalid_runs() {
    writeln!(out, "invalid: {} at {} {}", run.text, run.start, run.direction)?;
  }

  for direction in Direction::ALL {
    writeln!(out, "\n{}:", direction.to_string().to_ascii_uppercase())?;
    for slot in xword.slots_in(direction) {
      let clue = slot
        .clue
        .clone()
        .unwrap_or_else(|| fallback_clue(&slot.answer));
      writeln!(out, "{:>3}. {clue}", slot.number)?;
    }
  }
  Ok(out)
}

pub fn render(
  format: OutputFormat,
  xword: &Crossword,
  result: &FillResult,
  title: &str,
  author: &str,
  theme: &str,
) -> XWordResult<String> {
  Ok(match format {
    OutputFormat::Text => render_text(xword, result)?,
    OutputFormat::Markdown => xword.to_markdown(title, theme)?,
    OutputFormat::Xw => serde_json::to_string_pretty(&xword.to_xw(title, author))?,
    OutputFormat::Json => serde_json::to_string_pretty(&result.record())?,
  })
}
