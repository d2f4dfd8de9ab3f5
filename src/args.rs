use std::{fs, path::PathBuf};

use clap::{Parser, ValueEnum};
use serde::Serialize;
use util::error::XWordResult;
use xword_dict::Difficulty;
use xword_gen::fill::FillConfig;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
  /// Box-drawn grid followed by the clue lists.
  Text,
  Markdown,
  /// Puzzle file for the Phil crossword editor.
  Xw,
  /// Placements, grid rows and fill statistics.
  Json,
}

#[derive(Parser, Debug)]
#[command(version, about = "Generates themed crossword puzzles", long_about = None)]
pub struct Args {
  /// Word list JSON file. May be repeated; a word listed twice keeps the
  /// category and difficulty from the first list that names it.
  #[arg(long)]
  pub words: Vec<PathBuf>,

  /// Compiled dictionary. Written when `--words` is given, read otherwise.
  #[arg(long)]
  pub dict_cache: Option<PathBuf>,

  #[arg(long, default_value = "")]
  pub theme: String,

  #[arg(long, default_value_t = 10)]
  pub rows: u32,

  #[arg(long, default_value_t = 10)]
  pub cols: u32,

  /// Board layout file: `_` empty, `#` wall, `A-Z` pre-filled letter.
  #[arg(long)]
  pub layout: Option<PathBuf>,

  #[arg(long, default_value_t = 12)]
  pub target_words: usize,

  #[arg(long, default_value_t = 100)]
  pub max_iterations: u32,

  #[arg(long, default_value_t = 1)]
  pub attempts: u32,

  #[arg(long, default_value_t = 0)]
  pub seed: u64,

  /// Maximum random bonus added to candidate scores.
  #[arg(long, default_value_t = 0.0)]
  pub jitter: f64,

  /// Shortest crossing run that must be a dictionary word.
  #[arg(long, default_value_t = 3)]
  pub min_run: u32,

  /// How many non-themed words to consider. 0 means all of them.
  #[arg(long, default_value_t = 400)]
  pub general_limit: usize,

  /// Fetch clues from the chat relay.
  #[arg(long)]
  pub clues: bool,

  #[arg(long, default_value = "medium")]
  pub difficulty: Difficulty,

  /// Clue generation config JSON file.
  #[arg(long)]
  pub config: Option<PathBuf>,

  #[arg(long, value_enum, default_value = "text")]
  pub format: OutputFormat,

  /// Output file. Defaults to stdout.
  #[arg(long)]
  pub out: Option<PathBuf>,

  #[arg(long, default_value = "Themed Crossword")]
  pub title: String,

  #[arg(long, default_value = "themed-xword")]
  pub author: String,
}

impl Args {
  pub fn fill_config(&self) -> XWordResult<FillConfig> {
    let layout = self
      .layout
      .as_ref()
      .map(fs::read_to_string)
      .transpose()?;

    Ok(FillConfig {
      theme: self.theme.clone(),
      rows: self.rows,
      cols: self.cols,
      layout,
      target_word_count: self.target_words,
      max_iterations: self.max_iterations,
      attempts: self.attempts,
      seed: self.seed,
      jitter: self.jitter,
      min_validated_run: self.min_run,
      general_word_limit: (self.general_limit > 0).then_some(self.general_limit),
      ..FillConfig::default()
    })
  }
}
