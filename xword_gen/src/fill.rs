use std::{collections::HashSet, fmt::Display};

use common::{
  board::{Board, Run},
  placement::Placement,
};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use serde::Serialize;
use util::error::{XWordError, XWordResult};
use xword_dict::XWordDict;

use crate::{
  audit::{audit, Audit},
  candidates::{CandidateGenerator, Jitter},
};

/// Weights of the attempt quality score. Coverage percentage and valid words
/// add to it, short fragments subtract from it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct QualityWeights {
  pub coverage: f64,
  pub valid_words: f64,
  pub short_fragments: f64,
}

impl Default for QualityWeights {
  fn default() -> Self {
    Self { coverage: 10.0, valid_words: 5.0, short_fragments: 10.0 }
  }
}

impl QualityWeights {
  pub fn score(&self, audit: &Audit) -> f64 {
    audit.coverage * self.coverage + audit.valid_words as f64 * self.valid_words
      - audit.short_fragments as f64 * self.short_fragments
  }
}

#[derive(Clone, Debug)]
pub struct FillConfig {
  pub theme: String,
  pub rows: u32,
  pub cols: u32,
  /// Replaces `rows` x `cols` with a pre-drawn board (walls, seeded letters).
  pub layout: Option<String>,
  pub target_word_count: usize,
  pub max_iterations: u32,
  pub attempts: u32,
  pub seed: u64,
  /// Maximum random bonus added to each candidate score. Zero disables it.
  pub jitter: f64,
  pub min_validated_run: u32,
  pub general_word_limit: Option<usize>,
  pub weights: QualityWeights,
}

impl Default for FillConfig {
  fn default() -> Self {
    Self {
      theme: String::new(),
      rows: 10,
      cols: 10,
      layout: None,
      target_word_count: 12,
      max_iterations: 100,
      attempts: 1,
      seed: 0,
      jitter: 0.0,
      min_validated_run: 3,
      general_word_limit: Some(400),
      weights: QualityWeights::default(),
    }
  }
}

impl FillConfig {
  fn blank_board(&self) -> XWordResult<Board> {
    match &self.layout {
      Some(layout) => Board::from_layout(layout),
      None => Board::new(self.rows, self.cols),
    }
  }

  fn validate(&self) -> XWordResult {
    let invalid =
      |msg: &str| -> XWordResult { Err(XWordError::InvalidInput(msg.to_owned()).into()) };
    if self.target_word_count == 0 {
      return invalid("Target word count must be at least 1");
    }
    if self.max_iterations == 0 {
      return invalid("Iteration bound must be at least 1");
    }
    if self.attempts == 0 {
      return invalid("Attempt count must be at least 1");
    }
    if self.min_validated_run < 2 {
      return invalid("Minimum validated run must be at least 2");
    }
    if !self.jitter.is_finite() || self.jitter < 0.0 {
      return invalid("Jitter must be a non-negative number");
    }
    Ok(())
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TerminationReason {
  TargetReached,
  NoCandidates,
  IterationLimit,
}

impl Display for TerminationReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      TerminationReason::TargetReached => write!(f, "target word count reached"),
      TerminationReason::NoCandidates => write!(f, "no legal placements left"),
      TerminationReason::IterationLimit => write!(f, "iteration limit reached"),
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillState {
  Empty,
  Seeding,
  Growing,
  Terminated(TerminationReason),
}

#[derive(Clone, Debug)]
pub struct FillResult {
  pub board: Board,
  /// In commit order.
  pub placements: Vec<Placement>,
  pub termination: TerminationReason,
  pub iterations: u32,
  pub audit: Audit,
}

impl FillResult {
  pub fn coverage(&self) -> f64 {
    self.audit.coverage
  }

  pub fn invalid_runs(&self) -> &[Run] {
    &self.audit.invalid_runs
  }

  pub fn record(&self) -> FillRecord {
    FillRecord {
      rows: self.board.rows(),
      cols: self.board.cols(),
      grid: self.board.row_strings(),
      placements: self.placements.clone(),
      coverage: self.coverage(),
      termination: self.termination,
      iterations: self.iterations,
      invalid_runs: self.audit.invalid_runs.clone(),
    }
  }
}

/// Serializable summary of a fill.
#[derive(Clone, Debug, Serialize)]
pub struct FillRecord {
  pub rows: u32,
  pub cols: u32,
  pub grid: Vec<String>,
  pub placements: Vec<Placement>,
  pub coverage: f64,
  pub termination: TerminationReason,
  pub iterations: u32,
  pub invalid_runs: Vec<Run>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttemptSummary {
  pub attempt: u32,
  pub seed: u64,
  pub placed: usize,
  pub coverage: f64,
  pub quality: f64,
  pub termination: TerminationReason,
}

#[derive(Clone, Debug)]
pub struct BestFill {
  pub result: FillResult,
  pub quality: f64,
  pub attempts: Vec<AttemptSummary>,
}

#[derive(Debug)]
pub struct FillDriver<'a> {
  dict: &'a XWordDict,
  config: FillConfig,
  blank: Board,
}

impl<'a> FillDriver<'a> {
  pub fn new(dict: &'a XWordDict, config: FillConfig) -> XWordResult<Self> {
    config.validate()?;
    let blank = config.blank_board()?;
    Ok(Self { dict, config, blank })
  }

  pub fn config(&self) -> &FillConfig {
    &self.config
  }

  /// The board every attempt starts from.
  pub fn blank_board(&self) -> &Board {
    &self.blank
  }

  pub fn fill(&self) -> XWordResult<FillResult> {
    self.run(None)
  }

  pub fn fill_with_jitter(&self, rng: &mut dyn RngCore, amount: f64) -> XWordResult<FillResult> {
    self.run(Some(Jitter::new(rng, amount)))
  }

  fn transition(state: &mut FillState, next: FillState) {
    if *state != next {
      log::debug!("Fill state {state:?} -> {next:?}");
      *state = next;
    }
  }

  fn run(&self, mut jitter: Option<Jitter<'_>>) -> XWordResult<FillResult> {
    let generator = CandidateGenerator::new(
      self.dict,
      &self.config.theme,
      self.config.min_validated_run,
      self.config.general_word_limit,
    );
    let mut board = self.blank.clone();
    let mut placements: Vec<Placement> = vec![];
    let mut used: HashSet<String> = HashSet::new();
    let mut state = FillState::Empty;
    let mut iterations = 0;

    let termination = loop {
      if placements.len() >= self.config.target_word_count {
        break TerminationReason::TargetReached;
      }
      if iterations >= self.config.max_iterations {
        break TerminationReason::IterationLimit;
      }
      iterations += 1;

      Self::transition(
        &mut state,
        if placements.is_empty() { FillState::Seeding } else { FillState::Growing },
      );
      let candidates = generator.find_candidates(&board, &placements, &used, jitter.as_mut());
      let Some(best) = candidates.into_iter().next() else {
        break TerminationReason::NoCandidates;
      };

      board.place(&best.placement)?;
      log::trace!(
        "Placed {} {} at {} (score {:.2})",
        best.placement.word,
        best.placement.direction,
        best.placement.pos,
        best.score
      );
      used.insert(best.placement.word.clone());
      placements.push(best.placement);
    };
    Self::transition(&mut state, FillState::Terminated(termination));

    let audit = audit(&board, self.dict, self.config.min_validated_run);
    for run in &audit.invalid_runs {
      log::error!(
        "Invalid {} run \"{}\" starting at {}",
        run.direction,
        run.text,
        run.start
      );
    }
    log::debug!(
      "Placed {} words in {iterations} iterations, {:.1}% coverage ({termination})",
      placements.len(),
      audit.coverage
    );

    Ok(FillResult { board, placements, termination, iterations, audit })
  }

  /// Runs `attempts` fills, attempt `i` seeded with `seed + i`, and keeps the
  /// highest quality one. Earlier attempts win ties.
  pub fn build_best(&self) -> XWordResult<BestFill> {
    let mut best: Option<(FillResult, f64)> = None;
    let mut summaries = vec![];

    for attempt in 0..self.config.attempts {
      let seed = self.config.seed.wrapping_add(attempt as u64);
      let result = if self.config.jitter > 0.0 {
        let mut rng = StdRng::seed_from_u64(seed);
        self.fill_with_jitter(&mut rng, self.config.jitter)?
      } else {
        self.fill()?
      };
      let quality = self.config.weights.score(&result.audit);
      log::info!(
        "Attempt {}: {} words, {:.1}% coverage, quality {quality:.1}",
        attempt + 1,
        result.placements.len(),
        result.coverage()
      );

      summaries.push(AttemptSummary {
        attempt,
        seed,
        placed: result.placements.len(),
        coverage: result.coverage(),
        quality,
        termination: result.termination,
      });
      if best
        .as_ref()
        .is_none_or(|(_, best_quality)| quality > *best_quality)
      {
        best = Some((result, quality));
      }
    }

    let (result, quality) =
      best.ok_or_else(|| XWordError::Internal("No fill attempts were run".to_owned()))?;
    Ok(BestFill { result, quality, attempts: summaries })
  }
}
