#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod args;
mod render;

use std::{fs, process::ExitCode};

use args::Args;
use clap::Parser;
use clue_gen::{ClueConfig, ClueGenerator, RelayClient};
use common::crossword::Crossword;
use util::{
  bitcode,
  error::{XWordError, XWordResult},
  time::time_fn,
};
use xword_dict::{WordList, XWordDict};
use xword_gen::fill::FillDriver;

fn load_dict(args: &Args) -> XWordResult<XWordDict> {
  if args.words.is_empty() {
    let cache = args.dict_cache.as_ref().ok_or_else(|| {
      XWordError::InvalidInput("Either --words or --dict-cache must be given".to_owned())
    })?;
    let dict: XWordDict = bitcode::decode(&fs::read(cache)?)?;
    log::info!("Loaded {} words from {}", dict.len(), cache.display());
    return Ok(dict);
  }

  let lists = args
    .words
    .iter()
    .map(|path| WordList::parse_json(&fs::read_to_string(path)?))
    .collect::<XWordResult<Vec<_>>>()?;
  let (elapsed, dict) = time_fn(|| XWordDict::from_word_lists(lists));
  let dict = dict?;
  log::info!(
    "Indexed {} words from {} lists in {elapsed:?}",
    dict.len(),
    args.words.len()
  );
  if let Some(cache) = &args.dict_cache {
    fs::write(cache, bitcode::encode(&dict))?;
    log::info!("Wrote dictionary cache to {}", cache.display());
  }
  Ok(dict)
}

async fn add_clues(args: &Args, xword: &mut Crossword) -> XWordResult {
  let config = match &args.config {
    Some(path) => ClueConfig::load(path)?,
    None => ClueConfig::default(),
  };
  let generator =
    ClueGenerator::new(RelayClient::new(config.relay.clone(), config.model.clone()), &config);

  let answers = xword.answers();
  let words: Vec<&str> = answers.iter().map(String::as_str).collect();
  let clues = generator
    .generate_clues(&words, &args.theme, args.difficulty)
    .await;
  let applied = xword.apply_clues(&clues);
  log::info!("Applied {applied} clues to {} slots", xword.slots().len());
  Ok(())
}

async fn run() -> XWordResult {
  let args = Args::parse();
  let dict = load_dict(&args)?;

  let driver = FillDriver::new(&dict, args.fill_config()?)?;
  let (elapsed, best) = time_fn(|| driver.build_best());
  let best = best?;
  log::info!(
    "Best of {} attempts: {} words, {:.1}% coverage, quality {:.1} ({elapsed:?})",
    best.attempts.len(),
    best.result.placements.len(),
    best.result.coverage(),
    best.quality
  );

  let mut xword = Crossword::from_board(best.result.board.clone());
  if args.clues {
    add_clues(&args, &mut xword).await?;
  }

  let output = render::render(
    args.format,
    &xword,
    &best.result,
    &args.title,
    &args.author,
    &args.theme,
  )?;
  match &args.out {
    Some(path) => {
      fs::write(path, output)?;
      log::info!("Wrote {}", path.display());
    }
    None => println!("{output}"),
  }
  Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  if let Err(err) = run().await {
    println!("Error: {err}");
    ExitCode::FAILURE
  } else {
    ExitCode::SUCCESS
  }
}
