#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod entry;
pub mod word_list;
mod xword_dict;

pub use entry::{DictEntry, Difficulty};
pub use word_list::WordList;
pub use xword_dict::{Crossing, XWordDict};
