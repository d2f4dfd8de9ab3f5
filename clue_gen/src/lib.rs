#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod cache;
pub mod config;
pub mod generator;
pub mod http;
pub mod relay;

pub use cache::ClueCache;
pub use config::ClueConfig;
pub use generator::ClueGenerator;
pub use relay::{CompletionSource, RelayClient};
