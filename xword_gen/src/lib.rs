#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod audit;
pub mod candidates;
pub mod fill;
pub mod validator;
