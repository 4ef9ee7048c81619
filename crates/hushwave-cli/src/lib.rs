//! # hushwave-cli
//!
//! The `hushwave` command-line front end. `main.rs` parses arguments and
//! dispatches to [`handlers`]; [`bootstrap`] resolves settings and paths.

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;
pub mod progress;

pub use bootstrap::{CliContext, bootstrap};
pub use commands::Commands;
pub use parser::Cli;
