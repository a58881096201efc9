//! Command-line maintenance for hoard offline downloads.
//!
//! The binary inspects and edits on-disk state only. Queues live in the
//! embedding application's coordinator, so `status` always reports an
//! empty queue.

#![deny(unsafe_code)]

// Used by the binary only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;
pub mod presentation;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use parser::Cli;
