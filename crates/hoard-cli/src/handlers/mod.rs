//! Command handlers.
//!
//! Each handler takes the composed [`crate::CliContext`], does its work
//! through the stores, and prints the result. Handlers that answer a yes/no
//! question return `Ok(false)` for "no" so `main` can set the exit code.

pub mod locate;
pub mod mark_played;
pub mod paths;
pub mod purge;
pub mod status;
