//! Scoped `HOARD_*` environment for tests.
//!
//! Tests in this crate run in parallel threads of one process, so every
//! test that reads the hoard variables goes through [`with_hoard_env`].

#![allow(unsafe_code)]

use std::env;
use std::sync::{Mutex, PoisonError};

const PREFIX: &str = "HOARD_";

static LOCK: Mutex<()> = Mutex::new(());

/// Puts the captured variables back, even if the test body panicked.
struct Restore(Vec<(String, String)>);

impl Drop for Restore {
    fn drop(&mut self) {
        clear_hoard_vars();
        for (key, value) in &self.0 {
            unsafe { env::set_var(key, value) };
        }
    }
}

fn clear_hoard_vars() {
    let keys: Vec<String> = env::vars()
        .map(|(key, _)| key)
        .filter(|key| key.starts_with(PREFIX))
        .collect();
    for key in keys {
        unsafe { env::remove_var(key) };
    }
}

/// Run `body` with exactly `vars` as the `HOARD_*` environment.
///
/// Any hoard variable not listed is unset for the duration.
pub fn with_hoard_env<R>(vars: &[(&str, &str)], body: impl FnOnce() -> R) -> R {
    let _lock = LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let _restore = Restore(
        env::vars()
            .filter(|(key, _)| key.starts_with(PREFIX))
            .collect(),
    );

    clear_hoard_vars();
    for (key, value) in vars {
        debug_assert!(key.starts_with(PREFIX), "{key} is not a hoard variable");
        unsafe { env::set_var(key, value) };
    }
    body()
}
