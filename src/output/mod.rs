//! User-facing output helpers.

pub mod progress;
