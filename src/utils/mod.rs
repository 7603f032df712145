//! Shared utilities and configuration constants.

pub mod constants;

pub use constants::*;
