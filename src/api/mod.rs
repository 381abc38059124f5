//! API Module
//!
//! Command facade over the process-wide engine. Every command returns
//! `Result<T, String>` so callers can surface errors verbatim.

pub mod commands;

pub use commands::*;
