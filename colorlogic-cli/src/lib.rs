//! Support library for the colorlogic CLI binary.
//!
//! Exposes command parsing and execution so doctests and integration tests
//! can drive the commands in-process.

pub mod cli;
pub mod logging;
