//! Output rendering for CLI commands.

pub mod json;
