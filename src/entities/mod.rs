//! Lookup workflows shared by the HTTP server and the CLI.

pub mod medicine;
pub mod suggestion;
