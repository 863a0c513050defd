//! Internal utility helpers for input sanitization, timestamps, and serde helpers.

pub(crate) mod date;
pub(crate) mod query;
pub(crate) mod serde;
