//! Transformations from upstream label records into response entities.

pub mod medicine;
