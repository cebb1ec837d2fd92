//! Continued-fraction layer: terms, digit counting, the Trott target string
//! and evaluation.
//!
//! Depends on `numeric`. Nothing here performs I/O.

pub mod digits;
pub mod evaluate;
pub mod target;
pub mod term;
