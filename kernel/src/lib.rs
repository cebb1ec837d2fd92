//! Trott Kernel: the numeric core of the pre-Trott constant search.
//!
//! # API Surface
//!
//! - [`cf::digits::digit_count`] -- total decimal digits of a term sequence
//! - [`cf::evaluate::evaluate`] -- precision-scaled continued-fraction value
//! - [`cf::target::trott_target`] -- the `"0." + digits` string a sequence must match
//! - [`validity::ValidityOracle::check`] -- the branch-admission decision
//!
//! # Module Dependency Direction
//!
//! `numeric` ← `cf` ← `validity`
//!
//! One-way only. `digest` is standalone (canonical JSON + hashing) and is
//! consumed by the search report and the harness bundle.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cf;
pub mod digest;
pub mod error;
pub mod numeric;
pub mod validity;
