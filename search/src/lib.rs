//! Trott Search: backtracking search for pre-Trott constants.
//!
//! Depends only on `trott_kernel`; it does NOT depend on `trott_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! trott_kernel  ←  trott_search  ←  trott_harness
//! (numeric core)   (engine, pool)    (config, bundles, logs)
//! ```
//!
//! # Key types
//!
//! - [`policy::SearchPolicy`] -- bounds, starting prefix and guard policy
//! - [`contract::BranchOracle`] -- branch admission (implemented by the kernel's `ValidityOracle`)
//! - [`contract::ResultSink`] -- receives discoveries in report order
//! - [`contract::BranchControl`] -- declines subtrees, cancels cooperatively
//! - [`search::search`] / [`parallel::search_parallel`] -- the engines
//! - [`report::SearchReport`] -- termination reason and counters

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod error;
pub mod node;
pub mod parallel;
pub mod policy;
pub mod report;
pub mod search;
pub mod sink;
