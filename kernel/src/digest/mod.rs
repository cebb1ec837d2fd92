//! Canonical JSON and domain-separated content hashing.
//!
//! Standalone within the kernel: nothing here depends on the numeric or
//! continued-fraction modules.

pub mod canon;
pub mod hash;
pub mod hash_domain;
