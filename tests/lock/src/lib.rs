//! Shared fixtures for the cross-crate lock tests.

pub mod bundle_test_helpers;
pub mod scenarios;
