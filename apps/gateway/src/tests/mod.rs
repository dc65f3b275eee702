//! Test Module
//!
//! Cross-module test suite for the AURORA gateway.
//!
//! ## Test Categories
//! - `analysis_tests`: Intent classification, pattern scanning, risk scoring
//! - `law_tests`: Law loading, condition matching, priority order
//! - `judge_tests`: End-to-end decisions against the shipped law file
//! - `chaos_test`: Concurrent evaluations and reloads
//! - `integration_tests`: Law files on disk, hot reload, configuration

pub mod integration_tests;

use std::path::{Path, PathBuf};

/// Law file shipped with the crate
pub fn shipped_laws_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("laws.yaml")
}
