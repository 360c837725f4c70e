//! Test infrastructure for the SWIFT message parser
//!
//! Provides fixture loading, seeded message generation, and assertion helpers.

#![allow(dead_code)]

mod generators;
mod harness;
mod loader;

pub use generators::Gen;
pub use harness::{collect_items, format_items, run_test, run_with_variations};
pub use loader::{load_fixtures_by_name, TestCase};

use std::path::PathBuf;

/// Path of a file in `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Route `tracing` output of the code under test to the test writer.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
