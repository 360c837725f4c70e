//! Fixture loading from YAML files

use serde::Deserialize;

use std::path::Path;

/// A single test case from a fixture file
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub desc: String,
    pub input: String,
    /// Expected items, formatted as `(level, kind, payload)`
    #[serde(default)]
    pub items: Vec<String>,
    /// Expected error code after the items, e.g. `UnmatchedCloseBrace`
    #[serde(default)]
    pub error: Option<String>,
}

impl TestCase {
    pub fn is_well_formed(&self) -> bool {
        self.error.is_none()
    }
}

/// Load all test cases from a YAML fixture file
pub fn load_fixtures(path: &Path) -> Vec<TestCase> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));
    serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e))
}

/// Load fixtures from the standard fixtures directory
pub fn load_fixtures_by_name(name: &str) -> Vec<TestCase> {
    load_fixtures(&super::fixture_path(&format!("{}.yaml", name)))
}
