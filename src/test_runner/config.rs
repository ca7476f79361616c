//! Test framework configuration

use super::compare::ComparePolicy;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// When to emit terminal colour codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Always colour
    Always,
    /// Never colour
    Never,
    /// Colour unless `NO_COLOR` is set
    #[default]
    Auto,
}

impl ColorMode {
    /// Resolve to a yes/no decision
    pub fn enabled(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::env::var_os("NO_COLOR").is_none(),
        }
    }
}

/// Configuration for the test framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Colour output for report lines and diagnostics
    pub color: ColorMode,
    /// How `toEqual` walks arrays and objects
    pub compare_policy: ComparePolicy,
    /// Print a totals summary from [`TestHarness::finish`](super::TestHarness::finish)
    pub report_summary: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::Auto,
            compare_policy: ComparePolicy::Full,
            report_summary: false,
        }
    }
}

impl TestConfig {
    /// Parse a configuration from JSON; missing keys take their defaults
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Disable colour, for golden-output comparisons
    pub fn plain() -> Self {
        Self {
            color: ColorMode::Never,
            ..Self::default()
        }
    }
}
