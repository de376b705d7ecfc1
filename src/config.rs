//! Validation settings for record construction and decoding.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What `make` does when the stop position disagrees with the reference
/// allele length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopPolicy {
    /// Reject the record.
    #[default]
    Strict,
    /// Log a warning and keep the record.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub stop_policy: StopPolicy,
    /// Compare AN/AC attributes with the genotypes while building.
    pub check_chromosome_counts: bool,
    /// Default leniency for `VariantContext::fully_decode_with_config`.
    pub lenient_decoding: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            stop_policy: StopPolicy::Strict,
            check_chromosome_counts: false,
            lenient_decoding: false,
        }
    }
}

impl ValidationConfig {
    pub fn lenient() -> Self {
        Self {
            stop_policy: StopPolicy::Lenient,
            check_chromosome_counts: false,
            lenient_decoding: true,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse validation config")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }
}
