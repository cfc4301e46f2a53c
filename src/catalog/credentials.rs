use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// FANZA affiliate API credentials read from the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogCredentials {
    pub api_id: String,
    pub affiliate_id: String,
}

impl CatalogCredentials {
    /// Read credentials from a JSON settings file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not contain both fields.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("Invalid settings file {}", path.display()))
    }

    /// Parse credentials from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the JSON is invalid or a field is missing.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse credentials JSON")
    }
}
