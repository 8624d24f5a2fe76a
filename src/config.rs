// src/config.rs
// =============================================================================
// Run configuration for a harvest.
//
// Every knob has a default matching the local ICD-API container setup, and
// the CLI (src/cli.rs) can override each one.
//
// Rust concepts:
// - const: compile-time values shared by the CLI defaults and Default impl
// - Copy enums: HarvestMode and Collection are plain tags, passed by value
// - &'static [T]: a slice baked into the binary, returned without allocating
// - impl Default: lets callers write `..HarvestConfig::default()`
// =============================================================================

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Base address of the locally hosted ICD API.
pub const DEFAULT_BASE_URL: &str = "http://localhost";
/// ICD-11 release served by the local container.
pub const DEFAULT_RELEASE: &str = "2025-01";
/// Mortality and Morbidity Statistics linearization.
pub const DEFAULT_LINEARIZATION: &str = "mms";
/// Recursion ceiling for the tree walk.
pub const DEFAULT_MAX_DEPTH: usize = 50;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Which collections a harvest walks.
//
// ValueEnum (from clap) turns each variant into an accepted --mode value,
// lowercased: foundation, mms, both. #[default] marks the variant that
// #[derive(Default)] picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HarvestMode {
    /// Only the Foundation hierarchy
    Foundation,
    /// Only the MMS linearization
    #[default]
    Mms,
    /// Both, plus a combined file
    Both,
}

impl HarvestMode {
    pub fn collections(self) -> &'static [Collection] {
        // Foundation first in "both" mode, so the combined file lists it first
        match self {
            HarvestMode::Foundation => &[Collection::Foundation],
            HarvestMode::Mms => &[Collection::Mms],
            HarvestMode::Both => &[Collection::Foundation, Collection::Mms],
        }
    }

    /// Whether the run also writes the concatenated `icd11_complete.csv`.
    pub fn writes_combined(self) -> bool {
        matches!(self, HarvestMode::Both)
    }
}

/// A top-level root exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Foundation,
    Mms,
}

impl Collection {
    pub fn label(self) -> &'static str {
        match self {
            Collection::Foundation => "Foundation",
            Collection::Mms => "MMS",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Foundation => "icd11_foundation.csv",
            Collection::Mms => "icd11_mms.csv",
        }
    }

    /// URL of the collection root on the configured server.
    pub fn root_url(self, config: &HarvestConfig) -> String {
        // Both roots answer with {"child": [...]} listing their top-level entities
        match self {
            Collection::Foundation => format!("{}/icd/entity", config.base()),
            Collection::Mms => format!(
                "{}/icd/release/11/{}/{}",
                config.base(),
                config.release,
                config.linearization
            ),
        }
    }
}

pub const COMBINED_FILE_NAME: &str = "icd11_complete.csv";

/// Everything a harvest needs to know before it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    pub base_url: String,
    pub release: String,
    pub linearization: String,
    pub output_dir: PathBuf,
    pub max_depth: usize,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    /// Value of the `API-Version` header.
    pub api_version: String,
    /// Value of the `Accept-Language` header.
    pub language: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            release: DEFAULT_RELEASE.to_string(),
            linearization: DEFAULT_LINEARIZATION.to_string(),
            output_dir: PathBuf::from("."),
            max_depth: DEFAULT_MAX_DEPTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            api_version: "v2".to_string(),
            language: "en".to_string(),
        }
    }
}

impl HarvestConfig {
    /// Base address without a trailing slash, ready for path concatenation.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Rejects base addresses that could never be fetched.
    pub fn validate(&self) -> Result<()> {
        // Parse with the url crate; with_context adds our message on top
        // of the parser's own error
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL '{}'", self.base_url))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow!(
                "Base URL must be http or https, got '{}'",
                self.base_url
            ));
        }
        // e.g. "http:/no-host" parses but has nowhere to connect to
        if url.host_str().is_none() {
            return Err(anyhow!("Base URL has no host: {}", self.base_url));
        }

        Ok(())
    }
}
