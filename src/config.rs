//! Build configuration.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bloom::format::{filter_params, validate_fpp, DEFAULT_FPP};
use crate::builder::{FilterPlan, SizingStrategy};
use crate::source::SourceFormat;
use crate::{FilterKind, Result};

/// Execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Regular build: domains and extras are ingested, no cross-run dedup.
    #[default]
    Standard,
    /// Large MD5 build deduplicated against the previous production filter.
    Extended,
}

impl RunMode {
    /// Extended mode is implied by a base directory named `*-extended*`.
    pub fn detect(base: &Path) -> Self {
        if base.to_string_lossy().contains("-extended") {
            RunMode::Extended
        } else {
            RunMode::Standard
        }
    }

    pub fn is_extended(self) -> bool {
        self == RunMode::Extended
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Standard => "standard",
            RunMode::Extended => "extended",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to do when the exclusions directory is absent or unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingExclusions {
    /// Proceed with an empty exclusion set and log a warning.
    #[default]
    Warn,
    /// Refuse to start the run.
    Fail,
}

/// Expected insertions per filter, used by the streaming strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capacities {
    pub md5: u64,
    pub md5_extended: u64,
    pub sha1: u64,
    pub sha256: u64,
    pub domains: u64,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            md5: 7_600_000,
            md5_extended: 52_000_000,
            sha1: 100_000,
            sha256: 2_200_000,
            domains: 4_500_000,
        }
    }
}

impl Capacities {
    /// Capacity of one filter in the given mode.
    pub fn for_filter(&self, kind: FilterKind, mode: RunMode) -> u64 {
        match kind {
            FilterKind::Md5 if mode.is_extended() => self.md5_extended,
            FilterKind::Md5 => self.md5,
            FilterKind::Sha1 => self.sha1,
            FilterKind::Sha256 => self.sha256,
            FilterKind::Domains => self.domains,
        }
    }
}

/// Configuration for a filter build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Target false positive rate for every filter
    pub fpp: f64,
    /// Filter construction strategy
    pub strategy: SizingStrategy,
    /// Per-filter capacities (streaming strategy)
    pub capacities: Capacities,
    /// Formats whose rejected tokens are only logged at debug level
    pub quiet_formats: Vec<SourceFormat>,
    /// Policy for an absent exclusions directory
    pub missing_exclusions: MissingExclusions,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            fpp: DEFAULT_FPP,
            strategy: SizingStrategy::default(),
            capacities: Capacities::default(),
            quiet_formats: vec![SourceFormat::Text],
            missing_exclusions: MissingExclusions::default(),
        }
    }
}

impl BuildConfig {
    /// Parse a YAML configuration. Missing keys keep their defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check values that cannot be expressed in the types.
    ///
    /// The rate must also give a hash count that fits the artifact header,
    /// for a single-entry filter and for every configured capacity.
    pub fn validate(&self) -> Result<()> {
        validate_fpp(self.fpp)?;
        filter_params(1, self.fpp)?;
        for mode in [RunMode::Standard, RunMode::Extended] {
            for capacity in self.plan(mode).capacities {
                filter_params(capacity, self.fpp)?;
            }
        }
        Ok(())
    }

    /// Capacities and rate handed to the filter builder.
    pub fn plan(&self, mode: RunMode) -> FilterPlan {
        let mut capacities = [0; 4];
        for kind in FilterKind::ALL {
            capacities[kind.index()] = self.capacities.for_filter(kind, mode);
        }
        FilterPlan {
            fpp: self.fpp,
            capacities,
        }
    }
}
