//! End-to-end filter build.
//!
//! Control flow:
//! 1. Load exclusions (and, in extended mode, the prior MD5 snapshot)
//! 2. Ingest the domain list (standard mode only)
//! 3. Ingest every feed, one at a time, in sorted path order
//! 4. Finalize the filters per the configured sizing strategy
//! 5. Run the exclusion self-check
//! 6. Write the four artifacts

use std::path::{Path, PathBuf};

use crate::artifact::write_artifacts;
use crate::check::check_exclusions;
use crate::config::{BuildConfig, RunMode};
use crate::ingest::{ExclusionSet, Ingested, PriorSnapshot, RunContext};
use crate::layout::Layout;
use crate::stats::RunReport;
use crate::{Error, Result};

/// A configured filter build over one signature directory.
#[derive(Debug, Clone)]
pub struct Pipeline {
    layout: Layout,
    config: BuildConfig,
    mode: RunMode,
    domain_list: Option<PathBuf>,
    prior_override: Option<PathBuf>,
}

impl Pipeline {
    /// Create a pipeline; the mode is inferred from the directory name.
    pub fn new(base: impl Into<PathBuf>, config: BuildConfig) -> Self {
        let base = base.into();
        let mode = RunMode::detect(&base);
        Self {
            layout: Layout::new(base),
            config,
            mode,
            domain_list: None,
            prior_override: None,
        }
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Plain-text domain list, honored in standard mode only.
    pub fn with_domain_list(mut self, path: impl Into<PathBuf>) -> Self {
        self.domain_list = Some(path.into());
        self
    }

    /// Prior MD5 artifact to dedup against instead of the default location.
    pub fn with_prior(mut self, path: impl Into<PathBuf>) -> Self {
        self.prior_override = Some(path.into());
        self
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Run every stage and write the artifacts.
    pub fn run(&self) -> Result<RunReport> {
        let ingested = self.build()?;

        log::info!("Testing exclusions:");
        let hits = check_exclusions(&ingested.exclusions, &ingested.filters);

        let artifacts = write_artifacts(&ingested.filters, &self.layout);

        let mut report = RunReport::new(
            self.mode,
            ingested.strategy,
            ingested.statistics,
            &ingested.filters,
        );
        report.exclusion_hits = hits;
        report.artifacts = artifacts;
        report.log_summary();
        Ok(report)
    }

    /// Ingest everything and finalize the filters, without writing.
    pub fn build(&self) -> Result<Ingested> {
        self.config.validate()?;
        let base = self.layout.signatures_dir();
        if !base.is_dir() {
            return Err(Error::MissingDirectory(base.to_path_buf()));
        }
        log::info!(
            "Building {} filters in {} mode from {:?}",
            self.config.strategy,
            self.mode,
            base
        );

        log::info!("Processing exclusions:");
        let exclusions =
            ExclusionSet::load_dir(&self.layout.exclusions_dir(), self.config.missing_exclusions)?;

        let builder = self.config.strategy.builder(&self.config.plan(self.mode))?;
        let mut ctx =
            RunContext::new(exclusions, builder).with_quiet_formats(self.config.quiet_formats.clone());

        if self.mode.is_extended() {
            if let Some(prior) = PriorSnapshot::load_optional(&self.prior_path()) {
                ctx = ctx.with_prior(prior);
            }
        }

        if let Some(domains) = &self.domain_list {
            self.ingest_domains(&mut ctx, domains);
        }

        log::info!("Processing signatures:");
        let sources = self.layout.discover_sources(self.mode)?;
        ctx.ingest_sources(&sources);

        ctx.finish()
    }

    fn prior_path(&self) -> PathBuf {
        self.prior_override
            .clone()
            .unwrap_or_else(|| self.layout.prior_snapshot())
    }

    fn ingest_domains(&self, ctx: &mut RunContext, path: &Path) {
        if self.mode.is_extended() {
            log::info!("Ignoring domain list {:?} in extended mode", path);
            return;
        }
        if !path.exists() {
            log::warn!("Domain list {:?} does not exist", path);
            return;
        }

        log::info!("Processing domains:");
        match ctx.ingest_domain_file(path) {
            Ok(added) => log::info!("\tLoaded {} domains", added),
            Err(e) => log::error!("Failed to read domain list {:?}: {}", path, e),
        }
    }
}
