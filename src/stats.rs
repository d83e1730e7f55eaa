//! Run counters and the end-of-run report.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactRecord;
use crate::builder::{FilterSet, SizingStrategy};
use crate::check::ExclusionHit;
use crate::config::RunMode;
use crate::error::Result;
use crate::{FilterKind, SignatureKind};

/// Counters for one signature kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounters {
    /// Valid, non-excluded tokens of this kind
    pub read: u64,
    /// Tokens newly recorded by the builder
    pub added: u64,
    /// Tokens skipped because the prior snapshot already held them
    pub deduped: u64,
    /// Tokens skipped because they are on the allowlist
    pub excluded: u64,
}

/// Observational counters for a run. Never drives control flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub lines_valid: u64,
    pub lines_invalid: u64,
    /// Empty lines, comments and lines lacking their format's separator
    pub lines_skipped: u64,
    pub files_processed: u64,
    pub files_failed: u64,
    pub md5: KindCounters,
    pub sha1: KindCounters,
    pub sha256: KindCounters,
    pub domains_read: u64,
    pub domains_added: u64,
    pub exclusions_loaded: u64,
    /// Approximate entries in the prior snapshot, when one was loaded
    pub prior_entries: Option<u64>,
}

impl RunStatistics {
    pub fn kind(&self, kind: SignatureKind) -> &KindCounters {
        match kind {
            SignatureKind::Md5 => &self.md5,
            SignatureKind::Sha1 => &self.sha1,
            SignatureKind::Sha256 => &self.sha256,
        }
    }

    pub fn kind_mut(&mut self, kind: SignatureKind) -> &mut KindCounters {
        match kind {
            SignatureKind::Md5 => &mut self.md5,
            SignatureKind::Sha1 => &mut self.sha1,
            SignatureKind::Sha256 => &mut self.sha256,
        }
    }

    /// Values newly recorded into a filter.
    pub fn added(&self, kind: FilterKind) -> u64 {
        match kind {
            FilterKind::Md5 => self.md5.added,
            FilterKind::Sha1 => self.sha1.added,
            FilterKind::Sha256 => self.sha256.added,
            FilterKind::Domains => self.domains_added,
        }
    }
}

/// Parameters and fill of one finalized filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub kind: FilterKind,
    pub bit_size: u64,
    pub num_hash_functions: u32,
    /// Configured capacity (streaming) or realized population (exact)
    pub capacity: u64,
    pub added: u64,
    /// `added` relative to `capacity`, in percent
    pub fill_percent: f64,
    pub approximate_count: u64,
    pub target_fpp: f64,
    pub expected_fpp: f64,
}

impl FilterSummary {
    fn new(kind: FilterKind, filters: &FilterSet, stats: &RunStatistics) -> Self {
        let filter = filters.get(kind);
        let (capacity, target_fpp) = filter
            .sizing()
            .map(|s| (s.expected_insertions, s.target_fpp))
            .unwrap_or((0, 0.0));
        let added = stats.added(kind);
        let fill_percent = if capacity == 0 {
            0.0
        } else {
            100.0 / capacity as f64 * added as f64
        };

        Self {
            kind,
            bit_size: filter.bit_size(),
            num_hash_functions: filter.num_hash_functions(),
            capacity,
            added,
            fill_percent,
            approximate_count: filter.approximate_element_count(),
            target_fpp,
            expected_fpp: filter.expected_fpp(),
        }
    }
}

/// Everything a run produced, for logging and JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub mode: RunMode,
    pub strategy: SizingStrategy,
    pub statistics: RunStatistics,
    pub filters: Vec<FilterSummary>,
    pub exclusion_hits: Vec<ExclusionHit>,
    pub artifacts: Vec<ArtifactRecord>,
}

impl RunReport {
    pub fn new(
        mode: RunMode,
        strategy: SizingStrategy,
        statistics: RunStatistics,
        filters: &FilterSet,
    ) -> Self {
        let summaries = FilterKind::ALL
            .iter()
            .map(|kind| FilterSummary::new(*kind, filters, &statistics))
            .collect();
        Self {
            mode,
            strategy,
            statistics,
            filters: summaries,
            exclusion_hits: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    pub fn filter(&self, kind: FilterKind) -> Option<&FilterSummary> {
        self.filters.iter().find(|f| f.kind == kind)
    }

    /// Sum of the approximate counts of the three signature filters.
    pub fn reported_signature_count(&self) -> u64 {
        self.filters
            .iter()
            .filter(|f| f.kind != FilterKind::Domains)
            .map(|f| f.approximate_count)
            .sum()
    }

    /// True if every artifact was written.
    pub fn artifacts_complete(&self) -> bool {
        self.artifacts.len() == FilterKind::ALL.len() && self.artifacts.iter().all(|a| a.error.is_none())
    }

    /// Write the report as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Log the human-readable summary.
    pub fn log_summary(&self) {
        let s = &self.statistics;
        log::info!(
            "Lines read: valid: {}, invalid: {}, skipped: {}",
            s.lines_valid,
            s.lines_invalid,
            s.lines_skipped
        );
        log::info!(
            "Read count: md5: {}, sha1: {}, sha256: {}, domains: {}",
            s.md5.read,
            s.sha1.read,
            s.sha256.read,
            s.domains_read
        );
        log::info!(
            "Added count: md5: {}, sha1: {}, sha256: {}, domains: {}",
            s.md5.added,
            s.sha1.added,
            s.sha256.added,
            s.domains_added
        );
        log::info!(
            "Excluded count: md5: {}, sha1: {}, sha256: {}",
            s.md5.excluded,
            s.sha1.excluded,
            s.sha256.excluded
        );
        if self.mode.is_extended() {
            log::info!("Deduped count: md5: {}", s.md5.deduped);
        }
        for f in &self.filters {
            log::info!(
                "{}: capacity {}, fill {:.2}%, approximate count {}, expected fpp {:e} (target {:e}), {} bits, {} hashes",
                f.kind,
                f.capacity,
                f.fill_percent,
                f.approximate_count,
                f.expected_fpp,
                f.target_fpp,
                f.bit_size,
                f.num_hash_functions
            );
        }
        log::info!("Reported signature count: {}", self.reported_signature_count());
        if s.files_failed > 0 {
            log::warn!("{} of {} files failed", s.files_failed, s.files_processed + s.files_failed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FilterPlan;

    fn report_with(added_md5: u64) -> RunReport {
        let plan = FilterPlan::uniform(1000, 0.01);
        let mut builder = SizingStrategy::Streaming.builder(&plan).unwrap();
        for i in 0..added_md5 {
            builder.accumulate(FilterKind::Md5, &format!("{:032x}", i));
        }
        let filters = builder.finish().unwrap();
        let mut stats = RunStatistics::default();
        stats.md5.added = added_md5;
        RunReport::new(RunMode::Standard, SizingStrategy::Streaming, stats, &filters)
    }

    #[test]
    fn test_fill_percent() {
        let report = report_with(250);
        let md5 = report.filter(FilterKind::Md5).unwrap();
        assert_eq!(md5.capacity, 1000);
        assert!((md5.fill_percent - 25.0).abs() < 1e-9);
        assert_eq!(report.filter(FilterKind::Sha1).unwrap().fill_percent, 0.0);
    }

    #[test]
    fn test_reported_count_excludes_domains() {
        let report = report_with(100);
        let md5 = report.filter(FilterKind::Md5).unwrap().approximate_count;
        assert_eq!(report.reported_signature_count(), md5);
    }

    #[test]
    fn test_save_json() {
        let report = report_with(10);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.save(&path).unwrap();

        let loaded: RunReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.statistics.md5.added, 10);
        assert_eq!(loaded.filters.len(), 4);
    }

    #[test]
    fn test_kind_counters() {
        let mut stats = RunStatistics::default();
        stats.kind_mut(SignatureKind::Sha256).added += 3;
        assert_eq!(stats.kind(SignatureKind::Sha256).added, 3);
        assert_eq!(stats.added(FilterKind::Sha256), 3);
    }
}
