//! Ingestion: parse, validate, exclude, dedup, accumulate.
//!
//! [`RunContext`] carries everything a run mutates: the filter builder
//! and the counters. The exclusion set and prior snapshot it holds are
//! read-only for the lifetime of the run.

mod exclusion;
mod line;
mod snapshot;

pub use exclusion::ExclusionSet;
pub use line::{extract_token, LineToken};
pub use snapshot::PriorSnapshot;

use std::io::BufRead;
use std::path::Path;

use crate::builder::{FilterBuilder, FilterSet, SizingStrategy};
use crate::signature::{classify, Validation};
use crate::source::{open_lines, Reporting, SourceFile, SourceFormat};
use crate::stats::RunStatistics;
use crate::{FilterKind, Result, SignatureKind};

/// What happened to a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Empty, comment, or missing separator
    Skipped,
    /// Failed hex or length validation
    Invalid,
    /// On the allowlist
    Excluded(SignatureKind),
    /// Already in the prior snapshot
    Deduped,
    /// Newly recorded
    Added(SignatureKind),
    /// Valid but already recorded during this run
    Duplicate(SignatureKind),
}

/// Per-file added counts, for progress output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileCounts {
    pub md5: u64,
    pub sha1: u64,
    pub sha256: u64,
}

/// Output of ingestion, ready for the self-check and the writer.
pub struct Ingested {
    pub filters: FilterSet,
    pub statistics: RunStatistics,
    pub exclusions: ExclusionSet,
    pub strategy: SizingStrategy,
}

/// Mutable state threaded through one run.
pub struct RunContext {
    exclusions: ExclusionSet,
    prior: Option<PriorSnapshot>,
    builder: Box<dyn FilterBuilder>,
    quiet_formats: Vec<SourceFormat>,
    stats: RunStatistics,
}

impl RunContext {
    pub fn new(exclusions: ExclusionSet, builder: Box<dyn FilterBuilder>) -> Self {
        let stats = RunStatistics {
            exclusions_loaded: exclusions.len() as u64,
            ..Default::default()
        };
        Self {
            exclusions,
            prior: None,
            builder,
            quiet_formats: Vec::new(),
            stats,
        }
    }

    /// Enable MD5 dedup against a prior snapshot.
    pub fn with_prior(mut self, prior: PriorSnapshot) -> Self {
        self.stats.prior_entries = Some(prior.approximate_element_count());
        self.prior = Some(prior);
        self
    }

    /// Formats whose rejected tokens are logged at debug level only.
    pub fn with_quiet_formats(mut self, formats: impl IntoIterator<Item = SourceFormat>) -> Self {
        self.quiet_formats = formats.into_iter().collect();
        self
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    fn reporting(&self, format: SourceFormat) -> Reporting {
        if self.quiet_formats.contains(&format) {
            Reporting::Quiet
        } else {
            Reporting::Verbose
        }
    }

    /// Validate a normalized token and accumulate it if it survives.
    pub fn ingest_token(&mut self, token: &str, reporting: Reporting) -> Outcome {
        let kind = match classify(token) {
            Validation::Skip => {
                self.stats.lines_skipped += 1;
                return Outcome::Skipped;
            }
            Validation::Valid(kind) => kind,
            Validation::InvalidLength => {
                self.reject("INVALID LENGTH", token, reporting);
                return Outcome::Invalid;
            }
            Validation::NotHexadecimal => {
                self.reject("NOT HEXADECIMAL", token, reporting);
                return Outcome::Invalid;
            }
        };

        if self.exclusions.contains(token) {
            log::info!("\t\tSkipping excluded hash: {}", token);
            self.stats.kind_mut(kind).excluded += 1;
            return Outcome::Excluded(kind);
        }

        self.stats.lines_valid += 1;
        self.stats.kind_mut(kind).read += 1;

        if kind == SignatureKind::Md5 {
            if let Some(prior) = &self.prior {
                if prior.might_contain(token) {
                    self.stats.md5.deduped += 1;
                    return Outcome::Deduped;
                }
            }
        }

        if self.builder.accumulate(kind.filter(), token) {
            self.stats.kind_mut(kind).added += 1;
            Outcome::Added(kind)
        } else {
            Outcome::Duplicate(kind)
        }
    }

    /// Extract, validate and accumulate one raw line of a feed.
    pub fn ingest_line(&mut self, line: &str, format: SourceFormat) -> Outcome {
        match extract_token(line, format) {
            LineToken::Token(token) => self.ingest_token(&token, self.reporting(format)),
            LineToken::Skip => {
                self.stats.lines_skipped += 1;
                Outcome::Skipped
            }
        }
    }

    /// Drain a line source of the given format.
    ///
    /// Lines are decoded lossily so a stray non-UTF-8 byte costs one token,
    /// not the rest of the file.
    pub fn ingest_reader<R: BufRead>(&mut self, reader: R, format: SourceFormat) -> Result<FileCounts> {
        let before = self.added_signatures();
        for_each_line(reader, |line| {
            self.ingest_line(line, format);
        })?;
        Ok(self.delta(before))
    }

    /// Ingest one feed file. Errors are returned, not logged; counts up to
    /// the failure point stay recorded.
    pub fn ingest_file(&mut self, source: &SourceFile) -> Result<FileCounts> {
        let reader = source.open()?;
        self.ingest_reader(reader, source.format)
    }

    /// Ingest a sequence of feeds in order, isolating failures per file.
    pub fn ingest_sources(&mut self, sources: &[SourceFile]) {
        for source in sources {
            log::info!("\t{}", source.name());
            let before = self.added_signatures();
            match self.ingest_file(source) {
                Ok(counts) => {
                    self.stats.files_processed += 1;
                    log::info!(
                        "\t\tmd5: {}, sha1: {}, sha256: {}",
                        counts.md5,
                        counts.sha1,
                        counts.sha256
                    );
                }
                Err(e) => {
                    self.stats.files_failed += 1;
                    let partial = self.delta(before);
                    log::error!(
                        "Failed to read {:?} after md5: {}, sha1: {}, sha256: {}: {}",
                        source.path,
                        partial.md5,
                        partial.sha1,
                        partial.sha256,
                        e
                    );
                }
            }
        }
    }

    /// Accumulate one raw line of a domain list.
    pub fn ingest_domain_line(&mut self, line: &str) -> bool {
        self.stats.domains_read += 1;
        let domain = line.trim().to_lowercase();
        if domain.is_empty() || domain.starts_with('#') {
            return false;
        }
        let added = self.builder.accumulate(FilterKind::Domains, &domain);
        if added {
            self.stats.domains_added += 1;
        }
        added
    }

    /// Drain a plain-text domain list.
    pub fn ingest_domains<R: BufRead>(&mut self, reader: R) -> Result<u64> {
        let before = self.stats.domains_added;
        for_each_line(reader, |line| {
            self.ingest_domain_line(line);
        })?;
        Ok(self.stats.domains_added - before)
    }

    /// Ingest a domain list file.
    pub fn ingest_domain_file(&mut self, path: &Path) -> Result<u64> {
        let compressed = path.extension().map(|e| e == "gz").unwrap_or(false);
        let reader = open_lines(path, compressed)?;
        self.ingest_domains(reader)
    }

    /// Finalize the filters.
    pub fn finish(self) -> Result<Ingested> {
        let strategy = self.builder.strategy();
        let filters = self.builder.finish()?;
        Ok(Ingested {
            filters,
            statistics: self.stats,
            exclusions: self.exclusions,
            strategy,
        })
    }

    fn reject(&mut self, reason: &str, token: &str, reporting: Reporting) {
        self.stats.lines_invalid += 1;
        match reporting {
            Reporting::Verbose => log::info!("\t\t{}: {}", reason, token),
            Reporting::Quiet => log::debug!("\t\t{}: {}", reason, token),
        }
    }

    fn added_signatures(&self) -> FileCounts {
        FileCounts {
            md5: self.stats.md5.added,
            sha1: self.stats.sha1.added,
            sha256: self.stats.sha256.added,
        }
    }

    fn delta(&self, before: FileCounts) -> FileCounts {
        let now = self.added_signatures();
        FileCounts {
            md5: now.md5 - before.md5,
            sha1: now.sha1 - before.sha1,
            sha256: now.sha256 - before.sha256,
        }
    }
}

/// Call `f` for every line, stripping `\n` / `\r\n`, decoding lossily.
pub(crate) fn for_each_line<R: BufRead, F: FnMut(&str)>(mut reader: R, mut f: F) -> Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        f(&String::from_utf8_lossy(&buf));
    }
}
