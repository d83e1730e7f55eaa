//! Post-build exclusion self-check.

use serde::{Deserialize, Serialize};

use crate::builder::FilterSet;
use crate::ingest::ExclusionSet;
use crate::{FilterKind, SignatureKind};

/// An allowlisted hash that its filter reports as present.
///
/// Under the probabilistic contract this may be a legitimate false positive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExclusionHit {
    pub kind: FilterKind,
    pub hash: String,
}

/// Query every excluded hash against the filter matching its length.
///
/// Hits are logged as warnings and returned sorted; they never fail the run.
pub fn check_exclusions(exclusions: &ExclusionSet, filters: &FilterSet) -> Vec<ExclusionHit> {
    let mut hits: Vec<ExclusionHit> = exclusions
        .iter()
        .filter_map(|hash| {
            let kind = SignatureKind::from_len(hash.len())?.filter();
            filters.might_contain(kind, hash).then(|| ExclusionHit {
                kind,
                hash: hash.to_string(),
            })
        })
        .collect();
    hits.sort();

    for hit in &hits {
        log::warn!("\t{}: Found excluded hash {}", hit.kind, hit.hash);
    }
    if hits.is_empty() {
        log::info!("\tNo exclusions found");
    } else {
        log::warn!("\t{} exclusions were found", hits.len());
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{FilterPlan, SizingStrategy};

    #[test]
    fn test_reports_hits_per_kind() {
        let md5 = "a".repeat(32);
        let sha256 = "b".repeat(64);
        let clean = "c".repeat(40);
        let exclusions: ExclusionSet = [&md5, &sha256, &clean].into_iter().collect();

        let mut builder = SizingStrategy::Exact.builder(&FilterPlan::uniform(10, 0.0001)).unwrap();
        // Bypass ingestion to simulate an allowlisted hash leaking into a filter.
        builder.accumulate(FilterKind::Md5, &md5);
        builder.accumulate(FilterKind::Sha256, &sha256);
        let filters = builder.finish().unwrap();

        let hits = check_exclusions(&exclusions, &filters);
        assert_eq!(
            hits,
            vec![
                ExclusionHit { kind: FilterKind::Md5, hash: md5 },
                ExclusionHit { kind: FilterKind::Sha256, hash: sha256 },
            ]
        );
    }

    #[test]
    fn test_clean_build_has_no_hits() {
        let exclusions: ExclusionSet = ["d".repeat(32)].into_iter().collect();
        let builder = SizingStrategy::Streaming.builder(&FilterPlan::uniform(10, 0.0001)).unwrap();
        let filters = builder.finish().unwrap();
        assert!(check_exclusions(&exclusions, &filters).is_empty());
    }
}
