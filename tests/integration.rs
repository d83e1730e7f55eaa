//! End-to-end tests over temporary signature directories.

use flate2::write::GzEncoder;
use flate2::Compression;
use sigbloom::layout::artifact_name;
use sigbloom::{
    BloomFilter, BuildConfig, Capacities, FilterKind, MissingExclusions, Pipeline, RunMode, SizingStrategy,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const DEADBEEF: &str = "deadbeefdeadbeefdeadbeefdeadbeef";

/// `<root>/signatures` plus helpers for sibling directories.
struct Fixture {
    root: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join("signatures")).unwrap();
        fs::create_dir(root.path().join("exclusions")).unwrap();
        Self { root }
    }

    fn signatures(&self) -> PathBuf {
        self.root.path().join("signatures")
    }

    fn write(&self, dir: &str, name: &str, content: &str) -> PathBuf {
        let dir = self.root.path().join(dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn write_gz(&self, dir: &str, name: &str, content: &str) {
        let path = self.root.path().join(dir).join(name);
        let mut encoder = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    fn artifact(&self, kind: FilterKind) -> BloomFilter {
        BloomFilter::open(self.signatures().join(artifact_name(kind))).unwrap()
    }
}

fn small_config(strategy: SizingStrategy) -> BuildConfig {
    BuildConfig {
        fpp: 0.0001,
        strategy,
        capacities: Capacities {
            md5: 1000,
            md5_extended: 2000,
            sha1: 1000,
            sha256: 1000,
            domains: 1000,
        },
        ..Default::default()
    }
}

fn strategies() -> [SizingStrategy; 2] {
    [SizingStrategy::Streaming, SizingStrategy::Exact]
}

#[test]
fn test_hashes_file_single_md5() {
    for strategy in strategies() {
        let fx = Fixture::new();
        fx.write("signatures", "feed.hashes", &format!("{}\n", "a".repeat(32)));

        let report = Pipeline::new(fx.signatures(), small_config(strategy)).run().unwrap();
        assert_eq!(report.statistics.md5.added, 1);
        assert_eq!(report.statistics.lines_valid, 1);
        assert!(fx.artifact(FilterKind::Md5).might_contain(&"a".repeat(32)));
    }
}

#[test]
fn test_hdb_line_extracts_md5() {
    let fx = Fixture::new();
    fx.write("signatures", "main.hdb", &format!("{}:1024:sample:1\n", DEADBEEF));

    let report = Pipeline::new(fx.signatures(), small_config(SizingStrategy::Streaming))
        .run()
        .unwrap();
    assert_eq!(report.statistics.md5.added, 1);
    assert!(fx.artifact(FilterKind::Md5).might_contain(DEADBEEF));
}

#[test]
fn test_exclusion_skips_hash() {
    for strategy in strategies() {
        let fx = Fixture::new();
        fx.write("signatures", "main.hdb", &format!("{}:1024:sample:1\n", DEADBEEF));
        fx.write("exclusions", "allow.txt", &format!("{}:known-good\n", DEADBEEF));

        let report = Pipeline::new(fx.signatures(), small_config(strategy)).run().unwrap();
        assert_eq!(report.statistics.md5.added, 0);
        assert_eq!(report.statistics.md5.excluded, 1);
        assert_eq!(report.statistics.exclusions_loaded, 1);
        assert!(report.exclusion_hits.is_empty());
        assert!(!fx.artifact(FilterKind::Md5).might_contain(DEADBEEF));
    }
}

#[test]
fn test_latin1_allowlist_still_excludes() {
    let fx = Fixture::new();
    let mut allowlist = b"# allowlist \xe9t\xe9\n".to_vec();
    allowlist.extend_from_slice(format!("{}:known-good\n", DEADBEEF).as_bytes());
    fs::write(fx.root.path().join("exclusions").join("allow.txt"), allowlist).unwrap();
    fx.write("signatures", "feed.md5", &format!("{}\n", DEADBEEF));

    let report = Pipeline::new(fx.signatures(), small_config(SizingStrategy::Exact))
        .run()
        .unwrap();
    assert_eq!(report.statistics.exclusions_loaded, 1);
    assert_eq!(report.statistics.md5.excluded, 1);
    assert_eq!(report.statistics.md5.added, 0);
    assert!(!fx.artifact(FilterKind::Md5).might_contain(DEADBEEF));
}

#[test]
fn test_non_hex_line_is_invalid() {
    let fx = Fixture::new();
    fx.write("signatures", "feed.md5", "not-a-hash\n");

    let report = Pipeline::new(fx.signatures(), small_config(SizingStrategy::Exact))
        .run()
        .unwrap();
    assert_eq!(report.statistics.lines_invalid, 1);
    for kind in FilterKind::ALL {
        assert_eq!(fx.artifact(kind).bit_count(), 0, "{} was mutated", kind);
    }
}

#[test]
fn test_mixed_formats_and_compression() {
    let fx = Fixture::new();
    fx.write(
        "signatures",
        "a.sha256",
        &format!("# sha256 feed\n{}\n{}\n", "1".repeat(64), "2".repeat(64)),
    );
    fx.write("signatures", "b.loki", &format!("{};Trojan.Generic\n", "3".repeat(40)));
    fx.write_gz("signatures", "c.hsb.gz", &format!("{}:2048:Win.Trojan:73\n", "4".repeat(64)));
    fx.write("signatures", "d.txt", "some prose\nabc\n");
    fx.write("signatures", "ignored.csv", &format!("{}\n", "5".repeat(32)));

    let report = Pipeline::new(fx.signatures(), small_config(SizingStrategy::Streaming))
        .run()
        .unwrap();
    let s = &report.statistics;
    assert_eq!(s.sha256.added, 3);
    assert_eq!(s.sha1.added, 1);
    assert_eq!(s.md5.added, 0);
    assert_eq!(s.lines_invalid, 2);
    assert_eq!(s.files_processed, 4);

    let sha256 = fx.artifact(FilterKind::Sha256);
    assert!(sha256.might_contain(&"4".repeat(64)));
    assert!(fx.artifact(FilterKind::Sha1).might_contain(&"3".repeat(40)));
}

#[test]
fn test_corrupt_gzip_does_not_abort_run() {
    let fx = Fixture::new();
    fx.write("signatures", "a.md5.gz", "this is not gzip data");
    fx.write("signatures", "b.md5", &format!("{}\n", "6".repeat(32)));

    let report = Pipeline::new(fx.signatures(), small_config(SizingStrategy::Streaming))
        .run()
        .unwrap();
    assert_eq!(report.statistics.files_failed, 1);
    assert_eq!(report.statistics.files_processed, 1);
    assert_eq!(report.statistics.md5.added, 1);
    assert!(report.artifacts_complete());
}

#[test]
fn test_domains_and_extras_in_standard_mode() {
    let fx = Fixture::new();
    fx.write("signatures", "main.hashes", &format!("{}\n", "7".repeat(32)));
    fx.write("extras", "extra.hashes", &format!("{}\n", "8".repeat(32)));
    let domains = fx.write("lists", "domains.txt", "# blocklist\nEVIL.example\nads.test\n");

    let report = Pipeline::new(fx.signatures(), small_config(SizingStrategy::Exact))
        .with_domain_list(&domains)
        .run()
        .unwrap();
    assert_eq!(report.mode, RunMode::Standard);
    assert_eq!(report.statistics.md5.added, 2);
    assert_eq!(report.statistics.domains_added, 2);

    let domain_filter = fx.artifact(FilterKind::Domains);
    assert!(domain_filter.might_contain("evil.example"));
    assert!(domain_filter.might_contain("ads.test"));
}

#[test]
fn test_extended_mode_dedups_against_prior() {
    let fx = Fixture::new();
    let known = "9".repeat(32);
    let fresh = "a".repeat(32);

    let mut prior = BloomFilter::with_capacity(100, 0.0001).unwrap();
    prior.put(&known);
    let production = fx.root.path().join("production");
    fs::create_dir(&production).unwrap();
    fs::write(production.join(artifact_name(FilterKind::Md5)), prior.to_bytes().unwrap()).unwrap();

    fx.write("signatures", "feed.md5", &format!("{}\n{}\n", known, fresh));
    fx.write("extras", "extra.md5", &format!("{}\n", "b".repeat(32)));
    let domains = fx.write("lists", "domains.txt", "evil.example\n");

    for strategy in strategies() {
        let report = Pipeline::new(fx.signatures(), small_config(strategy))
            .with_mode(RunMode::Extended)
            .with_domain_list(&domains)
            .run()
            .unwrap();
        let s = &report.statistics;
        assert_eq!(s.md5.deduped, 1);
        assert_eq!(s.md5.added, 1);
        assert_eq!(s.md5.read, 2);
        assert_eq!(s.domains_added, 0, "domain list is ignored in extended mode");
        assert!(s.prior_entries.is_some());

        let md5 = fx.artifact(FilterKind::Md5);
        assert!(md5.might_contain(&fresh));
    }
}

#[test]
fn test_extended_mode_inferred_from_directory_name() {
    let root = tempdir().unwrap();
    let base = root.path().join("hypatia-extended");
    fs::create_dir(&base).unwrap();
    let pipeline = Pipeline::new(&base, small_config(SizingStrategy::Streaming));
    assert_eq!(pipeline.mode(), RunMode::Extended);

    let report = pipeline.run().unwrap();
    let md5 = report.filter(FilterKind::Md5).unwrap();
    assert_eq!(md5.capacity, 2000);
}

#[test]
fn test_missing_exclusions_policy() {
    let root = tempdir().unwrap();
    let base = root.path().join("signatures");
    fs::create_dir(&base).unwrap();

    let warn = Pipeline::new(&base, small_config(SizingStrategy::Streaming)).run();
    assert!(warn.is_ok());

    let config = BuildConfig {
        missing_exclusions: MissingExclusions::Fail,
        ..small_config(SizingStrategy::Streaming)
    };
    assert!(Pipeline::new(&base, config).run().is_err());
}

#[test]
fn test_missing_signature_directory() {
    let root = tempdir().unwrap();
    let result = Pipeline::new(root.path().join("absent"), small_config(SizingStrategy::Exact)).run();
    assert!(result.is_err());
}

#[test]
fn test_exact_sizes_to_population() {
    let fx = Fixture::new();
    let lines: String = (0..300u32).map(|i| format!("{:040x}\n", i)).collect();
    fx.write("signatures", "feed.sha1", &lines);

    let report = Pipeline::new(fx.signatures(), small_config(SizingStrategy::Exact))
        .run()
        .unwrap();
    let sha1 = report.filter(FilterKind::Sha1).unwrap();
    assert_eq!(sha1.capacity, 300);
    assert_eq!(sha1.added, 300);
    assert!((sha1.fill_percent - 100.0).abs() < 1e-9);

    let streaming = Pipeline::new(fx.signatures(), small_config(SizingStrategy::Streaming))
        .run()
        .unwrap();
    assert_eq!(streaming.filter(FilterKind::Sha1).unwrap().capacity, 1000);
}

#[test]
fn test_artifacts_reload_without_false_negatives() {
    let fx = Fixture::new();
    let lines: String = (0..500u32).map(|i| format!("{:032x}\n", i)).collect();
    fx.write("signatures", "feed.md5", &lines);

    Pipeline::new(fx.signatures(), small_config(SizingStrategy::Streaming))
        .run()
        .unwrap();
    let md5 = fx.artifact(FilterKind::Md5);
    for i in 0..500u32 {
        assert!(md5.might_contain(&format!("{:032x}", i)));
    }
}

#[test]
fn test_report_json_export() {
    let fx = Fixture::new();
    fx.write("signatures", "feed.hashes", &format!("{}\n", "c".repeat(64)));

    let report = Pipeline::new(fx.signatures(), small_config(SizingStrategy::Streaming))
        .run()
        .unwrap();
    let path: &Path = &fx.root.path().join("report.json");
    report.save(path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["statistics"]["sha256"]["added"], 1);
    assert_eq!(json["strategy"], "streaming");
    assert_eq!(json["artifacts"].as_array().unwrap().len(), 4);
}
