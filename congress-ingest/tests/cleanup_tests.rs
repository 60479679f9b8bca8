//! Integration tests for snapshot cleanup and merge
//!
//! Exercises `run_cleanup` end to end over YAML files on disk.

use congress_common::Error;
use congress_ingest::cleanup::{run_cleanup, CleanupOptions};
use congress_ingest::models::{Hearing, Person, RecordIssue};
use congress_ingest::storage::read_snapshot;
use std::path::Path;
use tempfile::TempDir;

const BUDGET_HEARINGS: &str = r#"
metadata:
  generated_at: "2024-01-01T00:00:00Z"
  total: 2
hearings:
  - title: Budget Hearing
    date: "2022-03-01"
    congress: 117
    chamber: Senate
    witnesses: []
  - title: Budget Hearing
    date: "2022-03-01"
    congress: 117
    chamber: Senate
    witnesses: ["A", "B"]
"#;

const PRIMARY_WITH_SOURCES: &str = r#"
metadata:
  date_range:
    start: "2021-01-01"
    end: "2022-12-31"
  congresses: [117]
hearings:
  - title: Oversight Hearing
    date: "2021-06-15"
    congress: 117
    chamber: House
    committee: Committee on Oversight
    sources:
      - url: https://example.test/s1
        type: video
  - title: Unrelated Hearing
    date: "2021-01-05"
    congress: 117
    chamber: House
"#;

const REFETCH_WITH_LOCATION: &str = r#"
metadata:
  date_range:
    start: "2020-01-01"
    end: "2021-12-31"
  congresses: [116, 117]
hearings:
  - title: Oversight Hearing
    date: "2021-06-15"
    congress: 117
    chamber: House
    committee: Committee on Oversight
    location: 2154 Rayburn House Office Building
    sources:
      - url: https://example.test/s1
        type: video
      - url: https://example.test/s2
        type: text
  - title: New Hearing
    date: "2021-07-01"
    congress: 117
    chamber: Senate
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn options(input: &Path, merge: Option<&Path>, output: &Path) -> CleanupOptions {
    CleanupOptions {
        input: input.to_path_buf(),
        merge: merge.map(Path::to_path_buf),
        output: output.to_path_buf(),
        dedupe: true,
    }
}

#[test]
fn test_budget_hearing_duplicates_collapse() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.yaml", BUDGET_HEARINGS);
    let output = dir.path().join("out.yaml");

    let outcome = run_cleanup::<Hearing>(&options(&input, None, &output)).unwrap();

    assert_eq!(outcome.loaded_primary, 2);
    assert_eq!(outcome.duplicates, 1);
    assert_eq!(outcome.total, 1);

    let written: Vec<Hearing> = read_snapshot(&output).unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(
        written[0].witnesses,
        Some(vec![Person::named("A"), Person::named("B")])
    );

    let raw = std::fs::read_to_string(&output).unwrap();
    assert!(raw.contains("status: complete"));
    assert!(raw.contains("cleaned: true"));
}

#[test]
fn test_refetch_fills_sources_and_location() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "primary.yaml", PRIMARY_WITH_SOURCES);
    let merge = write(&dir, "refetch.yaml", REFETCH_WITH_LOCATION);
    let output = dir.path().join("out.yaml");

    let outcome = run_cleanup::<Hearing>(&options(&input, Some(&merge), &output)).unwrap();

    assert_eq!(outcome.updated_from_secondary, 1);
    assert_eq!(outcome.new_from_secondary, 1);
    assert_eq!(outcome.total, 3);

    let written: Vec<Hearing> = read_snapshot(&output).unwrap();
    let oversight = written
        .iter()
        .find(|h| h.title.as_deref() == Some("Oversight Hearing"))
        .unwrap();
    assert_eq!(oversight.sources.as_ref().map(Vec::len), Some(2));
    assert!(oversight.location.is_some());

    let raw = std::fs::read_to_string(&output).unwrap();
    assert!(raw.contains("refetch.yaml"));
    assert!(raw.contains("primary.yaml"));
}

#[test]
fn test_output_sorted_newest_first() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "primary.yaml", PRIMARY_WITH_SOURCES);
    let output = dir.path().join("out.yaml");

    run_cleanup::<Hearing>(&options(&input, None, &output)).unwrap();

    let written: Vec<Hearing> = read_snapshot(&output).unwrap();
    let dates: Vec<_> = written.iter().map(|h| h.date.clone().unwrap()).collect();
    assert_eq!(dates, vec!["2021-06-15", "2021-01-05"]);
}

#[test]
fn test_no_dedup_keeps_duplicates() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.yaml", BUDGET_HEARINGS);
    let output = dir.path().join("out.yaml");

    let mut opts = options(&input, None, &output);
    opts.dedupe = false;
    let outcome = run_cleanup::<Hearing>(&opts).unwrap();

    assert_eq!(outcome.duplicates, 0);
    assert_eq!(outcome.total, 2);
}

#[test]
fn test_malformed_merge_file_leaves_output_untouched() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.yaml", BUDGET_HEARINGS);
    let merge = write(&dir, "bad.yaml", "hearings: [unterminated");
    let output = write(&dir, "out.yaml", "previous contents");

    let result = run_cleanup::<Hearing>(&options(&input, Some(&merge), &output));

    assert!(matches!(result, Err(Error::MalformedInput(_))));
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "previous contents"
    );
}

#[test]
fn test_missing_collection_is_malformed() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "in.yaml", BUDGET_HEARINGS);
    let output = dir.path().join("out.yaml");

    // A hearings file has no `records` list
    let result = run_cleanup::<RecordIssue>(&options(&input, None, &output));

    assert!(matches!(result, Err(Error::MalformedInput(_))));
    assert!(!output.exists());
}

#[test]
fn test_report_lists_missing_fields() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "in.yaml",
        "hearings:\n  - title: Untimed\n    congress: 118\n  - date: \"2023-02-02\"\n    congress: 118\n",
    );
    let output = dir.path().join("out.yaml");

    let outcome = run_cleanup::<Hearing>(&options(&input, None, &output)).unwrap();

    assert_eq!(outcome.report.missing_count("date"), 1);
    assert_eq!(outcome.report.missing_count("title"), 1);
    let text = outcome.report.to_string();
    assert!(text.contains("Duplicates removed"));
    assert!(text.contains("Missing date: 1"));
}

#[test]
fn test_cleaned_snapshot_keeps_input_coverage() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "primary.yaml", PRIMARY_WITH_SOURCES);
    let merge = write(&dir, "refetch.yaml", REFETCH_WITH_LOCATION);
    let output = dir.path().join("out.yaml");

    run_cleanup::<Hearing>(&options(&input, Some(&merge), &output)).unwrap();

    let doc: serde_yaml::Value =
        serde_yaml::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let meta = &doc["metadata"];
    assert_eq!(meta["date_range"]["start"].as_str(), Some("2020-01-01"));
    assert_eq!(meta["date_range"]["end"].as_str(), Some("2022-12-31"));
    let congresses: Vec<u64> = meta["congresses"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(serde_yaml::Value::as_u64)
        .collect();
    assert_eq!(congresses, vec![116, 117]);
}

#[test]
fn test_refetch_only_duplicates_survive_without_dedup() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "primary.yaml", "hearings: []\n");
    let merge = write(
        &dir,
        "refetch.yaml",
        r#"
hearings:
  - title: Field Hearing
    date: "2022-05-05"
    congress: 117
    chamber: House
    status: Scheduled
    location: 2154 Rayburn House Office Building
  - title: Field Hearing
    date: "2022-05-05"
    congress: 117
    chamber: House
    status: Canceled
"#,
    );
    let output = dir.path().join("out.yaml");

    let mut opts = options(&input, Some(&merge), &output);
    opts.dedupe = false;
    let kept = run_cleanup::<Hearing>(&opts).unwrap();
    assert_eq!(kept.new_from_secondary, 2);
    assert_eq!(kept.total, 2);

    opts.dedupe = true;
    let collapsed = run_cleanup::<Hearing>(&opts).unwrap();
    assert_eq!(collapsed.total, 1);
    let written: Vec<Hearing> = read_snapshot(&output).unwrap();
    assert!(written[0].location.is_some());
}
