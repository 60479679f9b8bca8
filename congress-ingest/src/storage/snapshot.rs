//! Snapshot reading and incremental writing
//!
//! A snapshot is a YAML document with a `metadata` block followed by the
//! dataset's record list (`hearings`, `records`, `votes`). Every write
//! replaces the file wholesale through a temp file, so a reader never sees
//! a truncated snapshot even while a long fetch rewrites it repeatedly.

use crate::models::{DateRange, SnapshotMetadata, SnapshotStatus};
use crate::types::Entity;
use chrono::NaiveDate;
use congress_common::time::parse_iso_date;
use congress_common::{fs::write_atomic, Error, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fixed metadata describing where a snapshot's records came from
#[derive(Debug, Clone, Default)]
pub struct SnapshotContext {
    pub date_range: Option<DateRange>,
    pub congresses: Vec<u32>,
    /// `fast` or `full`
    pub mode: Option<String>,
    pub source: Option<String>,
    /// Set by the cleanup tool
    pub cleaned: bool,
    pub source_files: Vec<String>,
}

/// Writes full snapshots to one destination
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
    context: SnapshotContext,
}

struct SnapshotDoc<'a, E> {
    metadata: SnapshotMetadata,
    records: Vec<&'a E>,
}

impl<E: Entity> Serialize for SnapshotDoc<'_, E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("metadata", &self.metadata)?;
        map.serialize_entry(E::COLLECTION, &self.records)?;
        map.end()
    }
}

/// Order records newest first.
///
/// Records with a missing or unparseable date sort last; the sort is stable
/// so equal dates keep their input order.
pub fn sort_by_date_desc<E: Entity>(records: &[E]) -> Vec<&E> {
    let mut sorted: Vec<&E> = records.iter().collect();
    sorted.sort_by_key(|r| Reverse(sort_date(*r)));
    sorted
}

fn sort_date<E: Entity>(record: &E) -> Option<NaiveDate> {
    record.date().and_then(parse_iso_date)
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>, context: SnapshotContext) -> Self {
        Self {
            path: path.into(),
            context,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sort, annotate and atomically replace the snapshot
    pub fn write<E: Entity>(
        &self,
        records: &[E],
        partitions: &[String],
        complete: bool,
    ) -> Result<()> {
        let status = if complete {
            SnapshotStatus::Complete
        } else {
            SnapshotStatus::InProgress
        };

        let metadata = SnapshotMetadata {
            generated_at: congress_common::time::now(),
            date_range: self.context.date_range.clone(),
            congresses: self.context.congresses.clone(),
            partitions: partitions.to_vec(),
            total: records.len(),
            status,
            mode: self.context.mode.clone(),
            source: self.context.source.clone(),
            cleaned: self.context.cleaned,
            source_files: self.context.source_files.clone(),
            extras: E::metadata_extras(records),
        };

        let doc = SnapshotDoc {
            metadata,
            records: sort_by_date_desc(records),
        };
        let yaml = serde_yaml::to_string(&doc)?;
        write_atomic(&self.path, yaml.as_bytes())?;

        debug!(
            path = %self.path.display(),
            records = records.len(),
            status = ?status,
            "Snapshot written"
        );
        Ok(())
    }
}

/// Coverage fields carried over from an input snapshot's metadata
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SnapshotCoverage {
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub congresses: Vec<u32>,
    #[serde(default)]
    pub source: Option<String>,
}

impl SnapshotCoverage {
    /// Union of two snapshots' coverage: the widest date window and every
    /// congress of either. `self`'s source wins when both name one.
    pub fn union(self, other: SnapshotCoverage) -> Self {
        let date_range = match (self.date_range, other.date_range) {
            (Some(a), Some(b)) => Some(DateRange {
                start: a.start.min(b.start),
                end: a.end.max(b.end),
            }),
            (a, b) => a.or(b),
        };

        let mut congresses = self.congresses;
        congresses.extend(other.congresses);
        congresses.sort_unstable();
        congresses.dedup();

        Self {
            date_range,
            congresses,
            source: self.source.or(other.source),
        }
    }
}

/// Read a snapshot's record list.
///
/// Missing files, unparseable YAML and a missing or non-list collection
/// field are all malformed input. Metadata and unknown record fields are
/// ignored.
pub fn read_snapshot<E: Entity>(path: &Path) -> Result<Vec<E>> {
    read_snapshot_with_coverage(path).map(|(records, _)| records)
}

/// Like [`read_snapshot`], also returning the metadata's coverage fields.
///
/// An absent or unreadable metadata block yields empty coverage.
pub fn read_snapshot_with_coverage<E: Entity>(
    path: &Path,
) -> Result<(Vec<E>, SnapshotCoverage)> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::MalformedInput(format!("Cannot read {}: {}", path.display(), e))
    })?;

    let doc: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| {
        Error::MalformedInput(format!("Invalid YAML in {}: {}", path.display(), e))
    })?;

    let list = doc
        .get(E::COLLECTION)
        .filter(|v| v.is_sequence())
        .ok_or_else(|| {
            Error::MalformedInput(format!(
                "{} has no '{}' list",
                path.display(),
                E::COLLECTION
            ))
        })?;

    let records: Vec<E> = serde_yaml::from_value(list.clone()).map_err(|e| {
        Error::MalformedInput(format!(
            "Invalid {} entry in {}: {}",
            E::LABEL,
            path.display(),
            e
        ))
    })?;

    let coverage: SnapshotCoverage = doc
        .get("metadata")
        .and_then(|meta| serde_yaml::from_value(meta.clone()).ok())
        .unwrap_or_default();

    Ok((records, coverage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Hearing;
    use tempfile::TempDir;

    fn dated(title: &str, date: Option<&str>) -> Hearing {
        Hearing {
            title: Some(title.to_string()),
            date: date.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_sort_newest_first_missing_last() {
        let records = vec![
            dated("old", Some("2020-02-01")),
            dated("none", None),
            dated("new", Some("2024-06-30")),
            dated("junk", Some("TBD")),
            dated("mid", Some("2022-03-01T10:00:00Z")),
        ];

        let titles: Vec<_> = sort_by_date_desc(&records)
            .into_iter()
            .map(|h| h.title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, vec!["new", "mid", "old", "none", "junk"]);
    }

    #[test]
    fn test_write_then_read_round_trips_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.yaml");
        let writer = SnapshotWriter::new(&path, SnapshotContext::default());

        let records = vec![dated("a", Some("2021-01-01")), dated("b", Some("2023-01-01"))];
        writer.write(&records, &["117-house".to_string()], false).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("status: in_progress"));
        assert!(text.contains("hearings:"));

        let back: Vec<Hearing> = read_snapshot(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].title.as_deref(), Some("b"));
    }

    #[test]
    fn test_complete_status_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.yaml");
        let writer = SnapshotWriter::new(&path, SnapshotContext::default());

        writer.write::<Hearing>(&[], &[], true).unwrap();

        let doc: serde_yaml::Value =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["metadata"]["status"].as_str(), Some("complete"));
        assert_eq!(doc["metadata"]["total"].as_u64(), Some(0));
    }

    #[test]
    fn test_missing_collection_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.yaml");
        std::fs::write(&path, "metadata:\n  status: complete\nvotes: []\n").unwrap();

        let result: Result<Vec<Hearing>> = read_snapshot(&path);
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_missing_file_is_malformed() {
        let dir = TempDir::new().unwrap();
        let result: Result<Vec<Hearing>> = read_snapshot(&dir.path().join("nope.yaml"));
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.yaml");
        std::fs::write(
            &path,
            "hearings:\n- title: X\n  date: '2022-01-01'\n  mystery_field: 3\n",
        )
        .unwrap();

        let records: Vec<Hearing> = read_snapshot(&path).unwrap();
        assert_eq!(records[0].title.as_deref(), Some("X"));
    }

    #[test]
    fn test_coverage_read_from_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.yaml");
        std::fs::write(
            &path,
            "metadata:\n  date_range:\n    start: '2020-01-01'\n    end: '2022-12-31'\n  congresses: [116, 117]\nhearings: []\n",
        )
        .unwrap();

        let (records, coverage): (Vec<Hearing>, _) = read_snapshot_with_coverage(&path).unwrap();
        assert!(records.is_empty());
        assert_eq!(coverage.congresses, vec![116, 117]);
        assert_eq!(
            coverage.date_range.map(|r| r.end),
            Some("2022-12-31".to_string())
        );
    }

    #[test]
    fn test_coverage_union_widens_window() {
        let a = SnapshotCoverage {
            date_range: Some(DateRange {
                start: "2021-01-01".to_string(),
                end: "2022-12-31".to_string(),
            }),
            congresses: vec![117],
            source: None,
        };
        let b = SnapshotCoverage {
            date_range: Some(DateRange {
                start: "2020-01-01".to_string(),
                end: "2021-06-30".to_string(),
            }),
            congresses: vec![116, 117],
            source: Some("Congress.gov API".to_string()),
        };

        let merged = a.union(b);
        let range = merged.date_range.unwrap();
        assert_eq!((range.start.as_str(), range.end.as_str()), ("2020-01-01", "2022-12-31"));
        assert_eq!(merged.congresses, vec![116, 117]);
        assert_eq!(merged.source.as_deref(), Some("Congress.gov API"));
    }
}
