//! Snapshot cleanup and merge
//!
//! Re-loads a snapshot (and optionally a refetch snapshot), merges the
//! refetch in, deduplicates, and writes a `complete` snapshot marked
//! `cleaned`. The inputs' date range and congresses carry over to the
//! output. Every input is read before anything is written, so malformed
//! input never touches an existing output file.

use crate::services::{dedupe, merge_snapshots};
use crate::storage::{
    read_snapshot_with_coverage, SnapshotContext, SnapshotCoverage, SnapshotWriter,
};
use crate::types::Entity;
use crate::validators::QualityReport;
use congress_common::Result;
use std::path::PathBuf;
use tracing::info;

/// Cleanup run parameters
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    pub input: PathBuf,
    /// Refetch snapshot whose records take priority on matching keys
    pub merge: Option<PathBuf>,
    pub output: PathBuf,
    pub dedupe: bool,
}

/// Counts and quality summary of a cleanup run
#[derive(Debug, Clone)]
pub struct CleanupOutcome {
    pub loaded_primary: usize,
    pub loaded_secondary: usize,
    pub updated_from_secondary: usize,
    pub new_from_secondary: usize,
    pub duplicates: usize,
    pub total: usize,
    pub report: QualityReport,
}

/// Run cleanup for one dataset
pub fn run_cleanup<E: Entity>(options: &CleanupOptions) -> Result<CleanupOutcome> {
    info!(input = %options.input.display(), "Loading snapshot");
    let (primary, mut coverage) = read_snapshot_with_coverage::<E>(&options.input)?;
    let loaded_primary = primary.len();

    let secondary: Option<Vec<E>> = match &options.merge {
        Some(path) => {
            info!(merge = %path.display(), "Loading refetch snapshot");
            let (records, refetch_coverage) = read_snapshot_with_coverage::<E>(path)?;
            coverage = coverage.union(refetch_coverage);
            Some(records)
        }
        None => None,
    };
    let loaded_secondary = secondary.as_ref().map_or(0, Vec::len);

    let mut updated_from_secondary = 0;
    let mut new_from_secondary = 0;
    let mut records = match secondary {
        Some(secondary) => {
            let merged = merge_snapshots(primary, secondary);
            updated_from_secondary = merged.updated_from_secondary;
            new_from_secondary = merged.new_from_secondary;
            info!(
                primary = loaded_primary,
                secondary = loaded_secondary,
                updated = updated_from_secondary,
                new = new_from_secondary,
                "Merged refetch"
            );
            merged.records
        }
        None => primary,
    };

    let mut duplicates = 0;
    if options.dedupe {
        let before = records.len();
        let outcome = dedupe(records);
        duplicates = outcome.duplicates;
        records = outcome.records;
        info!(before, after = records.len(), duplicates, "Deduplicated");
    }

    let mut source_files = vec![options.input.display().to_string()];
    if let Some(path) = &options.merge {
        source_files.push(path.display().to_string());
    }

    let SnapshotCoverage {
        date_range,
        congresses,
        source,
    } = coverage;
    let writer = SnapshotWriter::new(
        options.output.clone(),
        SnapshotContext {
            date_range,
            congresses,
            source,
            cleaned: true,
            source_files,
            ..Default::default()
        },
    );
    writer.write(&records, &[], true)?;
    info!(output = %options.output.display(), total = records.len(), "Cleaned snapshot written");

    let mut report = QualityReport::build(&records).with_count("Loaded from input", loaded_primary);
    if options.merge.is_some() {
        report = report
            .with_count("Loaded from merge file", loaded_secondary)
            .with_count("Updated from merge file", updated_from_secondary)
            .with_count("New from merge file", new_from_secondary);
    }
    if options.dedupe {
        report = report.with_count("Duplicates removed", duplicates);
    }

    Ok(CleanupOutcome {
        loaded_primary,
        loaded_secondary,
        updated_from_secondary,
        new_from_secondary,
        duplicates,
        total: records.len(),
        report,
    })
}
