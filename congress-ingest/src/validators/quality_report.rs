//! Data quality report
//!
//! Summarizes a record set after cleanup or fetch: totals, coverage of each
//! category, per-congress and per-year tallies of the headline category, and
//! warnings for records missing identifying fields. Missing fields are never
//! errors; they only show up here.

use crate::types::Entity;
use std::collections::BTreeMap;
use std::fmt;

/// Bucket for records with no usable date
pub const UNKNOWN_YEAR: &str = "Unknown";

/// Count of records in a group and how many have the headline category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupTally {
    pub total: usize,
    pub with_headline: usize,
}

/// Human-readable quality summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityReport {
    pub collection: &'static str,
    pub total: usize,
    /// Processing counts (duplicates removed, merged from refetch, ...)
    pub processing: Vec<(String, usize)>,
    /// (category, records with it), in display order
    pub coverage: Vec<(&'static str, usize)>,
    pub headline: Option<&'static str>,
    pub by_congress: BTreeMap<u32, GroupTally>,
    pub by_year: BTreeMap<String, GroupTally>,
    /// Identifying field → records lacking it
    pub missing: BTreeMap<&'static str, usize>,
}

/// Percentage that is zero for an empty denominator
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

fn year_of(date: Option<&str>) -> String {
    date.map(str::trim)
        .and_then(|d| d.get(..4))
        .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_YEAR.to_string())
}

impl QualityReport {
    pub fn build<E: Entity>(records: &[E]) -> Self {
        let mut report = QualityReport {
            collection: E::COLLECTION,
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            let coverage = record.coverage();
            if report.coverage.is_empty() {
                report.coverage = coverage.iter().map(|(name, _)| (*name, 0)).collect();
                report.headline = coverage.first().map(|(name, _)| *name);
            }
            for (slot, (_, present)) in report.coverage.iter_mut().zip(coverage.iter()) {
                if *present {
                    slot.1 += 1;
                }
            }

            let has_headline = coverage.first().map_or(false, |(_, p)| *p);
            let headline_count = usize::from(has_headline);

            let congress = report
                .by_congress
                .entry(record.congress().unwrap_or(0))
                .or_default();
            congress.total += 1;
            congress.with_headline += headline_count;

            let year = report.by_year.entry(year_of(record.date())).or_default();
            year.total += 1;
            year.with_headline += headline_count;

            for field in record.missing_required() {
                *report.missing.entry(field).or_insert(0) += 1;
            }
        }

        report
    }

    /// Add a processing count line
    pub fn with_count(mut self, label: impl Into<String>, count: usize) -> Self {
        self.processing.push((label.into(), count));
        self
    }

    pub fn missing_count(&self, field: &str) -> usize {
        self.missing.get(field).copied().unwrap_or(0)
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "{}", rule)?;
        writeln!(f, "Data Quality Report")?;
        writeln!(f, "{}", rule)?;
        writeln!(f)?;
        writeln!(f, "Total {}: {}", self.collection, self.total)?;

        if !self.processing.is_empty() {
            writeln!(f)?;
            writeln!(f, "Processing:")?;
            for (label, count) in &self.processing {
                writeln!(f, "  {:<26} {:>6}", format!("{}:", label), count)?;
            }
        }

        if !self.coverage.is_empty() {
            writeln!(f)?;
            writeln!(f, "Field Coverage:")?;
            for (name, count) in &self.coverage {
                writeln!(
                    f,
                    "  {:<26} {:>6} ({:.1}%)",
                    format!("With {}:", name),
                    count,
                    percent(*count, self.total)
                )?;
            }
        }

        let headline = self.headline.unwrap_or("data");

        if !self.by_congress.is_empty() {
            writeln!(f)?;
            writeln!(f, "By Congress:")?;
            for (congress, tally) in &self.by_congress {
                writeln!(
                    f,
                    "  {}th: {:>5} {}, {:>5} with {} ({:.0}%)",
                    congress,
                    tally.total,
                    self.collection,
                    tally.with_headline,
                    headline,
                    percent(tally.with_headline, tally.total)
                )?;
            }
        }

        if !self.by_year.is_empty() {
            writeln!(f)?;
            writeln!(f, "By Year:")?;
            for (year, tally) in &self.by_year {
                writeln!(
                    f,
                    "  {}: {:>5} {}, {:>5} with {} ({:.0}%)",
                    year,
                    tally.total,
                    self.collection,
                    tally.with_headline,
                    headline,
                    percent(tally.with_headline, tally.total)
                )?;
            }
        }

        if !self.missing.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings:")?;
            for (field, count) in &self.missing {
                writeln!(f, "  Missing {}: {}", field, count)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Hearing, Person};

    fn hearing(date: Option<&str>, congress: u32, witnesses: bool) -> Hearing {
        Hearing {
            title: Some("T".to_string()),
            date: date.map(str::to_string),
            congress: Some(congress),
            witnesses: witnesses.then(|| vec![Person::named("W")]),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_report_has_no_division_by_zero() {
        let report = QualityReport::build::<Hearing>(&[]);
        assert_eq!(report.total, 0);
        assert_eq!(percent(0, 0), 0.0);
        let text = report.to_string();
        assert!(text.contains("Total hearings: 0"));
    }

    #[test]
    fn test_tallies_by_congress_and_year() {
        let records = vec![
            hearing(Some("2021-05-01"), 117, true),
            hearing(Some("2022-03-01"), 117, false),
            hearing(None, 118, true),
        ];

        let report = QualityReport::build(&records);

        assert_eq!(report.headline, Some("witnesses"));
        assert_eq!(report.coverage[0], ("witnesses", 2));
        assert_eq!(
            report.by_congress[&117],
            GroupTally {
                total: 2,
                with_headline: 1
            }
        );
        assert_eq!(report.by_year[UNKNOWN_YEAR].total, 1);
        assert_eq!(report.by_year["2021"].with_headline, 1);
        assert_eq!(report.missing_count("date"), 1);
        assert_eq!(report.missing_count("title"), 0);
    }

    #[test]
    fn test_display_includes_warnings_and_processing() {
        let report = QualityReport::build(&[hearing(None, 117, false)])
            .with_count("Duplicates removed", 3);
        let text = report.to_string();

        assert!(text.contains("Duplicates removed:"));
        assert!(text.contains("Missing date: 1"));
        assert!(text.contains("117th:"));
    }
}
