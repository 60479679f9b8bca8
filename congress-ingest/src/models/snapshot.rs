//! Snapshot metadata and fetch partition markers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a snapshot covers every planned partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    InProgress,
    Complete,
}

/// Inclusive date window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Metadata block written at the top of every snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub congresses: Vec<u32>,
    /// Partitions covered so far
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<String>,
    pub total: usize,
    pub status: SnapshotStatus,
    /// `fast` or `full`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cleaned: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_files: Vec<String>,
    /// Dataset-specific totals (article types, per-chamber counts)
    #[serde(flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

/// Congress.gov chamber path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiChamber {
    House,
    Senate,
}

impl ApiChamber {
    pub const ALL: [ApiChamber; 2] = [ApiChamber::House, ApiChamber::Senate];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiChamber::House => "house",
            ApiChamber::Senate => "senate",
        }
    }

    /// Display form used in record fields (`House`, `Senate`)
    pub fn title(&self) -> &'static str {
        match self {
            ApiChamber::House => "House",
            ApiChamber::Senate => "Senate",
        }
    }
}

impl fmt::Display for ApiChamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One congress in one chamber (hearings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChamberPartition {
    pub congress: u32,
    pub chamber: ApiChamber,
}

impl fmt::Display for ChamberPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.congress, self.chamber)
    }
}

/// One chamber's votes for a congress, optionally narrowed to one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VotePartition {
    pub chamber: ApiChamber,
    pub congress: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<u32>,
}

impl fmt::Display for VotePartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.session {
            Some(s) => write!(f, "{}-{}-{}", self.chamber, self.congress, s),
            None => write!(f, "{}-{}", self.chamber, self.congress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SnapshotStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&SnapshotStatus::Complete).unwrap(),
            "\"complete\""
        );
    }

    #[test]
    fn test_partition_display() {
        let p = ChamberPartition {
            congress: 118,
            chamber: ApiChamber::Senate,
        };
        assert_eq!(p.to_string(), "118-senate");

        let v = VotePartition {
            chamber: ApiChamber::Senate,
            congress: 118,
            session: Some(2),
        };
        assert_eq!(v.to_string(), "senate-118-2");
    }

    #[test]
    fn test_partition_json_round_trip_for_checkpoints() {
        let p = ChamberPartition {
            congress: 117,
            chamber: ApiChamber::House,
        };
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"congress":117,"chamber":"house"}"#);
        let back: ChamberPartition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
