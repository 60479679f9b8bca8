//! Record validation
//!
//! - **completeness_scorer** - presence rules and completeness scores
//! - **quality_report** - coverage and missing-field report

pub mod completeness_scorer;
pub mod quality_report;

pub use completeness_scorer::{FieldCounter, Presence};
pub use quality_report::QualityReport;
