//! Experiment data types
//!
//! This module defines the records that flow from the session into the
//! aggregation engine, and the annotated output the engine produces.

use crate::geometry::{Point, TimedPoint};
use serde::{Deserialize, Serialize};

/// A circular target on the ring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: f64,
    pub y: f64,
    /// Diameter in pixels
    pub w: f64,
    /// Nominal movement distance of the condition the target was laid out for
    pub distance: f64,
}

impl Target {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn radius(&self) -> f64 {
        self.w / 2.0
    }
}

/// One successful target acquisition
///
/// Created by the session on a hit and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTrialRecord {
    /// Movement time in milliseconds (hit time minus start time)
    pub time: f64,
    /// Nominal distance of the condition
    pub distance: f64,
    /// Nominal target width of the condition
    pub width: f64,
    /// Where the movement started (the previous hit)
    pub start: TimedPoint,
    /// The target that was acquired
    pub target: Target,
    /// Click position
    pub hit: TimedPoint,
    /// Pointer samples between start and hit
    #[serde(default)]
    pub path: Vec<TimedPoint>,
}

/// Records collected during one condition block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    /// Display colour tag for plotting
    pub colour: String,
    /// Misses registered during the block
    #[serde(default)]
    pub misses: u32,
    pub records: Vec<RawTrialRecord>,
}

/// Outcome of the effective-width computation for a condition group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    /// Effective width and throughput were computed
    Computed,
    /// Fewer than the minimum number of records for a variance estimate
    TooFewRecords,
    /// The smaller-of effective width collapsed to zero (or is not finite)
    DegenerateWidth,
}

/// A raw record with the fields derived during aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub record: RawTrialRecord,
    /// Actual start-to-hit distance
    pub real_distance: f64,
    /// Signed longitudinal error of the hit relative to the target center
    pub projected_hit_offset_x: f64,
    /// Signed lateral error of the hit relative to the movement axis
    pub projected_hit_offset_y: f64,
    /// Effective index of difficulty in bits, when the group supports one
    pub effective_index_of_difficulty: Option<f64>,
    /// Throughput in bits per second, when the group supports one
    pub throughput: Option<f64>,
}

/// Per-condition aggregation summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub distance: f64,
    pub width: f64,
    pub count: usize,
    pub status: GroupStatus,
    pub x_effective: Option<f64>,
    pub y_effective: Option<f64>,
    pub effective_width: Option<f64>,
    pub effective_distance: Option<f64>,
    pub mean_time: Option<f64>,
    pub mean_effective_index_of_difficulty: Option<f64>,
    pub mean_throughput: Option<f64>,
}

/// Linear fit of movement time on effective index of difficulty: `time = intercept + slope * IDe`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    /// Intercept in milliseconds
    pub intercept: f64,
    /// Slope in milliseconds per bit
    pub slope: f64,
    /// Number of records the fit was computed from
    pub samples: usize,
}

/// Output of one aggregation pass
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Every input record, annotated, in input order
    pub records: Vec<AnnotatedRecord>,
    /// One summary per (distance, width) condition, ordered by key
    pub groups: Vec<GroupSummary>,
    /// `None` when no group produced an effective index of difficulty
    pub regression: Option<Regression>,
}

impl AggregateReport {
    /// Records that contribute to the regression
    pub fn scored_records(&self) -> impl Iterator<Item = &AnnotatedRecord> {
        self.records
            .iter()
            .filter(|r| r.effective_index_of_difficulty.is_some())
    }

    /// Mean throughput over all scored records
    pub fn mean_throughput(&self) -> Option<f64> {
        let values: Vec<f64> = self.scored_records().filter_map(|r| r.throughput).collect();
        crate::stats::mean(&values, |v| *v)
    }
}

// ============================================================================
// Report payload types
// ============================================================================

/// Producer metadata embedded in every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Quality flags raised while building a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFlag {
    /// No trial was recorded at all
    NoRecords,
    /// At least one condition had too few records to score
    SmallGroups,
    /// At least one condition collapsed to a zero effective width
    DegenerateWidth,
    /// No regression could be fitted
    NoRegression,
}

/// Counts and headline numbers of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub data_sets: usize,
    pub total_records: usize,
    pub scored_records: usize,
    pub total_misses: u32,
    /// Mean throughput in bits per second
    pub mean_throughput: Option<f64>,
}

/// One annotated trial, flattened for tabular export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub distance: f64,
    pub width: f64,
    pub time: f64,
    pub real_distance: f64,
    pub effective_index_of_difficulty: Option<f64>,
    pub throughput: Option<f64>,
    pub hit_x: f64,
    pub hit_y: f64,
    pub start_x: f64,
    pub start_y: f64,
}

impl From<&AnnotatedRecord> for ReportRow {
    fn from(annotated: &AnnotatedRecord) -> Self {
        let record = &annotated.record;
        Self {
            distance: record.distance,
            width: record.width,
            time: record.time,
            real_distance: annotated.real_distance,
            effective_index_of_difficulty: annotated.effective_index_of_difficulty,
            throughput: annotated.throughput,
            hit_x: record.hit.x,
            hit_y: record.hit.y,
            start_x: record.start.x,
            start_y: record.start.y,
        }
    }
}

/// Complete throughput report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputReport {
    pub report_version: String,
    pub producer: ReportProducer,
    /// When the report was computed (RFC3339)
    pub computed_at_utc: String,
    pub summary: ReportSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regression: Option<Regression>,
    pub groups: Vec<GroupSummary>,
    pub records: Vec<ReportRow>,
    pub flags: Vec<ReportFlag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_status_serialization() {
        let json = serde_json::to_string(&GroupStatus::DegenerateWidth).unwrap();
        assert_eq!(json, "\"degenerate_width\"");

        let parsed: GroupStatus = serde_json::from_str("\"too_few_records\"").unwrap();
        assert_eq!(parsed, GroupStatus::TooFewRecords);
    }

    #[test]
    fn test_data_set_deserialization_without_path() {
        let json = r##"{
            "colour": "#1f77b4",
            "records": [{
                "time": 640.0,
                "distance": 250.0,
                "width": 30.0,
                "start": { "x": 435.0, "y": 200.0, "t": 1000.0 },
                "target": { "x": 185.0, "y": 200.0, "w": 30.0, "distance": 250.0 },
                "hit": { "x": 187.0, "y": 203.0, "t": 1640.0 }
            }]
        }"##;

        let data_set: DataSet = serde_json::from_str(json).unwrap();
        assert_eq!(data_set.misses, 0);
        assert_eq!(data_set.records.len(), 1);
        assert!(data_set.records[0].path.is_empty());
        assert_eq!(data_set.records[0].target.radius(), 15.0);
    }

    #[test]
    fn test_empty_report_has_no_throughput() {
        let report = AggregateReport::default();
        assert_eq!(report.scored_records().count(), 0);
        assert_eq!(report.mean_throughput(), None);
    }
}
