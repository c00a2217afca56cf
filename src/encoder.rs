//! Throughput report encoder
//!
//! Encodes an aggregation pass into a self-describing report payload, as a
//! JSON document or as one NDJSON row per annotated trial.

use crate::error::FittsError;
use crate::types::{
    AggregateReport, DataSet, GroupStatus, ReportFlag, ReportProducer, ReportRow, ReportSummary,
    ThroughputReport,
};
use crate::{CRATE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Report encoder
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build the report payload for an aggregation over `data_sets`
    pub fn encode(&self, report: &AggregateReport, data_sets: &[DataSet]) -> ThroughputReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: CRATE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let summary = ReportSummary {
            data_sets: data_sets.len(),
            total_records: report.records.len(),
            scored_records: report.scored_records().count(),
            total_misses: data_sets.iter().map(|set| set.misses).sum(),
            mean_throughput: report.mean_throughput(),
        };

        ThroughputReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            computed_at_utc: Utc::now().to_rfc3339(),
            summary,
            regression: report.regression,
            groups: report.groups.clone(),
            records: report.records.iter().map(ReportRow::from).collect(),
            flags: build_flags(report),
        }
    }

    /// Encode to a pretty JSON string
    pub fn encode_to_json(
        &self,
        report: &AggregateReport,
        data_sets: &[DataSet],
    ) -> Result<String, FittsError> {
        let payload = self.encode(report, data_sets);
        serde_json::to_string_pretty(&payload).map_err(FittsError::JsonError)
    }

    /// Encode the annotated trials as newline-delimited JSON rows
    pub fn encode_rows(&self, report: &AggregateReport) -> Result<String, FittsError> {
        if report.records.is_empty() {
            return Ok(String::new());
        }

        let mut lines = Vec::with_capacity(report.records.len());
        for annotated in &report.records {
            let row = ReportRow::from(annotated);
            let line = serde_json::to_string(&row)
                .map_err(|e| FittsError::EncodingError(e.to_string()))?;
            lines.push(line);
        }
        Ok(lines.join("\n") + "\n")
    }
}

fn build_flags(report: &AggregateReport) -> Vec<ReportFlag> {
    let mut flags = Vec::new();

    if report.records.is_empty() {
        flags.push(ReportFlag::NoRecords);
    }
    if report
        .groups
        .iter()
        .any(|g| g.status == GroupStatus::TooFewRecords)
    {
        flags.push(ReportFlag::SmallGroups);
    }
    if report
        .groups
        .iter()
        .any(|g| g.status == GroupStatus::DegenerateWidth)
    {
        flags.push(ReportFlag::DegenerateWidth);
    }
    if report.regression.is_none() {
        flags.push(ReportFlag::NoRegression);
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::geometry::TimedPoint;
    use crate::types::{RawTrialRecord, Target};

    fn make_data_sets() -> Vec<DataSet> {
        let hits = [(249.0, 2.0, 610.0), (252.0, -3.0, 680.0), (247.0, 1.0, 655.0)];
        let records = hits
            .iter()
            .map(|&(x, y, time)| RawTrialRecord {
                time,
                distance: 250.0,
                width: 30.0,
                start: TimedPoint::new(0.0, 0.0, 0.0),
                target: Target {
                    x: 250.0,
                    y: 0.0,
                    w: 30.0,
                    distance: 250.0,
                },
                hit: TimedPoint::new(x, y, time),
                path: vec![],
            })
            .collect();

        vec![DataSet {
            colour: "#1f77b4".to_string(),
            misses: 2,
            records,
        }]
    }

    #[test]
    fn test_encode_payload() {
        let data_sets = make_data_sets();
        let report = aggregate(&data_sets);
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());

        let payload = encoder.encode(&report, &data_sets);

        assert_eq!(payload.report_version, REPORT_VERSION);
        assert_eq!(payload.producer.name, PRODUCER_NAME);
        assert_eq!(payload.producer.instance_id, "test-instance");
        assert_eq!(payload.summary.total_records, 3);
        assert_eq!(payload.summary.scored_records, 3);
        assert_eq!(payload.summary.total_misses, 2);
        assert!(payload.summary.mean_throughput.unwrap() > 0.0);
        assert!(payload.regression.is_some());
        assert!(payload.flags.is_empty());
        assert_eq!(payload.records[0].hit_x, 249.0);
        assert_eq!(payload.records[0].start_y, 0.0);
    }

    #[test]
    fn test_encode_to_json() {
        let data_sets = make_data_sets();
        let report = aggregate(&data_sets);
        let json = ReportEncoder::new().encode_to_json(&report, &data_sets).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["report_version"], "1.0.0");
        assert_eq!(value["groups"][0]["status"], "computed");
        assert!(value["regression"]["slope"].is_number());
        assert!(value["producer"]["instance_id"].is_string());
    }

    #[test]
    fn test_encode_rows() {
        let data_sets = make_data_sets();
        let report = aggregate(&data_sets);
        let ndjson = ReportEncoder::new().encode_rows(&report).unwrap();

        let rows: Vec<ReportRow> = ndjson
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].time, 680.0);
        assert!(rows.iter().all(|r| r.throughput.is_some()));
    }

    #[test]
    fn test_encode_rows_empty_report() {
        let ndjson = ReportEncoder::new()
            .encode_rows(&AggregateReport::default())
            .unwrap();
        assert_eq!(ndjson, "");
    }

    #[test]
    fn test_flags_for_empty_report() {
        let payload = ReportEncoder::new().encode(&AggregateReport::default(), &[]);
        assert_eq!(
            payload.flags,
            vec![ReportFlag::NoRecords, ReportFlag::NoRegression]
        );
        assert!(payload.summary.mean_throughput.is_none());

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("regression").is_none());
    }

    #[test]
    fn test_flags_for_small_group() {
        let mut data_sets = make_data_sets();
        data_sets[0].records.truncate(2);
        let report = aggregate(&data_sets);

        let payload = ReportEncoder::new().encode(&report, &data_sets);
        assert!(payload.flags.contains(&ReportFlag::SmallGroups));
        assert!(payload.flags.contains(&ReportFlag::NoRegression));
    }
}
