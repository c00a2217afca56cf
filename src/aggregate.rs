//! Aggregation engine
//!
//! Groups recorded trials by their nominal (distance, width) condition,
//! computes the effective target width of each group from the spread of hit
//! points, assigns every trial an effective index of difficulty and
//! throughput, and fits movement time against that index.
//!
//! The engine is a pure function of its input: running it twice on the same
//! data sets yields identical output.

use crate::difficulty::shannon_index_of_difficulty;
use crate::geometry::{distance, is_left, project, sign};
use crate::stats::{covariance, mean, variance};
use crate::types::{
    AggregateReport, AnnotatedRecord, DataSet, GroupStatus, GroupSummary, RawTrialRecord,
    Regression,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Groups smaller than this are too sparse for a variance estimate
pub const MIN_GROUP_SIZE: usize = 3;

/// Scale from standard deviation to effective width.
///
/// `4.133σ` covers 96% of a normal hit distribution.
pub const EFFECTIVE_WIDTH_FACTOR: f64 = 4.133;

/// Composite grouping key: nominal distance and width of a condition
#[derive(Debug, Clone, Copy)]
pub struct ConditionKey {
    pub distance: f64,
    pub width: f64,
}

impl ConditionKey {
    pub fn of(record: &RawTrialRecord) -> Self {
        Self {
            distance: record.distance,
            width: record.width,
        }
    }
}

impl PartialEq for ConditionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ConditionKey {}

impl PartialOrd for ConditionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ConditionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.width.total_cmp(&other.width))
    }
}

/// Run the full aggregation over every data set collected so far
pub fn aggregate(data_sets: &[DataSet]) -> AggregateReport {
    let mut records: Vec<AnnotatedRecord> = data_sets
        .iter()
        .flat_map(|set| set.records.iter())
        .map(annotate)
        .collect();

    let mut groups: BTreeMap<ConditionKey, Vec<usize>> = BTreeMap::new();
    for (index, annotated) in records.iter().enumerate() {
        groups
            .entry(ConditionKey::of(&annotated.record))
            .or_default()
            .push(index);
    }

    let summaries: Vec<GroupSummary> = groups
        .iter()
        .map(|(key, indices)| score_group(*key, indices, &mut records))
        .collect();

    let regression = fit_regression(&records);

    debug!(
        records = records.len(),
        groups = summaries.len(),
        has_regression = regression.is_some(),
        "aggregation complete"
    );

    AggregateReport {
        records,
        groups: summaries,
        regression,
    }
}

/// Derive the per-record geometry: real distance and projected hit offsets
pub fn annotate(record: &RawTrialRecord) -> AnnotatedRecord {
    let start = record.start.point();
    let hit = record.hit.point();
    let target = record.target.center();

    let projection = project(start, target, hit);

    // A zero-length axis has no longitudinal direction.
    let projected_hit_offset_x = match projection.t {
        Some(t) => distance(projection.point, target) * sign(t - 1.0),
        None => 0.0,
    };
    let projected_hit_offset_y = distance(projection.point, hit) * is_left(start, target, hit);

    AnnotatedRecord {
        record: record.clone(),
        real_distance: distance(start, hit),
        projected_hit_offset_x,
        projected_hit_offset_y,
        effective_index_of_difficulty: None,
        throughput: None,
    }
}

fn score_group(
    key: ConditionKey,
    indices: &[usize],
    records: &mut [AnnotatedRecord],
) -> GroupSummary {
    let members: Vec<&AnnotatedRecord> = indices.iter().map(|&i| &records[i]).collect();
    let mean_time = mean(&members, |r| r.record.time);

    let mut summary = GroupSummary {
        distance: key.distance,
        width: key.width,
        count: members.len(),
        status: GroupStatus::TooFewRecords,
        x_effective: None,
        y_effective: None,
        effective_width: None,
        effective_distance: None,
        mean_time,
        mean_effective_index_of_difficulty: None,
        mean_throughput: None,
    };

    if members.len() < MIN_GROUP_SIZE {
        debug!(
            distance = key.distance,
            width = key.width,
            count = members.len(),
            "group too small for effective width"
        );
        return summary;
    }

    let x_effective =
        EFFECTIVE_WIDTH_FACTOR * variance(&members, |r| r.projected_hit_offset_x).sqrt();
    let y_effective =
        EFFECTIVE_WIDTH_FACTOR * variance(&members, |r| r.projected_hit_offset_y).sqrt();
    let effective_distance = mean(&members, |r| r.real_distance);

    // Smaller-of model (MacKenzie & Buxton 1992): the tighter axis bounds precision.
    let effective_width = x_effective.min(y_effective);

    summary.x_effective = Some(x_effective);
    summary.y_effective = Some(y_effective);
    summary.effective_width = Some(effective_width);
    summary.effective_distance = effective_distance;

    let Some(effective_distance) = effective_distance else {
        return summary;
    };

    if !(effective_width.is_finite() && effective_width > 0.0) {
        warn!(
            distance = key.distance,
            width = key.width,
            x_effective,
            y_effective,
            "effective width collapsed, group excluded from throughput"
        );
        summary.status = GroupStatus::DegenerateWidth;
        return summary;
    }

    let ide = shannon_index_of_difficulty(effective_distance, effective_width);
    let mut throughputs = Vec::with_capacity(indices.len());
    for &index in indices {
        let annotated = &mut records[index];
        annotated.effective_index_of_difficulty = Some(ide);
        annotated.throughput = if annotated.record.time > 0.0 {
            Some(1000.0 * ide / annotated.record.time)
        } else {
            None
        };
        if let Some(tp) = annotated.throughput {
            throughputs.push(tp);
        }
    }

    summary.status = GroupStatus::Computed;
    summary.mean_effective_index_of_difficulty = Some(ide);
    summary.mean_throughput = mean(&throughputs, |v| *v);
    summary
}

/// Least-squares fit of `time` on effective index of difficulty over scored records
pub fn fit_regression(records: &[AnnotatedRecord]) -> Option<Regression> {
    let points: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| {
            r.effective_index_of_difficulty
                .map(|ide| (ide, r.record.time))
        })
        .collect();

    let mean_ide = mean(&points, |p| p.0)?;
    let mean_time = mean(&points, |p| p.1)?;

    let var_ide = variance(&points, |p| p.0);
    let slope = if var_ide > 0.0 {
        covariance(&points, |p| p.1, |p| p.0) / var_ide
    } else {
        0.0
    };

    Some(Regression {
        intercept: mean_time - slope * mean_ide,
        slope,
        samples: points.len(),
    })
}
