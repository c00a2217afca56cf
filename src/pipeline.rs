//! Replay pipeline orchestration
//!
//! This module provides the public API for turning a recorded pointer log
//! into a throughput report. The log is fed through a [`FittsSession`]
//! exactly as a live presentation layer would feed it.
//!
//! Pipeline: Pointer log → Session → Data sets → Aggregation → Report JSON

use crate::config::ExperimentConfig;
use crate::encoder::ReportEncoder;
use crate::error::FittsError;
use crate::geometry::Point;
use crate::session::{FittsSession, SessionEvent, SessionState};
use crate::types::{AggregateReport, DataSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One entry of a recorded pointer log
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Move { x: f64, y: f64, t: f64 },
    Click { x: f64, y: f64, t: f64 },
}

impl PointerEvent {
    pub fn timestamp(&self) -> f64 {
        match *self {
            PointerEvent::Move { t, .. } | PointerEvent::Click { t, .. } => t,
        }
    }

    pub fn point(&self) -> Point {
        match *self {
            PointerEvent::Move { x, y, .. } | PointerEvent::Click { x, y, .. } => Point::new(x, y),
        }
    }

    /// Reject coordinates or timestamps that are not finite
    pub fn validate(&self) -> Result<(), FittsError> {
        let point = self.point();
        let t = self.timestamp();
        if point.x.is_finite() && point.y.is_finite() && t.is_finite() {
            Ok(())
        } else {
            Err(FittsError::InvalidEvent(format!(
                "non-finite value in {:?}",
                self
            )))
        }
    }
}

/// Parse a newline-delimited pointer log (blank lines are skipped)
pub fn parse_ndjson(input: &str) -> Result<Vec<PointerEvent>, FittsError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line.trim()).map_err(|e| {
                FittsError::ParseError(format!("line {}: {}", index + 1, e))
            })
        })
        .collect()
}

/// Parse a pointer log given as a JSON array
pub fn parse_array(input: &str) -> Result<Vec<PointerEvent>, FittsError> {
    serde_json::from_str(input)
        .map_err(|e| FittsError::ParseError(format!("Failed to parse pointer log: {}", e)))
}

/// Parse a list of recorded data sets
pub fn parse_data_sets(input: &str) -> Result<Vec<DataSet>, FittsError> {
    serde_json::from_str(input)
        .map_err(|e| FittsError::ParseError(format!("Failed to parse data sets: {}", e)))
}

/// Replay a pointer log and return the report JSON (stateless, one-shot).
///
/// # Arguments
/// * `events` - Pointer log in time order
/// * `config` - Experiment configuration the log was recorded with
///
/// # Example
/// ```ignore
/// let events = parse_ndjson(&log)?;
/// let report_json = replay_to_report(&events, ExperimentConfig::default())?;
/// ```
pub fn replay_to_report(
    events: &[PointerEvent],
    config: ExperimentConfig,
) -> Result<String, FittsError> {
    let mut processor = FittsProcessor::new(config)?;
    processor.process_log(events)?;
    processor.encode_report()
}

/// Stateful processor that drives a session from pointer events.
///
/// Use this when events arrive incrementally or when the intermediate
/// session events are of interest.
pub struct FittsProcessor {
    session: FittsSession,
    encoder: ReportEncoder,
    last_idle_report: Option<AggregateReport>,
}

impl FittsProcessor {
    /// Create a processor and start its session
    pub fn new(config: ExperimentConfig) -> Result<Self, FittsError> {
        let mut session = FittsSession::new(config)?;
        session.start_session();
        Ok(Self {
            session,
            encoder: ReportEncoder::new(),
            last_idle_report: None,
        })
    }

    /// Apply one pointer event
    ///
    /// The idle timer is polled with the event's timestamp first, so a long
    /// gap in the log pauses the session exactly as it would live.
    pub fn process_event(&mut self, event: &PointerEvent) -> Result<Vec<SessionEvent>, FittsError> {
        event.validate()?;

        let now = event.timestamp();
        if let Some(report) = self.session.poll_idle(now) {
            debug!(now, records = report.records.len(), "idle aggregation during replay");
            self.last_idle_report = Some(report);
        }

        let session_events = match *event {
            PointerEvent::Move { x, y, t } => self.session.register_pointer_move(Point::new(x, y), t),
            PointerEvent::Click { x, y, t } => self.session.register_click(Point::new(x, y), t),
        };
        Ok(session_events)
    }

    /// Apply a whole log in order
    pub fn process_log(&mut self, events: &[PointerEvent]) -> Result<(), FittsError> {
        for event in events {
            self.process_event(event)?;
        }
        info!(
            events = events.len(),
            records = self.session.record_count(),
            complete = self.session.is_complete(),
            "pointer log replayed"
        );
        Ok(())
    }

    /// Aggregate everything recorded so far
    pub fn aggregate(&self) -> AggregateReport {
        self.session.aggregate()
    }

    /// Aggregate and encode the report as pretty JSON
    pub fn encode_report(&self) -> Result<String, FittsError> {
        let report = self.aggregate();
        self.encoder
            .encode_to_json(&report, self.session.data_sets())
    }

    /// Aggregate and encode one NDJSON row per annotated trial
    pub fn encode_rows(&self) -> Result<String, FittsError> {
        self.encoder.encode_rows(&self.aggregate())
    }

    /// Report produced by the most recent idle timeout, if any
    pub fn last_idle_report(&self) -> Option<&AggregateReport> {
        self.last_idle_report.as_ref()
    }

    pub fn data_sets(&self) -> &[DataSet] {
        self.session.data_sets()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &FittsSession {
        &self.session
    }

    /// Discard collected data and start over
    pub fn restart(&mut self) -> Vec<SessionEvent> {
        self.last_idle_report = None;
        self.session.start_session()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrialCondition;
    use crate::layout::{layout_ring, next_position};

    fn replay_config() -> ExperimentConfig {
        ExperimentConfig {
            conditions: vec![TrialCondition::new(30.0, 250.0)],
            targets_per_ring: 8,
            hits_per_block: 6,
            ..ExperimentConfig::default()
        }
    }

    /// A participant who moves toward each target and clicks near its center,
    /// with a small deterministic scatter.
    fn synthetic_log(config: &ExperimentConfig) -> Vec<PointerEvent> {
        let condition = config.conditions[0];
        let ring = layout_ring(
            config.targets_per_ring,
            condition.amplitude,
            condition.width,
            config.display.center(),
        );
        let scatter = [(0.0, 0.0), (3.0, -2.0), (-2.0, 4.0), (4.0, 1.0), (-3.0, -3.0), (1.0, 5.0), (-4.0, 2.0)];

        let mut events = Vec::new();
        let mut position = 0;
        let mut t = 1000.0;
        for (i, (dx, dy)) in scatter.iter().enumerate() {
            let target = ring[position];
            if i > 0 {
                events.push(PointerEvent::Move {
                    x: target.x + dx * 10.0,
                    y: target.y + dy * 10.0,
                    t: t - 200.0,
                });
            }
            events.push(PointerEvent::Click {
                x: target.x + dx,
                y: target.y + dy,
                t,
            });
            position = next_position(position, ring.len());
            t += 500.0 + 10.0 * i as f64;
        }
        events
    }

    #[test]
    fn test_replay_completes_single_condition() {
        let config = replay_config();
        let mut processor = FittsProcessor::new(config.clone()).unwrap();
        processor.process_log(&synthetic_log(&config)).unwrap();

        assert_eq!(processor.state(), SessionState::Completed);
        assert_eq!(processor.data_sets().len(), 1);
        assert_eq!(processor.data_sets()[0].records.len(), 6);

        let report = processor.aggregate();
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.scored_records().count(), 6);
        assert!(report.regression.is_some());
    }

    #[test]
    fn test_replay_to_report_json() {
        let config = replay_config();
        let json = replay_to_report(&synthetic_log(&config), config).unwrap();

        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(payload["summary"]["total_records"], 6);
        assert_eq!(payload["groups"][0]["distance"], 250.0);
        assert_eq!(payload["groups"][0]["width"], 30.0);
        assert!(payload["summary"]["mean_throughput"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_idle_gap_pauses_replay() {
        let config = replay_config();
        let mut processor = FittsProcessor::new(config.clone()).unwrap();
        let log = synthetic_log(&config);

        // Anchor click, first move, then a gap far beyond the idle timeout
        processor.process_event(&log[0]).unwrap();
        processor.process_event(&log[1]).unwrap();
        assert!(processor.session().is_active());

        let late_move = PointerEvent::Move {
            x: 10.0,
            y: 10.0,
            t: log[1].timestamp() + 10_000.0,
        };
        let events = processor.process_event(&late_move).unwrap();

        assert!(events.is_empty());
        assert!(!processor.session().is_active());
        assert!(processor.last_idle_report().is_some());
    }

    #[test]
    fn test_parse_ndjson() {
        let log = r#"{"type":"move","x":10.5,"y":20,"t":1000}

{"type":"click","x":11,"y":21,"t":1200}
"#;
        let events = parse_ndjson(log).unwrap();
        assert_eq!(
            events,
            vec![
                PointerEvent::Move { x: 10.5, y: 20.0, t: 1000.0 },
                PointerEvent::Click { x: 11.0, y: 21.0, t: 1200.0 },
            ]
        );
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let log = "{\"type\":\"move\",\"x\":1,\"y\":2,\"t\":3}\n{\"type\":\"drag\"}\n";
        let err = parse_ndjson(log).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_array() {
        let events = parse_array(r#"[{"type":"click","x":1,"y":2,"t":3}]"#).unwrap();
        assert_eq!(events.len(), 1);
        assert!(parse_array("not json").is_err());
    }

    #[test]
    fn test_non_finite_event_rejected() {
        let mut processor = FittsProcessor::new(replay_config()).unwrap();
        let event = PointerEvent::Click {
            x: f64::NAN,
            y: 0.0,
            t: 0.0,
        };
        assert!(matches!(
            processor.process_event(&event),
            Err(FittsError::InvalidEvent(_))
        ));
    }

    #[test]
    fn test_restart_clears_data() {
        let config = replay_config();
        let mut processor = FittsProcessor::new(config.clone()).unwrap();
        processor.process_log(&synthetic_log(&config)).unwrap();

        processor.restart();
        assert_eq!(processor.state(), SessionState::Running { condition_index: 0 });
        assert!(processor.data_sets()[0].records.is_empty());
    }
}
