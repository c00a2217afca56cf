//! Trial/session state machine
//!
//! A [`FittsSession`] owns every piece of mutable experiment state. The
//! presentation layer calls the transition functions with pointer input and
//! renders the [`SessionEvent`]s they return; nothing else mutates the session.
//!
//! Each condition block starts inactive: the first target must be acquired
//! once to anchor the start point before trials are recorded. The same
//! anchoring happens after an idle pause.

use crate::aggregate::aggregate;
use crate::config::ExperimentConfig;
use crate::error::FittsError;
use crate::geometry::{distance, Point, TimedPoint};
use crate::layout::{layout_ring, next_position};
use crate::timer::IdleTimer;
use crate::types::{AggregateReport, DataSet, RawTrialRecord, Target};
use serde::Serialize;
use tracing::{debug, info};

/// Colour tags handed out to data sets, cycled by block index
const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Where the session is in the experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum SessionState {
    NotStarted,
    Running { condition_index: usize },
    Completed,
}

/// Instructions for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum SessionEvent {
    /// Draw (or redraw) the full ring of targets
    RenderRing { targets: Vec<Target> },
    /// Highlight the target to acquire next
    RenderTarget { target: Target },
    /// Remove the highlighted target
    RemoveTarget,
    /// Show the 1-based block label
    ShowTrialLabel { block: usize },
    /// Draw one speed-coloured trail segment
    TrailSegment {
        from: Point,
        to: Point,
        /// Pointer speed in px/ms
        speed: f64,
        colour: String,
    },
    /// A click outside the current target
    Miss { count: u32 },
    /// A hit was stored as a trial record
    TrialRecorded { block: usize, time_ms: f64 },
    /// A hit was too slow to keep
    OutlierDiscarded { time_ms: f64 },
    /// All conditions are done: hide the test surface, offer a restart
    SessionComplete,
}

/// State of one experiment run
#[derive(Debug, Clone)]
pub struct FittsSession {
    config: ExperimentConfig,
    state: SessionState,
    /// Whether hits are currently recorded and moves sampled
    active: bool,
    ring: Vec<Target>,
    current_position: usize,
    current_count: usize,
    misses: u32,
    target: Option<Target>,
    start: TimedPoint,
    last: Option<TimedPoint>,
    path: Vec<TimedPoint>,
    data_sets: Vec<DataSet>,
    idle_timer: IdleTimer,
}

impl FittsSession {
    /// Create a session for a validated configuration
    pub fn new(config: ExperimentConfig) -> Result<Self, FittsError> {
        config.validate()?;
        let idle_timer = IdleTimer::new(config.idle_timeout_ms);
        Ok(Self {
            config,
            state: SessionState::NotStarted,
            active: false,
            ring: Vec::new(),
            current_position: 0,
            current_count: 0,
            misses: 0,
            target: None,
            start: TimedPoint::default(),
            last: None,
            path: Vec::new(),
            data_sets: Vec::new(),
            idle_timer,
        })
    }

    /// Reset all collected data and begin the first condition
    pub fn start_session(&mut self) -> Vec<SessionEvent> {
        self.data_sets.clear();
        self.current_count = 0;
        self.current_position = 0;
        self.misses = 0;
        self.ring.clear();
        self.target = None;
        self.start = TimedPoint::default();
        self.last = None;
        self.path.clear();
        self.idle_timer.cancel();
        self.active = false;

        info!(
            conditions = self.config.conditions.len(),
            targets_per_ring = self.config.targets_per_ring,
            "session started"
        );
        self.begin_condition(0)
    }

    /// Lay out the ring for a condition and open a new data set
    ///
    /// An index past the last condition completes the session.
    pub fn begin_condition(&mut self, condition_index: usize) -> Vec<SessionEvent> {
        let Some(condition) = self.config.conditions.get(condition_index).copied() else {
            self.state = SessionState::Completed;
            self.active = false;
            self.target = None;
            self.idle_timer.cancel();
            info!(blocks = self.data_sets.len(), "session complete");
            return vec![SessionEvent::SessionComplete];
        };

        self.state = SessionState::Running { condition_index };
        self.current_count = 0;
        self.misses = 0;

        self.ring = layout_ring(
            self.config.targets_per_ring,
            condition.amplitude,
            condition.width,
            self.config.display.center(),
        );
        let mut events = vec![SessionEvent::RenderRing {
            targets: self.ring.clone(),
        }];

        self.current_position = 0;
        events.extend(self.present_next_target());
        // The first acquisition of a block only anchors the start point.
        self.active = false;

        self.data_sets.push(DataSet {
            colour: CATEGORY10[condition_index % CATEGORY10.len()].to_string(),
            misses: 0,
            records: Vec::new(),
        });

        debug!(
            condition_index,
            width = condition.width,
            amplitude = condition.amplitude,
            "condition started"
        );
        events.push(SessionEvent::ShowTrialLabel {
            block: condition_index + 1,
        });
        events
    }

    /// Select the target at the current position and advance across the ring
    pub fn present_next_target(&mut self) -> Vec<SessionEvent> {
        let Some(target) = self.ring.get(self.current_position).copied() else {
            return Vec::new();
        };

        self.target = Some(target);
        self.current_position = next_position(self.current_position, self.ring.len());
        self.active = true;

        vec![SessionEvent::RenderTarget { target }]
    }

    /// Sample a pointer move
    ///
    /// Ignored while inactive and when the point equals the previous sample.
    pub fn register_pointer_move(&mut self, point: Point, timestamp: f64) -> Vec<SessionEvent> {
        if !self.active {
            return Vec::new();
        }
        if let Some(last) = self.last {
            if last.x == point.x && last.y == point.y {
                return Vec::new();
            }
        }

        self.idle_timer.rearm(timestamp);

        let sample = TimedPoint::new(point.x, point.y, timestamp);
        self.path.push(sample);

        let mut events = Vec::new();
        if let Some(last) = self.last {
            let dt = sample.t - last.t;
            let speed = if dt > 0.0 {
                distance(last.point(), point) / dt
            } else {
                0.0
            };
            events.push(SessionEvent::TrailSegment {
                from: last.point(),
                to: point,
                speed,
                colour: trail_colour(speed, self.config.max_speed),
            });
        }
        self.last = Some(sample);

        events
    }

    /// Evaluate a click against the current target
    pub fn register_click(&mut self, point: Point, timestamp: f64) -> Vec<SessionEvent> {
        let SessionState::Running { condition_index } = self.state else {
            return Vec::new();
        };
        let Some(target) = self.target else {
            return Vec::new();
        };

        if distance(point, target.center()) >= target.radius() {
            self.misses += 1;
            if let Some(data_set) = self.data_sets.last_mut() {
                data_set.misses = self.misses;
            }
            debug!(x = point.x, y = point.y, misses = self.misses, "miss");
            return vec![SessionEvent::Miss { count: self.misses }];
        }

        let hit = TimedPoint::new(point.x, point.y, timestamp);
        let mut events = Vec::new();
        if let Some(event) = self.record_trial(target, hit, condition_index) {
            events.push(event);
        }

        events.push(SessionEvent::RemoveTarget);
        self.active = false;
        self.target = None;
        self.path.clear();

        if self.current_count >= self.config.hits_per_block {
            self.current_count = 0;
            self.current_position = 0;
            events.extend(self.begin_condition(condition_index + 1));
        } else {
            self.current_count += 1;
            events.extend(self.present_next_target());
        }

        self.start = hit;
        self.last = Some(hit);
        self.path.push(hit);

        events
    }

    /// Store a hit as a trial record if the session is active and the time is plausible
    fn record_trial(
        &mut self,
        target: Target,
        hit: TimedPoint,
        condition_index: usize,
    ) -> Option<SessionEvent> {
        if !self.active {
            debug!(x = hit.x, y = hit.y, "anchor acquisition");
            return None;
        }

        let time = hit.t - self.start.t;
        if time >= self.config.max_movement_time_ms {
            debug!(time_ms = time, "movement time outlier discarded");
            return Some(SessionEvent::OutlierDiscarded { time_ms: time });
        }

        let record = RawTrialRecord {
            time,
            distance: target.distance,
            width: target.w,
            start: self.start,
            target,
            hit,
            path: self.path.clone(),
        };

        let data_set = self.data_sets.last_mut()?;
        data_set.records.push(record);
        debug!(block = condition_index + 1, time_ms = time, "trial recorded");

        Some(SessionEvent::TrialRecorded {
            block: condition_index + 1,
            time_ms: time,
        })
    }

    /// Fire the idle timeout if no movement arrived for the configured delay
    ///
    /// When it fires the session pauses (the next hit re-anchors) and the
    /// data collected so far is aggregated.
    pub fn poll_idle(&mut self, now: f64) -> Option<AggregateReport> {
        if !self.idle_timer.fire_if_due(now) {
            return None;
        }

        self.active = false;
        info!(
            now,
            records = self.record_count(),
            "pointer idle, session paused"
        );
        Some(self.aggregate())
    }

    /// Aggregate all data sets collected so far
    pub fn aggregate(&self) -> AggregateReport {
        aggregate(&self.data_sets)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Completed
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn ring(&self) -> &[Target] {
        &self.ring
    }

    pub fn current_target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Pointer samples since the last hit
    pub fn path(&self) -> &[TimedPoint] {
        &self.path
    }

    /// Misses in the current block
    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn data_sets(&self) -> &[DataSet] {
        &self.data_sets
    }

    pub fn into_data_sets(self) -> Vec<DataSet> {
        self.data_sets
    }

    pub fn record_count(&self) -> usize {
        self.data_sets.iter().map(|set| set.records.len()).sum()
    }

    pub fn idle_timer(&self) -> &IdleTimer {
        &self.idle_timer
    }
}

/// Red intensity proportional to speed, saturating at `max_speed`
fn trail_colour(speed: f64, max_speed: f64) -> String {
    let red = ((speed / max_speed) * 255.0).floor().clamp(0.0, 255.0) as u8;
    format!("rgb({}, 0, 0)", red)
}
