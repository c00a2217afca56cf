//! Experiment configuration
//!
//! The configuration is loaded once at session start and never mutated by the
//! session. Every field has a default, so a partial JSON document is enough to
//! override a single setting.

use crate::error::FittsError;
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Default number of targets on the ring
pub const DEFAULT_TARGETS_PER_RING: usize = 24;

/// Default recorded acquisitions per condition block
pub const DEFAULT_HITS_PER_BLOCK: usize = 15;

/// Default movement time cutoff in milliseconds (exclusive)
pub const DEFAULT_MAX_MOVEMENT_TIME_MS: f64 = 2000.0;

/// Default pause before the idle timeout fires, in milliseconds
pub const DEFAULT_IDLE_TIMEOUT_MS: f64 = DEFAULT_MAX_MOVEMENT_TIME_MS;

/// Pointer speed (px/ms) rendered at full trail intensity
pub const DEFAULT_MAX_SPEED: f64 = 6.0;

/// One block of the experiment: target width and movement amplitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialCondition {
    /// Target diameter in pixels
    #[serde(alias = "w")]
    pub width: f64,
    /// Ring diameter (nominal movement distance) in pixels
    #[serde(alias = "a")]
    pub amplitude: f64,
}

impl TrialCondition {
    pub fn new(width: f64, amplitude: f64) -> Self {
        Self { width, amplitude }
    }
}

/// Outer size and margins of the test surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayArea {
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for DisplayArea {
    fn default() -> Self {
        Self {
            width: 620.0,
            height: 400.0,
            top: 30.0,
            right: 30.0,
            bottom: 30.0,
            left: 30.0,
        }
    }
}

impl DisplayArea {
    pub fn inner_width(&self) -> f64 {
        self.width - (self.left + self.right)
    }

    pub fn inner_height(&self) -> f64 {
        self.height - (self.top + self.bottom)
    }

    /// Center of the inner area, in outer coordinates
    pub fn center(&self) -> Point {
        Point::new(
            self.inner_width() / 2.0 + self.left,
            self.inner_height() / 2.0 + self.top,
        )
    }
}

/// Complete experiment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Ordered condition blocks
    pub conditions: Vec<TrialCondition>,
    /// Number of targets placed on the ring
    pub targets_per_ring: usize,
    /// Recorded acquisitions before advancing to the next condition
    pub hits_per_block: usize,
    /// Pause without movement before the session is treated as idle
    pub idle_timeout_ms: f64,
    /// Movement times at or above this value are discarded as outliers
    pub max_movement_time_ms: f64,
    /// Speed mapped to the brightest trail colour (px/ms)
    pub max_speed: f64,
    pub display: DisplayArea,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            conditions: vec![
                TrialCondition::new(30.0, 250.0),
                TrialCondition::new(30.0, 300.0),
                TrialCondition::new(30.0, 350.0),
                TrialCondition::new(55.0, 250.0),
                TrialCondition::new(55.0, 300.0),
                TrialCondition::new(55.0, 350.0),
            ],
            targets_per_ring: DEFAULT_TARGETS_PER_RING,
            hits_per_block: DEFAULT_HITS_PER_BLOCK,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            max_movement_time_ms: DEFAULT_MAX_MOVEMENT_TIME_MS,
            max_speed: DEFAULT_MAX_SPEED,
            display: DisplayArea::default(),
        }
    }
}

impl ExperimentConfig {
    /// Parse and validate a configuration document
    pub fn from_json(json: &str) -> Result<Self, FittsError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FittsError::ParseError(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, FittsError> {
        serde_json::to_string_pretty(self).map_err(FittsError::JsonError)
    }

    /// Check the invariants the session and aggregation rely on
    pub fn validate(&self) -> Result<(), FittsError> {
        if self.conditions.is_empty() {
            return Err(FittsError::InvalidConfig(
                "at least one trial condition is required".to_string(),
            ));
        }

        for (index, condition) in self.conditions.iter().enumerate() {
            if !(condition.width.is_finite() && condition.width > 0.0) {
                return Err(FittsError::InvalidConfig(format!(
                    "condition {} has non-positive width {}",
                    index, condition.width
                )));
            }
            if !(condition.amplitude.is_finite() && condition.amplitude > 0.0) {
                return Err(FittsError::InvalidConfig(format!(
                    "condition {} has non-positive amplitude {}",
                    index, condition.amplitude
                )));
            }
        }

        if self.targets_per_ring < 2 {
            return Err(FittsError::InvalidConfig(format!(
                "targets_per_ring must be at least 2, got {}",
                self.targets_per_ring
            )));
        }

        if self.hits_per_block == 0 {
            return Err(FittsError::InvalidConfig(
                "hits_per_block must be positive".to_string(),
            ));
        }

        for (name, value) in [
            ("idle_timeout_ms", self.idle_timeout_ms),
            ("max_movement_time_ms", self.max_movement_time_ms),
            ("max_speed", self.max_speed),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(FittsError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if self.display.inner_width() <= 0.0 || self.display.inner_height() <= 0.0 {
            return Err(FittsError::InvalidConfig(
                "display margins leave no inner area".to_string(),
            ));
        }

        Ok(())
    }
}
