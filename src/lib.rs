//! Fitts Throughput - Core of a Fitts's Law multi-directional tapping experiment
//!
//! The crate drives an ISO 9241-9 style ring of circular targets, records
//! pointer paths and click timing while a participant acquires them, and
//! derives throughput statistics: effective width, effective index of
//! difficulty and a regression of movement time on that index.
//!
//! Rendering is left to the caller. A presentation layer feeds pointer moves
//! and clicks into a [`FittsSession`] and draws whatever [`SessionEvent`]s
//! come back.
//!
//! ## Modules
//!
//! - **Geometry / Stats / Difficulty**: the numeric building blocks
//! - **Session**: target ring, hit testing and trial recording
//! - **Aggregate**: effective width per condition and the speed-accuracy regression
//! - **Pipeline**: replay a recorded pointer log into a throughput report

pub mod aggregate;
pub mod config;
pub mod difficulty;
pub mod encoder;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod pipeline;
pub mod session;
pub mod stats;
pub mod timer;
pub mod types;

pub use aggregate::aggregate;
pub use config::{DisplayArea, ExperimentConfig, TrialCondition};
pub use error::FittsError;
pub use pipeline::{replay_to_report, FittsProcessor, PointerEvent};
pub use session::{FittsSession, SessionEvent, SessionState};
pub use types::{AggregateReport, AnnotatedRecord, DataSet, RawTrialRecord, Regression};

/// Crate version embedded in all reports
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "fitts-throughput";
