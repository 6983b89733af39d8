//! Analysis result types

use serde::{Deserialize, Serialize};

use crate::analysis::metrics::MetricMap;
use crate::analysis::validation::ValidationReport;
use crate::events::{Event, JumpType};

/// Complete analysis result
///
/// Owned by the caller; the engine returns it by value and retains nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Metric name to outcome map (flat; includes per-event frame entries)
    pub metrics: MetricMap,

    /// Detected events with refined, calibrated fractional frames
    pub events: Vec<Event>,

    /// Physiological validation report
    pub validation: ValidationReport,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

/// Analysis metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Frame rate of the capture in Hz
    pub fps: f32,

    /// Number of input frames
    pub frame_count: usize,

    /// Capture duration in seconds
    pub duration_seconds: f32,

    /// Jump type that was analyzed
    pub jump_type: JumpType,

    /// Pose estimator identifier used for calibration lookup
    pub estimator: String,

    /// Whether the estimator had calibration entries
    pub estimator_calibrated: bool,

    /// Tracking-quality score (0.0-1.0)
    pub tracking_quality: f32,

    /// Smoothing window actually used (after auto-tuning/clamping)
    pub smoothing_window: usize,

    /// Smoothing polynomial order actually used
    pub smoothing_order: usize,

    /// Number of gap frames bridged during preprocessing
    pub gap_frames_filled: usize,

    /// Algorithm version
    pub algorithm_version: String,

    /// Processing time in milliseconds
    ///
    /// Diagnostic only; excluded from the determinism contract that covers
    /// metrics, events, and the validation report.
    pub processing_time_ms: f32,
}
