//! Configuration parameters for jump analysis

use serde::{Deserialize, Serialize};

use crate::analysis::validation::AthleteProfile;
use crate::events::JumpType;

/// Per-analysis request: what was captured and how to interpret it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Frame rate of the capture in Hz (required, must be positive)
    pub fps: f32,

    /// Jump type performed in the capture
    pub jump_type: JumpType,

    /// Pose estimator identifier, used for calibration lookup
    pub estimator: String,

    /// Known physical reference in meters (drop-jump box height)
    ///
    /// When present, position-based measurements scaled by this reference
    /// are preferred over purely kinematic estimates.
    pub reference_height_m: Option<f32>,

    /// Demographic context for validation tier selection
    pub athlete: Option<AthleteProfile>,
}

impl AnalysisRequest {
    /// Create a request with no physical reference or athlete context
    pub fn new(fps: f32, jump_type: JumpType, estimator: &str) -> Self {
        Self {
            fps,
            jump_type,
            estimator: estimator.to_string(),
            reference_height_m: None,
            athlete: None,
        }
    }
}

/// Analysis configuration parameters
///
/// Durations are in seconds and converted to frame counts at the capture's
/// frame rate; velocity thresholds are in height units per second. Both stay
/// meaningful across frame rates without retuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum landmark confidence to contribute to a signal (default: 0.5)
    pub visibility_threshold: f32,

    /// Longest tracking gap that may be interpolated, in seconds
    /// (default: 0.2)
    pub max_gap_seconds: f32,

    /// Smoothing window override in frames (odd); auto-tuned from the frame
    /// rate and tracking quality when absent
    pub smoothing_window: Option<usize>,

    /// Smoothing polynomial order override; auto-tuned when absent
    pub smoothing_order: Option<usize>,

    /// Foot/hip speed below which the athlete counts as stationary, in
    /// height units per second (default: 0.25)
    pub contact_velocity_threshold: f32,

    /// Minimum ground-contact duration in seconds (default: 0.05)
    pub min_contact_seconds: f32,

    /// Minimum elevated-hold duration before a drop, in seconds
    /// (default: 0.3)
    pub plateau_seconds: f32,

    /// Minimum squat-hold duration for a static-start jump, in seconds
    /// (default: 0.5)
    pub hold_seconds: f32,

    /// Standing-baseline window for onset statistics, in seconds
    /// (default: 0.5)
    pub baseline_seconds: f32,

    /// Movement-onset threshold in baseline standard deviations
    /// (default: 3.0)
    ///
    /// 2.0 was evaluated and rejected: it triggers on tracking jitter
    /// roughly 20+ frames before the true onset.
    pub onset_sigma: f32,

    /// Minimum flight duration in seconds (default: 0.15)
    pub min_flight_seconds: f32,

    /// Minimum countermovement depth in height units (default: 0.01)
    pub min_countermovement_depth: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.5,
            max_gap_seconds: 0.2,
            smoothing_window: None,
            smoothing_order: None,
            contact_velocity_threshold: 0.25,
            min_contact_seconds: 0.05,
            plateau_seconds: 0.3,
            hold_seconds: 0.5,
            baseline_seconds: 0.5,
            onset_sigma: 3.0,
            min_flight_seconds: 0.15,
            min_countermovement_depth: 0.01,
        }
    }
}
