//! # Apex Kinetics
//!
//! A jump analysis engine that converts per-frame pose-estimation landmarks
//! into biomechanical events and performance metrics.
//!
//! ## Features
//!
//! - **Event detection**: standing start, lowest point, takeoff, apex,
//!   landing, and ground-contact windows, per jump type
//! - **Sub-frame timing**: parabolic and linear refinement of event frames
//! - **Cross-estimator calibration**: fixed per-estimator frame offsets
//! - **Metrics**: jump height, flight time, ground-contact time, reactive
//!   strength index, phase durations, peak velocities
//! - **Validation**: tiered physiological bounds with a pass/warn/fail report
//!
//! ## Quick Start
//!
//! ```no_run
//! use apex_kinetics::{
//!     analyze_jump, AnalysisConfig, AnalysisRequest, FrameSample, JumpType, ReferenceTables,
//! };
//!
//! // One FrameSample per video frame, from your pose estimator
//! let frames: Vec<FrameSample> = vec![];
//!
//! let request = AnalysisRequest::new(60.0, JumpType::Countermovement, "blazepose_lite");
//! let tables = ReferenceTables::default();
//! let result = analyze_jump(&frames, &request, &AnalysisConfig::default(), &tables)?;
//!
//! println!("Jump height: {:?}", result.metrics.get("jump_height_m"));
//! println!("Validation: {:?}", result.validation.status);
//! # Ok::<(), apex_kinetics::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! The pipeline flows strictly downward:
//!
//! ```text
//! Landmarks → Preprocessing → Smoothing/Derivatives → Phase Detection
//!           → Sub-frame Refinement → Calibration → Metrics → Validation
//! ```
//!
//! The engine is a pure function of the landmark series plus configuration:
//! no I/O, no cross-invocation state. Analyses of different captures are
//! independent and may run concurrently sharing one [`ReferenceTables`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod events;
pub mod landmarks;
pub mod preprocessing;
pub mod signal;

// Re-export main types
pub use analysis::metrics::{MetricMap, MetricOutcome};
pub use analysis::result::{AnalysisMetadata, AnalysisResult};
pub use analysis::validation::{
    AthleteProfile, BoundsRegistry, Severity, Sex, TrainingLevel, ValidationReport,
    ValidationStatus,
};
pub use config::{AnalysisConfig, AnalysisRequest};
pub use error::AnalysisError;
pub use events::calibration::CalibrationTable;
pub use events::{Event, EventKind, JumpType};
pub use landmarks::{FrameSample, Landmark, LandmarkPoint};

use preprocessing::aggregation::{aggregate, SignalSpec};
use preprocessing::gaps::fill_gaps;
use signal::savgol::SavgolFilter;
use signal::MotionSignals;

/// Fewer frames than this cannot hold a standing phase, a flight, and a
/// landing at any supported frame rate
const MIN_ANALYSIS_FRAMES: usize = 10;

/// Read-only reference tables shared across analyses
///
/// Built once at process start and passed by reference into every call;
/// never mutated afterwards, so concurrent analyses can share one instance.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    /// Per-estimator event frame offsets
    pub calibration: CalibrationTable,
    /// Physiological bounds by metric
    pub bounds: BoundsRegistry,
}

impl ReferenceTables {
    /// Tables with the project's measured calibration offsets and validated
    /// physiological ranges
    pub fn builtin() -> Self {
        Self {
            calibration: CalibrationTable::builtin(),
            bounds: BoundsRegistry::builtin(),
        }
    }
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Main analysis function
///
/// Runs the full pipeline over one jump capture and returns the complete
/// metrics + validation report, or the first fatal detection error.
///
/// # Arguments
///
/// * `frames` - One `FrameSample` per video frame, in capture order
/// * `request` - Frame rate, jump type, estimator id, optional physical
///   reference and athlete context
/// * `config` - Threshold and smoothing parameters
/// * `tables` - Read-only calibration and bounds tables
///
/// # Errors
///
/// Returns `AnalysisError::InsufficientTracking` for an empty or untrackable
/// capture (including a non-positive frame rate), `PhaseNotFound` when a
/// required event cannot be located, and `InvalidInput` for malformed
/// smoothing overrides. A partial event set is never returned.
///
/// # Example
///
/// ```no_run
/// use apex_kinetics::{
///     analyze_jump, AnalysisConfig, AnalysisRequest, FrameSample, JumpType, ReferenceTables,
/// };
///
/// let frames: Vec<FrameSample> = vec![];
/// let request = AnalysisRequest::new(60.0, JumpType::DropJump, "movenet_thunder");
/// let result = analyze_jump(
///     &frames,
///     &request,
///     &AnalysisConfig::default(),
///     &ReferenceTables::default(),
/// )?;
/// # Ok::<(), apex_kinetics::AnalysisError>(())
/// ```
pub fn analyze_jump(
    frames: &[FrameSample],
    request: &AnalysisRequest,
    config: &AnalysisConfig,
    tables: &ReferenceTables,
) -> Result<AnalysisResult, AnalysisError> {
    use std::time::Instant;
    let start_time = Instant::now();

    log::debug!(
        "Starting {} analysis: {} frames at {} fps, estimator '{}'",
        request.jump_type.key(),
        frames.len(),
        request.fps,
        request.estimator
    );

    // A frame rate that is zero, negative, or NaN makes every derived
    // quantity meaningless, exactly like a capture with no frames
    if frames.len() < MIN_ANALYSIS_FRAMES || !(request.fps > 0.0) {
        return Err(AnalysisError::InsufficientTracking {
            signal: "input".to_string(),
            start_frame: 0,
            end_frame: frames.len().saturating_sub(1),
        });
    }

    // Preprocessing: composite signals, gap handling, tracking quality
    let hip_spec = SignalSpec::hip_height(config.visibility_threshold);
    let foot_spec = SignalSpec::foot_height(config.visibility_threshold);

    let quality = preprocessing::quality::assess(frames, &[&hip_spec, &foot_spec]);
    if quality.score < 0.25 {
        log::warn!(
            "Low tracking quality {:.2} (confidence {:.2}, coverage {:.2})",
            quality.score,
            quality.mean_confidence,
            quality.coverage
        );
    }

    let max_gap = (config.max_gap_seconds * request.fps).round() as usize;
    let (hip_raw, hip_filled) = fill_gaps(&aggregate(frames, &hip_spec), max_gap)?;
    let (foot_raw, foot_filled) = fill_gaps(&aggregate(frames, &foot_spec), max_gap)?;

    // Smoothing and derivatives from the same local polynomial fit
    let (auto_window, auto_order) = signal::savgol::auto_params(request.fps, quality.score);
    let window = match config.smoothing_window {
        Some(window) => window,
        None => {
            // Auto-tuned windows shrink to what the capture can support
            let longest_odd = if frames.len() % 2 == 0 {
                frames.len() - 1
            } else {
                frames.len()
            };
            auto_window.min(longest_odd)
        }
    };
    let order = config.smoothing_order.unwrap_or(auto_order);
    let filter = SavgolFilter::new(window, order)?;

    log::debug!(
        "Smoothing with window {} order {} (tracking quality {:.2})",
        filter.window(),
        filter.order(),
        quality.score
    );

    let signals = MotionSignals {
        hip: filter.smooth(&hip_raw)?,
        hip_velocity: filter.derivative(&hip_raw, 1, request.fps, "hip_velocity")?,
        hip_acceleration: filter.derivative(&hip_raw, 2, request.fps, "hip_acceleration")?,
        foot: filter.smooth(&foot_raw)?,
        foot_velocity: filter.derivative(&foot_raw, 1, request.fps, "foot_velocity")?,
        half_window: filter.half_window(),
    };

    // Phase detection (includes the temporal ordering check), then
    // per-estimator calibration of the refined frames
    let mut events = events::detect_events(&signals, request.fps, request.jump_type, config)?;
    tables.calibration.apply(&request.estimator, &mut events);

    // Metrics and validation
    let metrics = analysis::metrics::compute_metrics(&events, &signals, request)?;
    let validation =
        analysis::validation::validate(&metrics, request.athlete.as_ref(), &tables.bounds);

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;
    log::debug!(
        "Analysis complete in {:.2} ms: {:?}",
        processing_time_ms,
        validation.status
    );

    Ok(AnalysisResult {
        metrics,
        events,
        validation,
        metadata: AnalysisMetadata {
            fps: request.fps,
            frame_count: frames.len(),
            duration_seconds: frames.len() as f32 / request.fps,
            jump_type: request.jump_type,
            estimator: request.estimator.clone(),
            estimator_calibrated: tables.calibration.knows_estimator(&request.estimator),
            tracking_quality: quality.score,
            smoothing_window: filter.window(),
            smoothing_order: filter.order(),
            gap_frames_filled: hip_filled + foot_filled,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            processing_time_ms,
        },
    })
}
