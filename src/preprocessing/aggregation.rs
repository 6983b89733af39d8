//! Composite signal aggregation
//!
//! Aggregates redundant landmarks into a single reference-point signal per
//! frame: a confidence-weighted mean of the group's visible members. Using
//! several landmarks per body region keeps the signal alive when individual
//! landmarks flicker below the visibility threshold.
//!
//! Output is a *height* trajectory (`1.0 - weighted mean y`), so upward
//! motion is positive. Frames where no member landmark clears the visibility
//! threshold become NaN gaps for the gap handler to resolve.

use crate::landmarks::{FrameSample, Landmark};
use crate::signal::Trajectory;

/// Aggregation rule: which landmarks form a composite signal
#[derive(Debug, Clone)]
pub struct SignalSpec {
    /// Name of the derived signal
    pub name: &'static str,
    /// Member landmarks averaged into the signal
    pub landmarks: Vec<Landmark>,
    /// Minimum confidence for a member to contribute
    pub visibility_threshold: f32,
}

impl SignalSpec {
    /// Foot height: ankles, heels, and foot tips
    ///
    /// The widest group in the vocabulary; foot landmarks are the most
    /// occlusion-prone, so redundancy matters most here.
    pub fn foot_height(visibility_threshold: f32) -> Self {
        Self {
            name: "foot_height",
            landmarks: vec![
                Landmark::LeftAnkle,
                Landmark::RightAnkle,
                Landmark::LeftHeel,
                Landmark::RightHeel,
                Landmark::LeftFootIndex,
                Landmark::RightFootIndex,
            ],
            visibility_threshold,
        }
    }

    /// Hip height: left and right hips
    pub fn hip_height(visibility_threshold: f32) -> Self {
        Self {
            name: "hip_height",
            landmarks: vec![Landmark::LeftHip, Landmark::RightHip],
            visibility_threshold,
        }
    }
}

/// Aggregate one composite signal from a frame sequence
///
/// For each frame, computes the confidence-weighted mean y of the spec's
/// visible member landmarks and converts it to a height. Frames with no
/// visible member yield NaN; resolving those is the gap handler's job, so
/// that a single policy (and a single error site) covers all gap causes.
pub fn aggregate(frames: &[FrameSample], spec: &SignalSpec) -> Trajectory {
    let values = frames
        .iter()
        .map(|frame| {
            let mut weighted_sum = 0.0f32;
            let mut weight_total = 0.0f32;
            for &landmark in &spec.landmarks {
                if let Some(point) = frame.get(landmark) {
                    if point.is_visible(spec.visibility_threshold) {
                        weighted_sum += point.y * point.confidence;
                        weight_total += point.confidence;
                    }
                }
            }
            if weight_total > 0.0 {
                1.0 - weighted_sum / weight_total
            } else {
                f32::NAN
            }
        })
        .collect();

    Trajectory::new(spec.name, values)
}
