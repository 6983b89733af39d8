//! Sub-frame event refinement
//!
//! The detectors anchor events on integer frames of a sampled signal; the
//! true instant almost always falls between samples. Two refinement methods
//! cover the two event families:
//! - Extremum events (lowest point, apex, velocity peaks): parabola through
//!   the anchor and its immediate neighbors, vertex abscissa as the
//!   fractional frame
//! - Threshold-crossing events (contact start/end, movement onset): linear
//!   interpolation between the two bracketing frames
//!
//! Contract: the refined fractional frame lies within ±1.0 of the integer
//! anchor. A degenerate neighborhood (collinear points, anchor at a signal
//! boundary, threshold not actually bracketed) returns the anchor unchanged
//! rather than extrapolating.

/// Curvature below this is treated as collinear
const CURVATURE_EPSILON: f32 = 1e-9;

/// Refine an extremum anchor via a parabolic vertex fit
///
/// Fits a parabola through `(anchor-1, anchor, anchor+1)` and returns the
/// vertex position. Works for maxima and minima alike.
pub fn parabolic_vertex(values: &[f32], anchor: usize) -> f32 {
    if anchor == 0 || anchor + 1 >= values.len() {
        return anchor as f32;
    }
    let left = values[anchor - 1];
    let center = values[anchor];
    let right = values[anchor + 1];

    let curvature = left - 2.0 * center + right;
    if curvature.abs() < CURVATURE_EPSILON {
        return anchor as f32;
    }

    let delta = 0.5 * (left - right) / curvature;
    anchor as f32 + delta.clamp(-1.0, 1.0)
}

/// Fractional position of a threshold crossing between two samples
///
/// Returns the fraction in [0, 1] along the `before -> after` step at which
/// the value crosses `threshold`, or `None` when the step does not bracket
/// the threshold (including a flat step).
pub fn crossing_fraction(before: f32, after: f32, threshold: f32) -> Option<f32> {
    let step = after - before;
    if step.abs() < CURVATURE_EPSILON {
        return None;
    }
    let fraction = (threshold - before) / step;
    if (0.0..=1.0).contains(&fraction) {
        Some(fraction)
    } else {
        None
    }
}

/// Refine a threshold-crossing anchor
///
/// The anchor is the first frame on the far side of the threshold; the
/// crossing happened between `anchor - 1` and `anchor`. Falls back to the
/// anchor when the frames do not bracket the threshold.
pub fn refine_crossing(values: &[f32], anchor: usize, threshold: f32) -> f32 {
    if anchor == 0 || anchor >= values.len() {
        return anchor as f32;
    }
    match crossing_fraction(values[anchor - 1], values[anchor], threshold) {
        Some(fraction) => (anchor - 1) as f32 + fraction,
        None => anchor as f32,
    }
}

/// Detection quality implied by a refinement result
///
/// A refinement that fell back to (or landed exactly on) the integer anchor
/// carries less sub-frame information than a genuine interpolation.
pub fn refinement_quality(anchor: usize, precise: f32) -> f32 {
    if (precise - anchor as f32).abs() < f32::EPSILON {
        0.8
    } else {
        1.0
    }
}
