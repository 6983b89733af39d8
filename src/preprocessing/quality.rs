//! Tracking-quality scoring
//!
//! Summarizes how trustworthy the landmark stream is over the whole capture.
//! The score feeds smoothing auto-tuning (noisier tracking gets a wider
//! window) and is reported in the analysis metadata so callers can judge the
//! result's reliability.

use crate::landmarks::FrameSample;
use crate::preprocessing::aggregation::SignalSpec;

/// Tracking-quality summary for a frame sequence
#[derive(Debug, Clone, Copy)]
pub struct TrackingQuality {
    /// Mean confidence of the landmarks the analysis depends on (0.0-1.0)
    pub mean_confidence: f32,
    /// Fraction of frames where every required signal had a visible member
    pub coverage: f32,
    /// Combined score (0.0-1.0)
    pub score: f32,
}

/// Assess tracking quality for the landmark groups the analysis will use
///
/// `mean_confidence` averages the confidence of every present member
/// landmark across all frames (missing landmarks count as zero confidence).
/// `coverage` is the fraction of frames in which each spec has at least one
/// member above its visibility threshold. The combined score is their
/// product: either chronic low confidence or frequent dropouts alone is
/// enough to mark the capture as poor.
pub fn assess(frames: &[FrameSample], specs: &[&SignalSpec]) -> TrackingQuality {
    if frames.is_empty() || specs.is_empty() {
        return TrackingQuality {
            mean_confidence: 0.0,
            coverage: 0.0,
            score: 0.0,
        };
    }

    let mut confidence_sum = 0.0f32;
    let mut confidence_count = 0usize;
    let mut covered_frames = 0usize;

    for frame in frames {
        let mut all_specs_covered = true;
        for spec in specs {
            let mut spec_covered = false;
            for &landmark in &spec.landmarks {
                let confidence = frame.get(landmark).map_or(0.0, |p| p.confidence);
                confidence_sum += confidence;
                confidence_count += 1;
                if confidence >= spec.visibility_threshold {
                    spec_covered = true;
                }
            }
            if !spec_covered {
                all_specs_covered = false;
            }
        }
        if all_specs_covered {
            covered_frames += 1;
        }
    }

    let mean_confidence = confidence_sum / confidence_count as f32;
    let coverage = covered_frames as f32 / frames.len() as f32;
    let score = (mean_confidence * coverage).clamp(0.0, 1.0);

    TrackingQuality {
        mean_confidence,
        coverage,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Landmark, LandmarkPoint};

    fn frame(confidence: f32) -> FrameSample {
        FrameSample::empty()
            .with(Landmark::LeftHip, LandmarkPoint::new(0.5, 0.5, confidence))
            .with(Landmark::RightHip, LandmarkPoint::new(0.5, 0.5, confidence))
    }

    #[test]
    fn test_clean_tracking_scores_high() {
        let frames = vec![frame(0.95); 20];
        let spec = SignalSpec::hip_height(0.5);
        let quality = assess(&frames, &[&spec]);
        assert!(quality.score > 0.9);
        assert!((quality.coverage - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dropout_frames_reduce_coverage() {
        let mut frames = vec![frame(0.9); 10];
        for f in frames.iter_mut().take(5) {
            *f = FrameSample::empty();
        }
        let spec = SignalSpec::hip_height(0.5);
        let quality = assess(&frames, &[&spec]);
        assert!((quality.coverage - 0.5).abs() < 1e-6);
        assert!(quality.score < 0.5);
    }

    #[test]
    fn test_empty_input() {
        let spec = SignalSpec::hip_height(0.5);
        let quality = assess(&[], &[&spec]);
        assert_eq!(quality.score, 0.0);
    }
}
