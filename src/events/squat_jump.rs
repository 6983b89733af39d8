//! Squat jump phase detection
//!
//! A squat jump starts from a held squat position instead of a standing
//! countermovement: the detector first confirms a sustained low-velocity
//! hold window on the hip signal, then applies the same takeoff/apex/landing
//! logic as the countermovement detector. There is no lowest-point event;
//! the athlete is already at depth when the capture begins.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::events::{self, refine, Event, EventKind};
use crate::signal::MotionSignals;

use super::countermovement::{locate_flight, BaselineStats, ACCEL_QUIET_FLOOR};

/// Detect squat jump events
pub fn detect(
    signals: &MotionSignals,
    fps: f32,
    config: &AnalysisConfig,
) -> Result<Vec<Event>, AnalysisError> {
    let n = signals.len();
    let margin = signals.half_window;
    if n <= 2 * margin + 8 {
        return Err(AnalysisError::PhaseNotFound {
            event: EventKind::Apex,
            detail: format!(
                "{} frames leave no search range inside the filter margins",
                n
            ),
        });
    }
    let lo = margin;
    let hi = n - margin;

    let vel = signals.hip_velocity.values();
    let acc = signals.hip_acceleration.values();

    // Hold window: sustained near-zero hip velocity. Longer than the
    // drop-jump plateau requirement; a genuine static start is held, not
    // passed through.
    let hold_frames = ((config.hold_seconds * fps).round() as usize).max(3);
    let threshold = config.contact_velocity_threshold;
    let hold_start = events::find_sustained(vel, lo..hi, hold_frames, |v| v.abs() < threshold)
        .ok_or_else(|| AnalysisError::PhaseNotFound {
            event: EventKind::StandingStart,
            detail: format!(
                "no {}-frame hold below |velocity| {}",
                hold_frames, threshold
            ),
        })?;

    // Extend the hold to its end; the first moving frame starts the jump
    let mut hold_end = hold_start;
    while hold_end < hi && vel[hold_end].abs() < threshold {
        hold_end += 1;
    }
    if hold_end >= hi {
        return Err(AnalysisError::PhaseNotFound {
            event: EventKind::Takeoff,
            detail: "hold window never ends within the capture".to_string(),
        });
    }

    // Baseline acceleration statistics over the hold window, used by the
    // landing spike confirmation
    let (acc_mean, acc_std) = events::mean_std(&acc[hold_start..hold_end]);
    let baseline = BaselineStats {
        mean: acc_mean,
        threshold: config.onset_sigma * acc_std + ACCEL_QUIET_FLOOR,
    };

    let (takeoff, apex, landing) =
        locate_flight(signals, hold_end, lo, hi, fps, config, baseline)?;

    let hip = signals.hip.values();
    let event = |kind, anchor: usize, precise: f32| {
        Event::refined(kind, anchor, precise, refine::refinement_quality(anchor, precise))
    };

    // Movement onset crossing: |velocity| rises through the hold threshold
    // between the last held frame and hold_end
    let onset_precise = {
        let before = vel[hold_end - 1].abs();
        let after = vel[hold_end].abs();
        match refine::crossing_fraction(before, after, threshold) {
            Some(fraction) => (hold_end - 1) as f32 + fraction,
            None => hold_end as f32,
        }
    };

    Ok(vec![
        event(EventKind::StandingStart, hold_end, onset_precise),
        event(EventKind::Takeoff, takeoff, refine::parabolic_vertex(vel, takeoff)),
        event(EventKind::Apex, apex, refine::parabolic_vertex(hip, apex)),
        event(EventKind::Landing, landing, refine::parabolic_vertex(vel, landing)),
    ])
}
