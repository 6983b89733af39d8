//! Countermovement jump phase detection
//!
//! Backward search anchored at the flight apex, the most reliable feature of
//! the whole trajectory:
//! 1. Apex = global maximum of smoothed hip height
//! 2. Takeoff = upward-velocity maximum walking backward from the apex
//! 3. Lowest point = hip-height minimum walking further backward
//! 4. Movement onset = walking backward from the lowest point, the frame
//!    where vertical acceleration still exceeded the standing baseline's
//!    mean + 3 sigma (the first moving frame)
//! 5. Landing = downward-velocity extremum after the apex, confirmed by the
//!    touchdown deceleration spike
//!
//! The 3-sigma onset threshold is a validated design constant: 2 sigma was
//! evaluated and rejected because it triggers on tracking jitter roughly 20+
//! frames before the true onset.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::events::{self, refine, Event, EventKind};
use crate::signal::MotionSignals;

/// Floor added to the baseline deviation threshold, in height units per
/// second squared. Quiet stance still carries this much smoothed
/// acceleration from sway and landmark jitter, and a near-noiseless capture
/// would otherwise yield a threshold so low that the smoothing filter's
/// half-window smear of the descent trips it several frames early.
pub(crate) const ACCEL_QUIET_FLOOR: f32 = 0.45;

/// Standing-baseline acceleration statistics
#[derive(Debug, Clone, Copy)]
pub(crate) struct BaselineStats {
    pub mean: f32,
    pub threshold: f32,
}

/// Detect countermovement jump events
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

    let hip = signals.hip.values();
    let acc = signals.hip_acceleration.values();

    // Standing baseline: the capture starts with the athlete standing still
    let baseline_frames = (config.baseline_seconds * fps).round() as usize;
    let baseline_end = (lo + baseline_frames).min(hi);
    if baseline_end.saturating_sub(lo) < 4 {
        return Err(AnalysisError::PhaseNotFound {
            event: EventKind::StandingStart,
            detail: "not enough frames for a standing baseline".to_string(),
        });
    }
    let (acc_mean, acc_std) = events::mean_std(&acc[lo..baseline_end]);
    let baseline = BaselineStats {
        mean: acc_mean,
        threshold: config.onset_sigma * acc_std + ACCEL_QUIET_FLOOR,
    };
    let standing_height = signals.hip.mean_in(lo..baseline_end);

    let (takeoff, apex, landing) = locate_flight(signals, lo, lo, hi, fps, config, baseline)?;

    // Lowest point: hip-height minimum between the start and takeoff
    let lowest = signals
        .hip
        .argmin_in(lo..takeoff)
        .ok_or_else(|| AnalysisError::PhaseNotFound {
            event: EventKind::LowestPoint,
            detail: "no frames before takeoff".to_string(),
        })?;
    if standing_height - hip[lowest] < config.min_countermovement_depth {
        return Err(AnalysisError::PhaseNotFound {
            event: EventKind::LowestPoint,
            detail: "countermovement depth below the detectable minimum".to_string(),
        });
    }

    let onset = find_movement_onset(acc, lo, lowest, fps, baseline)?;

    let vel = signals.hip_velocity.values();
    let event = |kind, anchor: usize, precise: f32| {
        Event::refined(kind, anchor, precise, refine::refinement_quality(anchor, precise))
    };
    Ok(vec![
        event(EventKind::StandingStart, onset, refine_onset(acc, onset, baseline)),
        event(EventKind::LowestPoint, lowest, refine::parabolic_vertex(hip, lowest)),
        event(EventKind::Takeoff, takeoff, refine::parabolic_vertex(vel, takeoff)),
        event(EventKind::Apex, apex, refine::parabolic_vertex(hip, apex)),
        event(EventKind::Landing, landing, refine::parabolic_vertex(vel, landing)),
    ])
}

/// Locate takeoff, apex, and landing anchors
///
/// Shared by the countermovement and squat-jump detectors; `takeoff_floor`
/// bounds how far back the takeoff search may walk (the squat-jump detector
/// pins it to the end of the hold window).
pub(crate) fn locate_flight(
    signals: &MotionSignals,
    takeoff_floor: usize,
    lo: usize,
    hi: usize,
    fps: f32,
    config: &AnalysisConfig,
    baseline: BaselineStats,
) -> Result<(usize, usize, usize), AnalysisError> {
    let vel = signals.hip_velocity.values();
    let acc = signals.hip_acceleration.values();

    let apex = signals
        .hip
        .argmax_in(lo..hi)
        .ok_or_else(|| AnalysisError::PhaseNotFound {
            event: EventKind::Apex,
            detail: "empty search range".to_string(),
        })?;

    // Takeoff: upward-velocity maximum before the apex
    let takeoff = signals
        .hip_velocity
        .argmax_in(takeoff_floor..apex)
        .ok_or_else(|| AnalysisError::PhaseNotFound {
            event: EventKind::Takeoff,
            detail: "apex at the start of the search range".to_string(),
        })?;
    if vel[takeoff] <= 0.0 {
        return Err(AnalysisError::PhaseNotFound {
            event: EventKind::Takeoff,
            detail: "no upward velocity before the apex".to_string(),
        });
    }

    // Landing: downward-velocity extremum after the apex
    let landing = signals
        .hip_velocity
        .argmin_in(apex + 1..hi)
        .ok_or_else(|| AnalysisError::PhaseNotFound {
            event: EventKind::Landing,
            detail: "no frames after the apex".to_string(),
        })?;
    if vel[landing] >= 0.0 {
        return Err(AnalysisError::PhaseNotFound {
            event: EventKind::Landing,
            detail: "no downward velocity after the apex".to_string(),
        });
    }

    let min_flight = (config.min_flight_seconds * fps).round() as usize;
    if landing.saturating_sub(takeoff) < min_flight {
        return Err(AnalysisError::PhaseNotFound {
            event: EventKind::Landing,
            detail: format!(
                "flight of {} frames shorter than the {}-frame minimum",
                landing.saturating_sub(takeoff),
                min_flight
            ),
        });
    }

    // Touchdown produces a deceleration spike well above the standing
    // baseline; without it the velocity minimum is just drift
    let spike_end = (landing + signals.half_window.max(3) + 1).min(signals.len());
    let spike = acc[landing..spike_end]
        .iter()
        .cloned()
        .fold(f32::NEG_INFINITY, f32::max);
    if spike <= baseline.mean + baseline.threshold {
        return Err(AnalysisError::PhaseNotFound {
            event: EventKind::Landing,
            detail: "no deceleration spike after touchdown".to_string(),
        });
    }

    Ok((takeoff, apex, landing))
}

/// Walk backward from the lowest point to the frame where acceleration last
/// exceeded the baseline threshold
fn find_movement_onset(
    acc: &[f32],
    floor: usize,
    lowest: usize,
    fps: f32,
    baseline: BaselineStats,
) -> Result<usize, AnalysisError> {
    let quiet_run = ((0.1 * fps).round() as usize).max(2);

    let mut run = 0usize;
    let mut run_top = 0usize;
    for f in (floor..lowest).rev() {
        if (acc[f] - baseline.mean).abs() <= baseline.threshold {
            if run == 0 {
                run_top = f;
            }
            run += 1;
            if run >= quiet_run {
                // First moving frame above the quiet block
                return Ok(run_top + 1);
            }
        } else {
            run = 0;
        }
    }

    Err(AnalysisError::PhaseNotFound {
        event: EventKind::StandingStart,
        detail: "no quiet standing window walking back from the lowest point".to_string(),
    })
}

/// Sub-frame onset: crossing of the baseline deviation through the threshold
fn refine_onset(acc: &[f32], onset: usize, baseline: BaselineStats) -> f32 {
    if onset == 0 || onset >= acc.len() {
        return onset as f32;
    }
    let before = (acc[onset - 1] - baseline.mean).abs();
    let after = (acc[onset] - baseline.mean).abs();
    match refine::crossing_fraction(before, after, baseline.threshold) {
        Some(fraction) => (onset - 1) as f32 + fraction,
        None => onset as f32,
    }
}
