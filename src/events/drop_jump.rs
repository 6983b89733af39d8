//! Drop jump phase detection
//!
//! Forward search over the foot-height signal, following the jump's physical
//! script:
//! 1. Elevated plateau: sustained near-zero foot velocity at the start of
//!    the capture (athlete standing on the box)
//! 2. Drop onset: first downward velocity crossing after the plateau
//! 3. Contact start: foot velocity magnitude sustained below the contact
//!    threshold for the minimum contact duration
//! 4. Contact end: the inverse condition (takeoff into the rebound flight)
//! 5. Landing: the next sustained ground contact at ground level
//!
//! The start elevation must clearly exceed the ground-contact height. When
//! the two differ by less than 5%, the capture is indistinguishable from a
//! ground-level hop mislabeled as a drop jump, and detection fails
//! explicitly instead of guessing which phase was the drop.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::events::{self, refine, Event, EventKind};
use crate::signal::MotionSignals;

/// Minimum relative elevation of the starting plateau over the ground
const DROP_AMBIGUITY_FRACTION: f32 = 0.05;

/// Landing contact must happen near ground level; this fraction of the
/// drop span above the measured contact height excludes the rebound apex,
/// where foot velocity also dips through zero
const GROUND_BAND_FRACTION: f32 = 0.25;

/// Detect drop jump events
pub fn detect(
    signals: &MotionSignals,
    fps: f32,
    config: &AnalysisConfig,
) -> Result<Vec<Event>, AnalysisError> {
    let n = signals.len();
    let margin = signals.half_window;
    if n <= 2 * margin + 8 {
        return Err(AnalysisError::PhaseNotFound {
            event: EventKind::StandingStart,
            detail: format!(
                "{} frames leave no search range inside the filter margins",
                n
            ),
        });
    }
    let lo = margin;
    let hi = n - margin;

    let foot = signals.foot.values();
    let fvel = signals.foot_velocity.values();
    let threshold = config.contact_velocity_threshold;
    let plateau_frames = ((config.plateau_seconds * fps).round() as usize).max(3);
    let min_contact = ((config.min_contact_seconds * fps).round() as usize).max(2);
    let min_flight = (config.min_flight_seconds * fps).round() as usize;

    // 1. Elevated plateau from the very start of the usable range
    let mut plateau_end = lo;
    while plateau_end < hi && fvel[plateau_end].abs() < threshold {
        plateau_end += 1;
    }
    if plateau_end - lo < plateau_frames {
        return Err(AnalysisError::PhaseNotFound {
            event: EventKind::StandingStart,
            detail: format!(
                "capture does not start with a {}-frame stationary hold",
                plateau_frames
            ),
        });
    }
    let plateau_height = signals.foot.mean_in(lo..plateau_end);

    // 2. Drop onset: first downward crossing
    let drop_onset = (plateau_end..hi)
        .find(|&f| fvel[f] < -threshold)
        .ok_or_else(|| AnalysisError::PhaseNotFound {
            event: EventKind::DropOnset,
            detail: "no downward velocity after the elevated hold".to_string(),
        })?;

    // 3. First ground contact
    let contact_start = events::find_sustained(fvel, drop_onset..hi, min_contact, |v| {
        v.abs() < threshold
    })
    .ok_or_else(|| AnalysisError::PhaseNotFound {
        event: EventKind::ContactStart,
        detail: "no sustained ground contact after the drop".to_string(),
    })?;

    // 4. Contact end (takeoff into the rebound)
    let mut contact_end = contact_start;
    while contact_end < hi && fvel[contact_end].abs() < threshold {
        contact_end += 1;
    }
    if contact_end >= hi {
        return Err(AnalysisError::PhaseNotFound {
            event: EventKind::ContactEnd,
            detail: "ground contact never ends within the capture".to_string(),
        });
    }
    let contact_height = signals.foot.mean_in(contact_start..contact_end);

    // The drop must actually descend: a start elevation within 5% of the
    // contact height cannot be told apart from a ground-level hop
    let drop_span = plateau_height - contact_height;
    if drop_span <= DROP_AMBIGUITY_FRACTION * plateau_height.max(contact_height) {
        return Err(AnalysisError::PhaseNotFound {
            event: EventKind::DropOnset,
            detail: format!(
                "start elevation {:.3} within 5% of ground contact height {:.3}",
                plateau_height, contact_height
            ),
        });
    }

    // 5. Landing: next sustained contact at ground level. The height band
    // matters: foot velocity also dips through zero at the rebound apex.
    let ground_ceiling = contact_height + GROUND_BAND_FRACTION * drop_span;
    let landing = {
        let mut found = None;
        let mut run = 0usize;
        let mut run_start = 0usize;
        for f in contact_end..hi {
            if fvel[f].abs() < threshold && foot[f] <= ground_ceiling {
                if run == 0 {
                    run_start = f;
                }
                run += 1;
                if run >= min_contact {
                    found = Some(run_start);
                    break;
                }
            } else {
                run = 0;
            }
        }
        found.ok_or_else(|| AnalysisError::PhaseNotFound {
            event: EventKind::Landing,
            detail: "no ground contact after the rebound flight".to_string(),
        })?
    };
    if landing.saturating_sub(contact_end) < min_flight {
        return Err(AnalysisError::PhaseNotFound {
            event: EventKind::Landing,
            detail: format!(
                "rebound flight of {} frames shorter than the {}-frame minimum",
                landing.saturating_sub(contact_end),
                min_flight
            ),
        });
    }

    // 6. Rebound apex on the hip signal
    let apex = signals
        .hip
        .argmax_in(contact_end..landing)
        .ok_or_else(|| AnalysisError::PhaseNotFound {
            event: EventKind::Apex,
            detail: "empty rebound flight".to_string(),
        })?;

    let hip = signals.hip.values();
    let event = |kind, anchor: usize, precise: f32| {
        Event::refined(kind, anchor, precise, refine::refinement_quality(anchor, precise))
    };
    let magnitude_crossing = |anchor: usize| {
        let before = fvel[anchor - 1].abs();
        let after = fvel[anchor].abs();
        match refine::crossing_fraction(before, after, threshold) {
            Some(fraction) => (anchor - 1) as f32 + fraction,
            None => anchor as f32,
        }
    };

    Ok(vec![
        event(EventKind::StandingStart, lo, lo as f32),
        event(EventKind::DropOnset, drop_onset, refine::refine_crossing(fvel, drop_onset, -threshold)),
        event(EventKind::ContactStart, contact_start, magnitude_crossing(contact_start)),
        event(EventKind::ContactEnd, contact_end, magnitude_crossing(contact_end)),
        event(EventKind::Apex, apex, refine::parabolic_vertex(hip, apex)),
        event(EventKind::Landing, landing, magnitude_crossing(landing)),
    ])
}
