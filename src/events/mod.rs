//! Biomechanical event detection
//!
//! Per-jump-type state machines that walk the smoothed motion signals and
//! locate event frames:
//! - Countermovement jump (backward search anchored at the flight apex)
//! - Drop jump (forward search through drop, contact, and rebound)
//! - Squat jump (static hold, then the countermovement flight logic)
//!
//! Detected events are refined to sub-frame precision (`refine`) and shifted
//! by per-estimator calibration offsets (`calibration`).

pub mod calibration;
pub mod countermovement;
pub mod drop_jump;
pub mod refine;
pub mod squat_jump;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::signal::MotionSignals;

/// Closed set of detectable event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// First frame of movement out of the standing (or held) start
    StandingStart,
    /// First downward motion off the elevated start (drop jump)
    DropOnset,
    /// Feet make ground contact (drop jump bounce)
    ContactStart,
    /// Feet leave the ground ending the bounce contact (drop jump takeoff)
    ContactEnd,
    /// Deepest point of the countermovement
    LowestPoint,
    /// Feet leave the ground (vertical ground-reaction force reaches zero)
    Takeoff,
    /// Highest point of the flight
    Apex,
    /// Feet regain ground contact after flight
    Landing,
}

impl EventKind {
    /// Stable snake_case key, used in metric names and log output
    pub fn key(self) -> &'static str {
        match self {
            EventKind::StandingStart => "standing_start",
            EventKind::DropOnset => "drop_onset",
            EventKind::ContactStart => "contact_start",
            EventKind::ContactEnd => "contact_end",
            EventKind::LowestPoint => "lowest_point",
            EventKind::Takeoff => "takeoff",
            EventKind::Apex => "apex",
            EventKind::Landing => "landing",
        }
    }
}

/// Jump type under analysis
///
/// A closed sum type dispatched through a single `match`; each variant's
/// detector carries its own frame-rate-normalized parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JumpType {
    /// Standing start, squat down, jump, land
    Countermovement,
    /// Squat hold, then jump without a countermovement
    SquatJump,
    /// Elevated start, drop, single ground contact, rebound jump
    DropJump,
}

impl JumpType {
    /// Stable snake_case key for logs and metadata
    pub fn key(self) -> &'static str {
        match self {
            JumpType::Countermovement => "countermovement",
            JumpType::SquatJump => "squat_jump",
            JumpType::DropJump => "drop_jump",
        }
    }

    /// The strict temporal ordering every detection must satisfy
    pub fn required_order(self) -> &'static [EventKind] {
        match self {
            JumpType::Countermovement => &[
                EventKind::StandingStart,
                EventKind::LowestPoint,
                EventKind::Takeoff,
                EventKind::Apex,
                EventKind::Landing,
            ],
            JumpType::SquatJump => &[
                EventKind::StandingStart,
                EventKind::Takeoff,
                EventKind::Apex,
                EventKind::Landing,
            ],
            JumpType::DropJump => &[
                EventKind::StandingStart,
                EventKind::DropOnset,
                EventKind::ContactStart,
                EventKind::ContactEnd,
                EventKind::Apex,
                EventKind::Landing,
            ],
        }
    }
}

/// A detected instant in time
///
/// `frame` is the integer anchor the detector located; `frame_precise` is the
/// sub-frame refinement (within ±1.0 of the anchor), later shifted by the
/// per-estimator calibration offset. `quality` drops below 1.0 when the
/// refinement had to fall back to the raw anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// What happened
    pub kind: EventKind,
    /// Integer anchor frame
    pub frame: usize,
    /// Refined fractional frame (calibrated)
    pub frame_precise: f32,
    /// Detection quality (0.0-1.0)
    pub quality: f32,
}

impl Event {
    /// Create an event with an unrefined fractional frame
    pub fn at(kind: EventKind, frame: usize) -> Self {
        Self {
            kind,
            frame,
            frame_precise: frame as f32,
            quality: 1.0,
        }
    }

    /// Create an event with an already-refined fractional frame
    pub fn refined(kind: EventKind, frame: usize, frame_precise: f32, quality: f32) -> Self {
        Self {
            kind,
            frame,
            frame_precise,
            quality,
        }
    }
}

/// Find an event by kind
pub fn find_event(events: &[Event], kind: EventKind) -> Option<&Event> {
    events.iter().find(|e| e.kind == kind)
}

/// Detect all events for the given jump type
///
/// Dispatches to the jump type's state machine and enforces the temporal
/// ordering invariant on the result. Any unsatisfied search condition or
/// ordering violation is a `PhaseNotFound` error; the detectors never return
/// a guessed frame.
pub fn detect_events(
    signals: &MotionSignals,
    fps: f32,
    jump_type: JumpType,
    config: &AnalysisConfig,
) -> Result<Vec<Event>, AnalysisError> {
    log::debug!(
        "Detecting {} events over {} frames at {} fps",
        jump_type.key(),
        signals.len(),
        fps
    );

    let events = match jump_type {
        JumpType::Countermovement => countermovement::detect(signals, fps, config)?,
        JumpType::SquatJump => squat_jump::detect(signals, fps, config)?,
        JumpType::DropJump => drop_jump::detect(signals, fps, config)?,
    };

    enforce_ordering(jump_type, &events)?;

    log::debug!(
        "Detected events: {}",
        events
            .iter()
            .map(|e| format!("{}@{}", e.kind.key(), e.frame))
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(events)
}

/// Check the jump type's strict temporal ordering
///
/// A violated ordering means detection latched onto the wrong feature; the
/// result would be meaningless, so it is rejected rather than passed on.
pub fn enforce_ordering(jump_type: JumpType, events: &[Event]) -> Result<(), AnalysisError> {
    let mut previous: Option<&Event> = None;
    for &kind in jump_type.required_order() {
        let event = find_event(events, kind).ok_or_else(|| AnalysisError::PhaseNotFound {
            event: kind,
            detail: "missing from detector output".to_string(),
        })?;
        if let Some(prev) = previous {
            if event.frame <= prev.frame {
                return Err(AnalysisError::PhaseNotFound {
                    event: kind,
                    detail: format!(
                        "detected at frame {} out of order after {} at frame {}",
                        event.frame,
                        prev.kind.key(),
                        prev.frame
                    ),
                });
            }
        }
        previous = Some(event);
    }
    Ok(())
}

/// First index in `range` starting a run of at least `min_run` frames for
/// which `predicate` holds
pub(crate) fn find_sustained(
    values: &[f32],
    range: std::ops::Range<usize>,
    min_run: usize,
    predicate: impl Fn(f32) -> bool,
) -> Option<usize> {
    let mut run_start = None;
    let mut run_len = 0usize;
    for i in range {
        if predicate(values[i]) {
            if run_len == 0 {
                run_start = Some(i);
            }
            run_len += 1;
            if run_len >= min_run {
                return run_start;
            }
        } else {
            run_len = 0;
            run_start = None;
        }
    }
    None
}

/// Mean and standard deviation of a slice
pub(crate) fn mean_std(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / values.len() as f32;
    (mean, variance.sqrt())
}
