//! Performance metrics calculation
//!
//! Pure arithmetic over calibrated event frames, the frame rate, and the
//! optional physical calibration reference. Every metric is a tagged
//! outcome: a computed value, or an explicit "unimplemented" marker when its
//! prerequisites are missing. A metric is never fabricated; partial results
//! stay usable alongside the markers.
//!
//! Position-derived metrics need a meters-per-height-unit scale:
//! - Drop jumps take it from the known drop height against the measured
//!   plateau-to-ground span
//! - Countermovement and squat jumps derive it from ballistic
//!   self-calibration: the kinematic jump height (g·t²/8) against the
//!   hip's measured apex rise

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisRequest;
use crate::error::AnalysisError;
use crate::events::{find_event, Event, EventKind, JumpType};
use crate::signal::MotionSignals;

/// Standard gravity in m/s²
pub const GRAVITY_M_S2: f32 = 9.80665;

/// Degenerate position spans below this many height units cannot anchor a
/// physical scale
const MIN_SCALE_SPAN: f32 = 1e-3;

/// Tagged per-metric result
///
/// Serializes untagged: implemented metrics appear as plain numbers in the
/// output map, unimplemented ones as their reason string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricOutcome {
    /// Computed value
    Value(f32),
    /// Prerequisites missing; carries the reason
    Unimplemented(String),
}

impl MetricOutcome {
    /// The computed value, if any
    pub fn value(&self) -> Option<f32> {
        match self {
            MetricOutcome::Value(v) => Some(*v),
            MetricOutcome::Unimplemented(_) => None,
        }
    }
}

/// Metric name to outcome map (ordered for deterministic serialization)
pub type MetricMap = BTreeMap<String, MetricOutcome>;

/// Compute all metrics for a detected, calibrated event set
///
/// # Errors
///
/// Returns `AnalysisError::PhaseNotFound` if an event the jump type
/// guarantees is absent (the ordering check makes this unreachable in the
/// normal pipeline) and `AnalysisError::NumericalError` for non-finite
/// intermediate values.
pub fn compute_metrics(
    events: &[Event],
    signals: &MotionSignals,
    request: &AnalysisRequest,
) -> Result<MetricMap, AnalysisError> {
    let mut map = MetricMap::new();
    let fps = request.fps;

    for event in events {
        map.insert(
            format!("{}_frame", event.kind.key()),
            MetricOutcome::Value(event.frame as f32),
        );
        map.insert(
            format!("{}_frame_precise", event.kind.key()),
            MetricOutcome::Value(event.frame_precise),
        );
    }

    match request.jump_type {
        JumpType::Countermovement => countermovement_metrics(&mut map, events, signals, fps)?,
        JumpType::SquatJump => squat_jump_metrics(&mut map, events, signals, fps)?,
        JumpType::DropJump => drop_jump_metrics(&mut map, events, signals, request)?,
    }

    map.insert(
        "peak_power_w_kg".to_string(),
        MetricOutcome::Unimplemented(
            "requires athlete body mass, which no upstream collaborator supplies".to_string(),
        ),
    );

    for (name, outcome) in &map {
        if let Some(value) = outcome.value() {
            if !value.is_finite() {
                return Err(AnalysisError::NumericalError(format!(
                    "metric '{}' is not finite",
                    name
                )));
            }
        }
    }

    log::debug!("Computed {} metric entries", map.len());
    Ok(map)
}

fn require(events: &[Event], kind: EventKind) -> Result<&Event, AnalysisError> {
    find_event(events, kind).ok_or_else(|| AnalysisError::PhaseNotFound {
        event: kind,
        detail: "missing from detector output".to_string(),
    })
}

fn insert(map: &mut MetricMap, name: &str, value: f32) {
    map.insert(name.to_string(), MetricOutcome::Value(value));
}

fn insert_scaled(map: &mut MetricMap, name: &str, units: f32, scale: Option<f32>) {
    match scale {
        Some(scale) => insert(map, name, units * scale),
        None => {
            map.insert(
                name.to_string(),
                MetricOutcome::Unimplemented(
                    "no physical scale reference available".to_string(),
                ),
            );
        }
    }
}

/// Flight time in seconds and the kinematic jump height g·t²/8
fn flight_kinematics(takeoff: &Event, landing: &Event, fps: f32) -> (f32, f32) {
    let flight_s = (landing.frame_precise - takeoff.frame_precise) / fps;
    let height_m = GRAVITY_M_S2 * flight_s * flight_s / 8.0;
    (flight_s, height_m)
}

/// Meters-per-height-unit from ballistic self-calibration
fn self_scale(signals: &MotionSignals, takeoff: &Event, apex: &Event, kinematic_m: f32) -> Option<f32> {
    let rise = signals.hip.get(apex.frame) - signals.hip.get(takeoff.frame);
    if rise > MIN_SCALE_SPAN && kinematic_m > 0.0 {
        Some(kinematic_m / rise)
    } else {
        None
    }
}

fn countermovement_metrics(
    map: &mut MetricMap,
    events: &[Event],
    signals: &MotionSignals,
    fps: f32,
) -> Result<(), AnalysisError> {
    let onset = require(events, EventKind::StandingStart)?;
    let lowest = require(events, EventKind::LowestPoint)?;
    let takeoff = require(events, EventKind::Takeoff)?;
    let apex = require(events, EventKind::Apex)?;
    let landing = require(events, EventKind::Landing)?;

    let (flight_s, kinematic_m) = flight_kinematics(takeoff, landing, fps);
    insert(map, "flight_time_ms", flight_s * 1000.0);
    insert(map, "jump_height_kinematic_m", kinematic_m);
    insert(map, "jump_height_m", kinematic_m);

    insert(
        map,
        "eccentric_duration_ms",
        (lowest.frame_precise - onset.frame_precise) / fps * 1000.0,
    );
    insert(
        map,
        "concentric_duration_ms",
        (takeoff.frame_precise - lowest.frame_precise) / fps * 1000.0,
    );

    let scale = self_scale(signals, takeoff, apex, kinematic_m);

    let depth_units = signals.hip.get(onset.frame) - signals.hip.get(lowest.frame);
    insert_scaled(map, "countermovement_depth_m", depth_units, scale);

    let vel = &signals.hip_velocity;
    let concentric_peak = vel
        .argmax_in(lowest.frame..takeoff.frame + 1)
        .map(|i| vel.get(i))
        .unwrap_or(0.0);
    insert_scaled(map, "peak_concentric_velocity_m_s", concentric_peak, scale);

    let eccentric_peak = vel
        .argmin_in(onset.frame..lowest.frame + 1)
        .map(|i| -vel.get(i))
        .unwrap_or(0.0);
    insert_scaled(map, "peak_eccentric_velocity_m_s", eccentric_peak, scale);

    Ok(())
}

fn squat_jump_metrics(
    map: &mut MetricMap,
    events: &[Event],
    signals: &MotionSignals,
    fps: f32,
) -> Result<(), AnalysisError> {
    let onset = require(events, EventKind::StandingStart)?;
    let takeoff = require(events, EventKind::Takeoff)?;
    let apex = require(events, EventKind::Apex)?;
    let landing = require(events, EventKind::Landing)?;

    let (flight_s, kinematic_m) = flight_kinematics(takeoff, landing, fps);
    insert(map, "flight_time_ms", flight_s * 1000.0);
    insert(map, "jump_height_kinematic_m", kinematic_m);
    insert(map, "jump_height_m", kinematic_m);
    insert(
        map,
        "concentric_duration_ms",
        (takeoff.frame_precise - onset.frame_precise) / fps * 1000.0,
    );

    let scale = self_scale(signals, takeoff, apex, kinematic_m);
    let vel = &signals.hip_velocity;
    let concentric_peak = vel
        .argmax_in(onset.frame..takeoff.frame + 1)
        .map(|i| vel.get(i))
        .unwrap_or(0.0);
    insert_scaled(map, "peak_concentric_velocity_m_s", concentric_peak, scale);

    Ok(())
}

fn drop_jump_metrics(
    map: &mut MetricMap,
    events: &[Event],
    signals: &MotionSignals,
    request: &AnalysisRequest,
) -> Result<(), AnalysisError> {
    let fps = request.fps;
    let standing = require(events, EventKind::StandingStart)?;
    let drop_onset = require(events, EventKind::DropOnset)?;
    let contact_start = require(events, EventKind::ContactStart)?;
    let contact_end = require(events, EventKind::ContactEnd)?;
    let apex = require(events, EventKind::Apex)?;
    let landing = require(events, EventKind::Landing)?;

    let contact_s = (contact_end.frame_precise - contact_start.frame_precise) / fps;
    insert(map, "ground_contact_time_ms", contact_s * 1000.0);

    let (flight_s, kinematic_m) = flight_kinematics(contact_end, landing, fps);
    insert(map, "flight_time_ms", flight_s * 1000.0);
    insert(map, "jump_height_kinematic_m", kinematic_m);

    // Physical scale from the known drop height, when supplied. The
    // position-based jump height is preferred over the kinematic estimate
    // whenever that reference exists.
    let reference_scale = request.reference_height_m.and_then(|reference_m| {
        let plateau = signals.foot.mean_in(standing.frame..drop_onset.frame);
        let ground = signals.foot.mean_in(contact_start.frame..contact_end.frame);
        let span = plateau - ground;
        if span > MIN_SCALE_SPAN && reference_m > 0.0 {
            Some(reference_m / span)
        } else {
            None
        }
    });

    let jump_height_m = match reference_scale {
        Some(scale) => {
            let rise = signals.hip.get(apex.frame) - signals.hip.get(contact_end.frame);
            rise * scale
        }
        None => kinematic_m,
    };
    insert(map, "jump_height_m", jump_height_m);

    if contact_s > 0.0 {
        insert(map, "reactive_strength_index", jump_height_m / contact_s);
    } else {
        map.insert(
            "reactive_strength_index".to_string(),
            MetricOutcome::Unimplemented("zero-length ground contact".to_string()),
        );
    }

    Ok(())
}
