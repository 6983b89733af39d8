//! Cross-estimator calibration
//!
//! Different upstream pose estimators carry small systematic biases in when
//! they place the same biomechanical event: their position signals correlate
//! above 0.99, but velocity/acceleration micro-patterns near the true event
//! differ enough to shift detection by a frame or two in a consistent
//! direction. The calibration table holds those empirically measured
//! per-estimator, per-event frame offsets.
//!
//! The table is immutable after construction and passed by reference into
//! each analysis; there is no ambient global lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::events::{Event, EventKind};

/// Per-estimator, per-event-kind frame offsets
///
/// Configuration format: `{estimator_id: {event_kind: frame_offset}}`.
/// An offset of +2.0 means the estimator detects that event two frames late,
/// and the correction subtracts two frames from the refined fractional frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationTable {
    offsets: BTreeMap<String, BTreeMap<EventKind, f32>>,
}

impl CalibrationTable {
    /// Empty table (every lookup resolves to zero)
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the offsets measured for the estimators this project has
    /// validated against
    pub fn builtin() -> Self {
        Self::new()
            .with_offset("movenet_thunder", EventKind::Takeoff, 2.0)
            .with_offset("movenet_thunder", EventKind::Landing, 1.0)
            .with_offset("blazepose_lite", EventKind::Takeoff, 1.0)
    }

    /// Add or replace one offset (builder-style)
    pub fn with_offset(mut self, estimator: &str, kind: EventKind, frames: f32) -> Self {
        self.offsets
            .entry(estimator.to_string())
            .or_default()
            .insert(kind, frames);
        self
    }

    /// True if the estimator has any calibration entry
    pub fn knows_estimator(&self, estimator: &str) -> bool {
        self.offsets.contains_key(estimator)
    }

    /// Offset for one (estimator, event kind) pair; zero when unconfigured
    pub fn offset_for(&self, estimator: &str, kind: EventKind) -> f32 {
        self.offsets
            .get(estimator)
            .and_then(|by_kind| by_kind.get(&kind))
            .copied()
            .unwrap_or(0.0)
    }

    /// Apply calibration to a detected event set
    ///
    /// Subtracts each configured offset from the matching event's refined
    /// fractional frame; integer anchors are left untouched. An unrecognized
    /// estimator gets a zero offset everywhere and a warning, never an error:
    /// uncalibrated output is still useful output.
    pub fn apply(&self, estimator: &str, events: &mut [Event]) {
        if !self.knows_estimator(estimator) {
            log::warn!(
                "No calibration entries for estimator '{}'; applying zero offsets",
                estimator
            );
            return;
        }
        for event in events.iter_mut() {
            let offset = self.offset_for(estimator, event.kind);
            if offset != 0.0 {
                log::debug!(
                    "Calibrating {} by -{} frames for estimator '{}'",
                    event.kind.key(),
                    offset,
                    estimator
                );
                event.frame_precise -= offset;
            }
        }
    }
}
