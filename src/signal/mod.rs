//! Signal types and the smoothing/derivative engine
//!
//! Derived scalar signals (one value per video frame) and the local
//! polynomial regression filter that turns a noisy position trajectory into
//! smooth position, velocity, and acceleration estimates.

pub mod savgol;

/// A named per-frame scalar signal
///
/// Index i corresponds to `FrameSample` i; the length always equals the total
/// frame count. Trajectories are derived, never mutated in place: every
/// transform (aggregation, smoothing, differentiation) produces a new one.
///
/// Position trajectories are expressed as *heights* (`1.0 - y` in normalized
/// image coordinates), so upward motion is positive and velocity and
/// acceleration carry their physical signs.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    name: String,
    values: Vec<f32>,
}

impl Trajectory {
    /// Create a trajectory from a name and per-frame values
    pub fn new(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Signal name (e.g., "hip_height")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-frame values
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the trajectory holds no frames
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at frame i
    pub fn get(&self, i: usize) -> f32 {
        self.values[i]
    }

    /// Index of the maximum value within `range` (None for an empty range)
    pub fn argmax_in(&self, range: std::ops::Range<usize>) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for i in range {
            let v = self.values[i];
            match best {
                Some((_, bv)) if bv >= v => {}
                _ => best = Some((i, v)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Index of the minimum value within `range` (None for an empty range)
    pub fn argmin_in(&self, range: std::ops::Range<usize>) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for i in range {
            let v = self.values[i];
            match best {
                Some((_, bv)) if bv <= v => {}
                _ => best = Some((i, v)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Mean value over `range` (0.0 for an empty range)
    pub fn mean_in(&self, range: std::ops::Range<usize>) -> f32 {
        let len = range.len();
        if len == 0 {
            return 0.0;
        }
        self.values[range].iter().sum::<f32>() / len as f32
    }
}

/// The smoothed signal bundle the phase detectors walk
///
/// Hip height carries the whole-body vertical motion (apex, countermovement,
/// takeoff/landing velocity extrema); foot height carries ground-contact
/// information (contact windows, drop plateau).
#[derive(Debug, Clone)]
pub struct MotionSignals {
    /// Smoothed hip height
    pub hip: Trajectory,
    /// Hip vertical velocity (height units per second)
    pub hip_velocity: Trajectory,
    /// Hip vertical acceleration (height units per second squared)
    pub hip_acceleration: Trajectory,
    /// Smoothed foot height
    pub foot: Trajectory,
    /// Foot vertical velocity (height units per second)
    pub foot_velocity: Trajectory,
    /// Half-window of the smoothing filter that produced these signals
    ///
    /// Estimates within this many frames of either boundary come from
    /// reduced-order fits; detectors clamp their search ranges away from
    /// them instead of trusting them.
    pub half_window: usize,
}

impl MotionSignals {
    /// Number of frames (shared by every member trajectory)
    pub fn len(&self) -> usize {
        self.hip.len()
    }

    /// True if the bundle holds no frames
    pub fn is_empty(&self) -> bool {
        self.hip.is_empty()
    }
}
