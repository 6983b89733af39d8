//! Landmark vocabulary and per-frame samples
//!
//! The upstream pose estimator emits one set of 2D landmarks per video frame,
//! normalized to [0, 1] image coordinates with y growing downward. This module
//! pins that interface down as a closed vocabulary: a fixed [`Landmark`] enum
//! instead of an open string map, with explicit missing/low-confidence
//! semantics per landmark.

use serde::{Deserialize, Serialize};

/// Number of landmarks in the closed vocabulary
pub const LANDMARK_COUNT: usize = 13;

/// Closed set of anatomical landmarks used by jump analysis
///
/// Names follow the MediaPipe Pose vocabulary for the subset of points the
/// engine consumes. The discriminant doubles as the storage index inside a
/// [`FrameSample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Landmark {
    /// Nose tip
    Nose,
    /// Left shoulder
    LeftShoulder,
    /// Right shoulder
    RightShoulder,
    /// Left hip
    LeftHip,
    /// Right hip
    RightHip,
    /// Left knee
    LeftKnee,
    /// Right knee
    RightKnee,
    /// Left ankle
    LeftAnkle,
    /// Right ankle
    RightAnkle,
    /// Left heel
    LeftHeel,
    /// Right heel
    RightHeel,
    /// Left foot tip (toe)
    LeftFootIndex,
    /// Right foot tip (toe)
    RightFootIndex,
}

impl Landmark {
    /// All landmarks in storage order
    pub const ALL: [Landmark; LANDMARK_COUNT] = [
        Landmark::Nose,
        Landmark::LeftShoulder,
        Landmark::RightShoulder,
        Landmark::LeftHip,
        Landmark::RightHip,
        Landmark::LeftKnee,
        Landmark::RightKnee,
        Landmark::LeftAnkle,
        Landmark::RightAnkle,
        Landmark::LeftHeel,
        Landmark::RightHeel,
        Landmark::LeftFootIndex,
        Landmark::RightFootIndex,
    ];

    /// Storage index of this landmark inside a [`FrameSample`]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One detected landmark position with its detection confidence
///
/// Coordinates are normalized to [0, 1] image space; `y` grows downward
/// (image convention), so smaller `y` means physically higher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    /// Horizontal position, normalized [0, 1]
    pub x: f32,
    /// Vertical position, normalized [0, 1], down-positive
    pub y: f32,
    /// Detection confidence (0.0-1.0)
    pub confidence: f32,
}

impl LandmarkPoint {
    /// Create a new landmark point
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// True if the point clears the given visibility threshold
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

/// One video frame's worth of landmark data
///
/// Immutable once captured: the engine never writes back into a sample.
/// Absent landmarks are `None`, which is distinct from a low-confidence
/// detection at (0, 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    points: [Option<LandmarkPoint>; LANDMARK_COUNT],
}

impl FrameSample {
    /// Create an empty sample (all landmarks missing)
    pub fn empty() -> Self {
        Self {
            points: [None; LANDMARK_COUNT],
        }
    }

    /// Create a sample from explicit (landmark, point) pairs
    pub fn from_points(points: &[(Landmark, LandmarkPoint)]) -> Self {
        let mut sample = Self::empty();
        for (landmark, point) in points {
            sample.points[landmark.index()] = Some(*point);
        }
        sample
    }

    /// Look up one landmark
    pub fn get(&self, landmark: Landmark) -> Option<LandmarkPoint> {
        self.points[landmark.index()]
    }

    /// Set one landmark (builder-style, used when assembling test fixtures
    /// and by adapter layers that fill samples incrementally)
    pub fn with(mut self, landmark: Landmark, point: LandmarkPoint) -> Self {
        self.points[landmark.index()] = Some(point);
        self
    }

    /// Mean confidence over the landmarks present in this sample
    ///
    /// Returns 0.0 for an empty sample.
    pub fn mean_confidence(&self) -> f32 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for point in self.points.iter().flatten() {
            sum += point.confidence;
            count += 1;
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }
}

impl Default for FrameSample {
    fn default() -> Self {
        Self::empty()
    }
}
