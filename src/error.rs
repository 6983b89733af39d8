//! Error types for the jump analysis engine

use std::fmt;

use crate::events::EventKind;

/// Errors that can occur during jump analysis
///
/// Detection failures are fatal to the whole analysis: a partial event set is
/// not meaningful, so the pipeline aborts with the first error it hits.
/// Validation findings (implausible metric values) are never errors; they are
/// collected into the validation report instead.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid input parameters (malformed configuration, bad filter setup)
    InvalidInput(String),

    /// Landmark visibility too low over a required span
    ///
    /// Also raised for an empty frame sequence or a non-positive frame rate,
    /// since both mean there is no usable trajectory to analyze.
    InsufficientTracking {
        /// Name of the derived signal that lost tracking
        signal: String,
        /// First frame of the untracked span
        start_frame: usize,
        /// Last frame of the untracked span (inclusive)
        end_frame: usize,
    },

    /// A required biomechanical event could not be located
    PhaseNotFound {
        /// The event kind the detector failed to find
        event: EventKind,
        /// What the detector was looking for when it gave up
        detail: String,
    },

    /// Numerical error (non-finite value escaped a fitting step)
    NumericalError(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::InsufficientTracking {
                signal,
                start_frame,
                end_frame,
            } => write!(
                f,
                "Insufficient tracking for '{}' over frames {}..={}",
                signal, start_frame, end_frame
            ),
            AnalysisError::PhaseNotFound { event, detail } => {
                write!(f, "Phase not found ({}): {}", event.key(), detail)
            }
            AnalysisError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}
