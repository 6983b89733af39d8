//! Confidence-based gap handling
//!
//! Aggregation marks frames without a visible landmark as NaN gaps. Short
//! gaps are bridged by linear interpolation between the bracketing tracked
//! values (leading/trailing gaps are backfilled from the nearest tracked
//! value). A contiguous gap longer than the configured budget means the
//! trajectory cannot be trusted, and the analysis aborts with
//! `InsufficientTracking` naming the span.

use crate::error::AnalysisError;
use crate::signal::Trajectory;

/// Fill gaps in a trajectory
///
/// # Arguments
///
/// * `trajectory` - Aggregated signal with NaN gaps
/// * `max_gap_frames` - Longest contiguous gap that may be interpolated
///
/// # Returns
///
/// The gap-free trajectory and the number of frames that were filled.
///
/// # Errors
///
/// Returns `AnalysisError::InsufficientTracking` when any contiguous gap
/// exceeds `max_gap_frames`, or when the trajectory has no tracked frame at
/// all.
pub fn fill_gaps(
    trajectory: &Trajectory,
    max_gap_frames: usize,
) -> Result<(Trajectory, usize), AnalysisError> {
    let values = trajectory.values();
    let n = values.len();

    let untracked = |start: usize, end: usize| AnalysisError::InsufficientTracking {
        signal: trajectory.name().to_string(),
        start_frame: start,
        end_frame: end,
    };

    if n == 0 {
        return Err(untracked(0, 0));
    }

    let mut filled = values.to_vec();
    let mut filled_count = 0usize;

    let mut i = 0usize;
    while i < n {
        if filled[i].is_finite() {
            i += 1;
            continue;
        }

        // Extent of this gap
        let gap_start = i;
        let mut gap_end = i;
        while gap_end + 1 < n && !filled[gap_end + 1].is_finite() {
            gap_end += 1;
        }
        let gap_len = gap_end - gap_start + 1;

        if gap_len > max_gap_frames {
            return Err(untracked(gap_start, gap_end));
        }

        let before = gap_start.checked_sub(1).map(|j| filled[j]);
        let after = if gap_end + 1 < n {
            Some(filled[gap_end + 1])
        } else {
            None
        };

        match (before, after) {
            (Some(b), Some(a)) => {
                // Interior gap: linear interpolation
                let span = (gap_len + 1) as f32;
                for (k, j) in (gap_start..=gap_end).enumerate() {
                    let t = (k + 1) as f32 / span;
                    filled[j] = b + (a - b) * t;
                }
            }
            (Some(b), None) => {
                // Trailing gap: hold the last tracked value
                for j in gap_start..=gap_end {
                    filled[j] = b;
                }
            }
            (None, Some(a)) => {
                // Leading gap: backfill from the first tracked value
                for j in gap_start..=gap_end {
                    filled[j] = a;
                }
            }
            (None, None) => {
                // No tracked frame anywhere
                return Err(untracked(0, n - 1));
            }
        }

        filled_count += gap_len;
        i = gap_end + 1;
    }

    if filled_count > 0 {
        log::debug!(
            "Filled {} gap frames in '{}' ({} total frames)",
            filled_count,
            trajectory.name(),
            n
        );
    }

    Ok((Trajectory::new(trajectory.name().to_string(), filled), filled_count))
}
