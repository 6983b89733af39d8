//! Trajectory preprocessing modules
//!
//! This module turns raw per-frame landmark samples into analyzable signals:
//! - Composite signal aggregation (confidence-weighted landmark groups)
//! - Gap handling (short gaps interpolated, long gaps fatal)
//! - Tracking-quality scoring (feeds smoothing auto-tuning)

pub mod aggregation;
pub mod gaps;
pub mod quality;
