//! Metrics and result aggregation modules
//!
//! Converts calibrated events into named physical metrics, checks them
//! against tiered physiological bounds, and assembles the final result:
//! - Metrics calculation (per-metric tagged outcomes)
//! - Physiological validation (pass/warn/fail report)
//! - Result and metadata types

pub mod metrics;
pub mod result;
pub mod validation;
