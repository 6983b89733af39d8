//! Physiological validation
//!
//! Every computed metric with a registered bounds entry is classified
//! against a tiered range set:
//! - Outside the absolute bounds (limits inclusive): ERROR, physiologically
//!   impossible, the detection latched onto something wrong
//! - Inside absolute bounds but outside the selected tier: WARNING naming
//!   the tier the value was expected in
//! - Inside the tier: PASS
//!
//! Demographic context (sex, training level) selects a narrower tier; with
//! no context the population-wide practical range applies. The validator
//! only reads the metrics; it never mutates or suppresses them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::metrics::{MetricMap, MetricOutcome};

/// Athlete sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    /// Female
    Female,
    /// Male
    Male,
}

/// Athlete training level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingLevel {
    /// Untrained or casually active
    Recreational,
    /// Regularly training
    Trained,
    /// Competitive/elite
    Elite,
}

/// Optional demographic context for tier selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    /// Athlete sex
    pub sex: Option<Sex>,
    /// Age in years (reserved: no age-specific tiers are registered yet)
    pub age: Option<u32>,
    /// Training level
    pub training_level: Option<TrainingLevel>,
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Physiologically impossible value
    Error,
    /// Implausible for the selected tier
    Warning,
    /// Informational (e.g., a metric that could not be computed)
    Info,
}

/// Overall validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    /// Every checked metric within its tier
    Pass,
    /// No errors, but at least one tier warning
    PassWithWarnings,
    /// At least one physiologically impossible value
    Fail,
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Metric the finding refers to
    pub metric: String,
    /// Severity of the finding
    pub severity: Severity,
    /// Human-readable explanation
    pub message: String,
}

/// Validation report: overall status plus per-metric findings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Aggregated status
    pub status: ValidationStatus,
    /// Individual findings (empty on a clean pass)
    pub issues: Vec<ValidationIssue>,
}

/// A demographic sub-band of a metric's plausible range
///
/// A band applies when every constraint it carries matches the athlete
/// profile. Bands are checked in registration order; register the most
/// specific ones first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierBand {
    /// Tier name used in warning messages
    pub label: String,
    /// Required sex, if the band is sex-specific
    pub sex: Option<Sex>,
    /// Required training level, if the band is level-specific
    pub level: Option<TrainingLevel>,
    /// Lower tier limit
    pub min: f32,
    /// Upper tier limit
    pub max: f32,
}

/// Tiered range descriptor for one metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricBounds {
    /// Below/at this value is physiologically impossible
    pub absolute_min: f32,
    /// Above/at this value is physiologically impossible
    pub absolute_max: f32,
    /// Population-wide plausible minimum
    pub practical_min: f32,
    /// Population-wide plausible maximum
    pub practical_max: f32,
    /// Demographic sub-bands, most specific first
    pub tiers: Vec<TierBand>,
}

impl MetricBounds {
    /// Create bounds with no demographic tiers
    pub fn new(
        absolute_min: f32,
        absolute_max: f32,
        practical_min: f32,
        practical_max: f32,
    ) -> Self {
        Self {
            absolute_min,
            absolute_max,
            practical_min,
            practical_max,
            tiers: Vec::new(),
        }
    }

    /// Add a demographic tier (builder-style)
    pub fn with_tier(
        mut self,
        label: &str,
        sex: Option<Sex>,
        level: Option<TrainingLevel>,
        min: f32,
        max: f32,
    ) -> Self {
        self.tiers.push(TierBand {
            label: label.to_string(),
            sex,
            level,
            min,
            max,
        });
        self
    }

    /// Select the narrowest applicable tier for the profile
    ///
    /// Returns (label, min, max); defaults to the population-wide practical
    /// range when no band matches or no profile is given.
    pub fn select_tier(&self, profile: Option<&AthleteProfile>) -> (&str, f32, f32) {
        if let Some(profile) = profile {
            for band in &self.tiers {
                let sex_matches = match band.sex {
                    Some(required) => profile.sex == Some(required),
                    None => true,
                };
                let level_matches = match band.level {
                    Some(required) => profile.training_level == Some(required),
                    None => true,
                };
                if sex_matches && level_matches {
                    return (&band.label, band.min, band.max);
                }
            }
        }
        ("general population", self.practical_min, self.practical_max)
    }

    /// Classify one value against these bounds
    pub fn classify(&self, metric: &str, value: f32, profile: Option<&AthleteProfile>) -> Option<ValidationIssue> {
        if !value.is_finite() || value <= self.absolute_min || value >= self.absolute_max {
            return Some(ValidationIssue {
                metric: metric.to_string(),
                severity: Severity::Error,
                message: format!(
                    "{} = {:.3} is physiologically impossible (plausible range {:.3}..{:.3})",
                    metric, value, self.absolute_min, self.absolute_max
                ),
            });
        }

        let (label, tier_min, tier_max) = self.select_tier(profile);
        if value < tier_min || value > tier_max {
            return Some(ValidationIssue {
                metric: metric.to_string(),
                severity: Severity::Warning,
                message: format!(
                    "{} = {:.3} outside the expected {:.3}..{:.3} range for {}",
                    metric, value, tier_min, tier_max, label
                ),
            });
        }

        None
    }
}

/// Registry of bounds by metric key
///
/// Constructed once at process start and passed by reference into every
/// analysis; never mutated afterwards. Metrics without an entry (frame
/// indices, for instance) are not checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundsRegistry {
    entries: BTreeMap<String, MetricBounds>,
}

impl BoundsRegistry {
    /// Empty registry (nothing gets checked)
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register or replace bounds for a metric (builder-style)
    pub fn with_bounds(mut self, metric: &str, bounds: MetricBounds) -> Self {
        self.entries.insert(metric.to_string(), bounds);
        self
    }

    /// Bounds for a metric key
    pub fn get(&self, metric: &str) -> Option<&MetricBounds> {
        self.entries.get(metric)
    }

    /// Registry with the ranges this project has validated against
    ///
    /// Absolute limits bracket what a human body can produce at all;
    /// practical ranges cover the broad athletic population; elite and
    /// recreational tiers narrow them where the sports-science literature
    /// supports it.
    pub fn builtin() -> Self {
        Self::empty()
            .with_bounds(
                "jump_height_m",
                MetricBounds::new(0.01, 1.50, 0.08, 0.80)
                    .with_tier("elite female athletes", Some(Sex::Female), Some(TrainingLevel::Elite), 0.25, 0.70)
                    .with_tier("elite male athletes", Some(Sex::Male), Some(TrainingLevel::Elite), 0.35, 0.85)
                    .with_tier("elite athletes", None, Some(TrainingLevel::Elite), 0.30, 0.85)
                    .with_tier("recreational athletes", None, Some(TrainingLevel::Recreational), 0.10, 0.55),
            )
            .with_bounds(
                "jump_height_kinematic_m",
                MetricBounds::new(0.01, 1.50, 0.08, 0.80)
                    .with_tier("elite athletes", None, Some(TrainingLevel::Elite), 0.30, 0.85)
                    .with_tier("recreational athletes", None, Some(TrainingLevel::Recreational), 0.10, 0.55),
            )
            .with_bounds("flight_time_ms", MetricBounds::new(100.0, 1200.0, 200.0, 900.0))
            .with_bounds(
                "ground_contact_time_ms",
                MetricBounds::new(60.0, 2000.0, 120.0, 700.0)
                    .with_tier("elite athletes", None, Some(TrainingLevel::Elite), 120.0, 300.0),
            )
            .with_bounds(
                "reactive_strength_index",
                MetricBounds::new(0.05, 5.0, 0.3, 3.5)
                    .with_tier("elite athletes", None, Some(TrainingLevel::Elite), 1.5, 3.5),
            )
            .with_bounds(
                "countermovement_depth_m",
                MetricBounds::new(0.02, 1.0, 0.10, 0.60),
            )
            .with_bounds(
                "peak_concentric_velocity_m_s",
                MetricBounds::new(0.3, 6.0, 1.2, 4.5),
            )
            .with_bounds(
                "peak_eccentric_velocity_m_s",
                MetricBounds::new(0.05, 4.0, 0.3, 2.5),
            )
            .with_bounds(
                "eccentric_duration_ms",
                MetricBounds::new(50.0, 3000.0, 150.0, 1200.0),
            )
            .with_bounds(
                "concentric_duration_ms",
                MetricBounds::new(50.0, 2000.0, 120.0, 600.0),
            )
    }
}

impl Default for BoundsRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Validate a metric map against the registry
///
/// Computed values are classified against their bounds; metrics that could
/// not be computed surface as INFO issues. Overall status precedence: any
/// ERROR means FAIL, otherwise any WARNING means PASS_WITH_WARNINGS,
/// otherwise PASS.
pub fn validate(
    metrics: &MetricMap,
    profile: Option<&AthleteProfile>,
    registry: &BoundsRegistry,
) -> ValidationReport {
    let mut issues = Vec::new();

    for (name, outcome) in metrics {
        match outcome {
            MetricOutcome::Value(value) => {
                if let Some(bounds) = registry.get(name) {
                    if let Some(issue) = bounds.classify(name, *value, profile) {
                        issues.push(issue);
                    }
                }
            }
            MetricOutcome::Unimplemented(reason) => {
                issues.push(ValidationIssue {
                    metric: name.clone(),
                    severity: Severity::Info,
                    message: format!("not computed: {}", reason),
                });
            }
        }
    }

    let status = if issues.iter().any(|i| i.severity == Severity::Error) {
        ValidationStatus::Fail
    } else if issues.iter().any(|i| i.severity == Severity::Warning) {
        ValidationStatus::PassWithWarnings
    } else {
        ValidationStatus::Pass
    };

    if status != ValidationStatus::Pass {
        log::debug!("Validation {:?} with {} issues", status, issues.len());
    }

    ValidationReport { status, issues }
}
