//! Piecewise-linear Low/Medium/High membership functions.
//!
//! Every metric shares one partition shape; only the breakpoints differ.
//! Inputs are clamped into the metric's domain before evaluation so that no
//! curve is ever extrapolated past 0 or 1.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{Membership, Metric};

/// Breakpoints of one metric's partition.
///
/// - `low` is 1 up to `low_full`, falls to 0 at `low_zero`.
/// - `medium` rises from 0 at `low_full` to 1 at `medium_peak`, falls to 0 at
///   `medium_zero`.
/// - `high` is 0 up to `high_zero`, rises to 1 at `high_full`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub low_full: f64,
    pub low_zero: f64,
    pub medium_peak: f64,
    pub medium_zero: f64,
    pub high_zero: f64,
    pub high_full: f64,
}

impl Partition {
    pub const fn new(
        low_full: f64,
        low_zero: f64,
        medium_peak: f64,
        medium_zero: f64,
        high_zero: f64,
        high_full: f64,
    ) -> Self {
        Self {
            low_full,
            low_zero,
            medium_peak,
            medium_zero,
            high_zero,
            high_full,
        }
    }

    pub fn low(&self, x: f64) -> f64 {
        if x <= self.low_full {
            1.0
        } else if x <= self.low_zero {
            (self.low_zero - x) / (self.low_zero - self.low_full)
        } else {
            0.0
        }
    }

    pub fn medium(&self, x: f64) -> f64 {
        if x >= self.low_full && x <= self.medium_peak {
            (x - self.low_full) / (self.medium_peak - self.low_full)
        } else if x > self.medium_peak && x <= self.medium_zero {
            (self.medium_zero - x) / (self.medium_zero - self.medium_peak)
        } else {
            0.0
        }
    }

    pub fn high(&self, x: f64) -> f64 {
        if x >= self.high_full {
            1.0
        } else if x >= self.high_zero {
            (x - self.high_zero) / (self.high_full - self.high_zero)
        } else {
            0.0
        }
    }

    /// Evaluates all three sets without clamping.
    pub fn evaluate(&self, x: f64) -> Membership {
        Membership {
            low: self.low(x),
            medium: self.medium(x),
            high: self.high(x),
        }
    }

    /// Checks the ordering that keeps every degree inside [0, 1] and
    /// `low + high <= 1`.
    pub fn validate(&self, metric: Metric) -> Result<(), EngineError> {
        let (min, max) = metric.domain();
        let invalid = |reason: String| EngineError::InvalidPartition { metric, reason };

        let values = [
            self.low_full,
            self.low_zero,
            self.medium_peak,
            self.medium_zero,
            self.high_zero,
            self.high_full,
        ];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(invalid("breakpoints must be finite".to_string()));
        }
        if values.iter().any(|value| *value < min || *value > max) {
            return Err(invalid(format!(
                "breakpoints must lie within the domain [{min}, {max}]"
            )));
        }
        if self.low_full >= self.low_zero {
            return Err(invalid("low_full must be below low_zero".to_string()));
        }
        if self.low_full >= self.medium_peak || self.medium_peak >= self.medium_zero {
            return Err(invalid(
                "medium needs low_full < medium_peak < medium_zero".to_string(),
            ));
        }
        if self.high_zero >= self.high_full {
            return Err(invalid("high_zero must be below high_full".to_string()));
        }
        if self.low_zero > self.high_zero {
            return Err(invalid(
                "low must reach zero before high starts rising".to_string(),
            ));
        }
        Ok(())
    }
}

/// Clamps a raw value into the metric's domain.
pub fn clamp_to_domain(metric: Metric, value: f64) -> f64 {
    let (min, max) = metric.domain();
    value.clamp(min, max)
}

/// One partition per metric. Missing entries in configuration fall back to
/// the built-in breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionSet {
    pub gpa: Partition,
    pub cca: Partition,
    pub attendance: Partition,
    pub midterm: Partition,
    pub final_exam: Partition,
}

impl Default for PartitionSet {
    fn default() -> Self {
        Self {
            gpa: Partition::new(1.8, 2.2, 2.5, 3.2, 2.8, 3.2),
            cca: Partition::new(50.0, 55.0, 65.0, 75.0, 70.0, 80.0),
            attendance: Partition::new(0.60, 0.65, 0.75, 0.85, 0.80, 0.90),
            midterm: Partition::new(55.0, 60.0, 65.0, 75.0, 70.0, 80.0),
            final_exam: Partition::new(52.0, 54.0, 70.0, 82.0, 78.0, 82.0),
        }
    }
}

impl PartitionSet {
    pub fn get(&self, metric: Metric) -> &Partition {
        match metric {
            Metric::Gpa => &self.gpa,
            Metric::Cca => &self.cca,
            Metric::Attendance => &self.attendance,
            Metric::Midterm => &self.midterm,
            Metric::FinalExam => &self.final_exam,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for metric in Metric::ALL {
            self.get(metric).validate(metric)?;
        }
        Ok(())
    }

    /// Membership of a raw value, clamped into the metric's domain first.
    pub fn membership(&self, metric: Metric, value: f64) -> Membership {
        self.get(metric).evaluate(clamp_to_domain(metric, value))
    }
}

/// A sampled point of the three membership curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub x: f64,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

/// Samples the curves on an evenly spaced grid across the metric's domain.
/// At least two points (the domain endpoints) are always returned.
pub fn sample_curve(partitions: &PartitionSet, metric: Metric, points: usize) -> Vec<CurvePoint> {
    let (min, max) = metric.domain();
    let points = points.max(2);
    let last = (points - 1) as f64;

    (0..points)
        .map(|i| {
            let x = min + (max - min) * (i as f64) / last;
            let membership = partitions.membership(metric, x);
            CurvePoint {
                x,
                low: membership.low,
                medium: membership.medium,
                high: membership.high,
            }
        })
        .collect()
}
