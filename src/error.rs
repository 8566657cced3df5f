//! Errors raised by the classification engine.

use crate::models::{Category, Metric};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("metric '{metric}' is missing")]
    MissingMetric { metric: Metric },

    #[error("metric '{metric}' is not a number")]
    NotANumber { metric: Metric },

    #[error("unknown metric '{name}'")]
    UnknownMetric { name: String },

    #[error("unknown category '{name}'")]
    UnknownCategory { name: String },

    #[error("invalid partition for '{metric}': {reason}")]
    InvalidPartition { metric: Metric, reason: String },

    #[error("threshold for '{category}' must be within [0, 1], got {threshold}")]
    InvalidThreshold { category: Category, threshold: f64 },

    #[error("invalid tie-break priority: {reason}")]
    InvalidPriority { reason: String },
}
