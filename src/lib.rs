//! Fuzzy classification of student academic performance.
//!
//! Five raw metrics are fuzzified into Low/Medium/High degrees, evaluated
//! against a fixed rule base with min-max inference, and collapsed into one
//! of five performance categories (or `Undetermined` when no rule fires).
//! Every step is a pure function of its input.

pub mod config;
pub mod defuzzify;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod fuzzify;
pub mod import;
pub mod membership;
pub mod models;
pub mod report;
pub mod response;
pub mod rules;

pub use config::EngineConfig;
pub use engine::{Assessment, Engine};
pub use error::EngineError;
pub use models::{
    Category, CategoryDegrees, Classification, ClassificationResult, Membership, MembershipVector,
    Metric, MetricInput, StudentRecord, Term,
};
