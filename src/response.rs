//! JSON envelope consumed by the dashboard charts.
//!
//! Shape: `{ "errors"?: [...], "data": { user_id, category,
//! defuzzification_value, inputs, fuzzy_membership, inference_output } }`.

use serde::Serialize;

use crate::engine::Assessment;
use crate::models::{
    CategoryDegrees, Classification, ClassificationResult, MembershipVector, MetricInput,
};

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDetail>,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FuzzyData<'a> {
    pub user_id: Option<i64>,
    pub category: Classification,
    pub defuzzification_value: Option<f64>,
    pub inputs: &'a MetricInput,
    pub fuzzy_membership: &'a MembershipVector,
    pub inference_output: &'a CategoryDegrees,
}

impl<'a> FuzzyData<'a> {
    pub fn new(user_id: Option<i64>, result: &'a ClassificationResult) -> Self {
        Self {
            user_id,
            category: result.category,
            defuzzification_value: result.crisp_score,
            inputs: &result.inputs,
            fuzzy_membership: &result.fuzzy_membership,
            inference_output: &result.inference_output,
        }
    }
}

pub fn success(user_id: Option<i64>, result: &ClassificationResult) -> Envelope<FuzzyData<'_>> {
    Envelope {
        errors: Vec::new(),
        data: Some(FuzzyData::new(user_id, result)),
    }
}

/// Envelope for a batch row; a rejected row carries its error and no data.
pub fn from_assessment(assessment: &Assessment) -> Envelope<FuzzyData<'_>> {
    match &assessment.outcome {
        Ok(result) => success(assessment.student.user_id, result),
        Err(err) => Envelope {
            errors: vec![ErrorDetail {
                field: None,
                message: err.to_string(),
            }],
            data: None,
        },
    }
}
