//! The full pipeline: fuzzify, infer, defuzzify.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::defuzzify::Defuzzifier;
use crate::error::EngineError;
use crate::fuzzify::fuzzify;
use crate::membership::PartitionSet;
use crate::models::{ClassificationResult, MetricInput, StudentRecord};
use crate::rules::{infer, Rule, RULES};

/// Immutable after construction, so one engine can serve any number of
/// threads.
#[derive(Debug, Clone)]
pub struct Engine {
    partitions: PartitionSet,
    rules: &'static [Rule],
    defuzzifier: Defuzzifier,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            partitions: PartitionSet::default(),
            rules: RULES,
            defuzzifier: Defuzzifier::default(),
        }
    }
}

/// Outcome for one student row of a batch.
#[derive(Debug)]
pub struct Assessment {
    pub student: StudentRecord,
    pub outcome: Result<ClassificationResult, EngineError>,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            partitions: config.partitions,
            rules: RULES,
            defuzzifier: Defuzzifier::new(
                config.defuzzifier,
                &config.tie_break,
                config.thresholds,
            )?,
        })
    }

    pub fn partitions(&self) -> &PartitionSet {
        &self.partitions
    }

    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }

    /// Classifies one complete input. Out-of-domain values are clamped and
    /// reported in `ClassificationResult::clamped`; NaN is rejected.
    pub fn classify(&self, input: &MetricInput) -> Result<ClassificationResult, EngineError> {
        input.validate()?;

        let clamped = input.out_of_domain();
        for metric in &clamped {
            let (min, max) = metric.domain();
            warn!(
                metric = %metric,
                value = input.value(*metric),
                min,
                max,
                "metric outside its domain, clamping"
            );
        }

        let fuzzy_membership = fuzzify(&self.partitions, input);
        let inference = infer(self.rules, &fuzzy_membership);
        for firing in &inference.firings {
            debug!(
                rule = firing.rule,
                category = %firing.category,
                strength = firing.strength,
                "rule fired"
            );
        }

        let category = self.defuzzifier.categorize(&inference);
        let crisp_score = inference.crisp_score();
        if inference.no_rule_fired() {
            debug!("no rule fired, classification undetermined");
        }

        Ok(ClassificationResult {
            category,
            crisp_score,
            inputs: *input,
            fuzzy_membership,
            inference_output: inference.degrees,
            fired_rules: inference.firings,
            clamped,
        })
    }

    /// Validates a boundary record, then classifies it.
    pub fn classify_record(
        &self,
        record: &StudentRecord,
    ) -> Result<ClassificationResult, EngineError> {
        self.classify(&record.metrics()?)
    }

    /// Classifies every record in parallel. Output order matches input order
    /// and a rejected record does not affect the others.
    pub fn classify_batch(&self, records: Vec<StudentRecord>) -> Vec<Assessment> {
        records
            .into_par_iter()
            .map(|student| {
                let outcome = self.classify_record(&student);
                if let Err(err) = &outcome {
                    warn!(student = %student.display_name(), error = %err, "record rejected");
                }
                Assessment { student, outcome }
            })
            .collect()
    }
}
