//! Agreement between predicted categories and labeled exports.

use std::fmt::Write;

use tracing::warn;

use crate::engine::Assessment;
use crate::models::{Category, Classification};

const CLASSES: usize = Category::ALL.len();

fn slot(category: Category) -> usize {
    category as usize
}

/// Confusion counts for one labeled batch. Rows are expected categories and
/// columns predicted ones, both in `Category::ALL` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub matrix: [[usize; CLASSES]; CLASSES],
    /// Rows per expected category that no rule matched.
    pub undetermined: [usize; CLASSES],
    pub unlabeled: usize,
    pub invalid_labels: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub category: Category,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
    pub support: usize,
}

pub fn evaluate(assessments: &[Assessment]) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for assessment in assessments {
        let Ok(result) = &assessment.outcome else {
            evaluation.rejected += 1;
            continue;
        };
        let expected = match assessment.student.expected_category() {
            Ok(Some(expected)) => expected,
            Ok(None) => {
                evaluation.unlabeled += 1;
                continue;
            }
            Err(err) => {
                warn!(student = %assessment.student.display_name(), error = %err, "label skipped");
                evaluation.invalid_labels += 1;
                continue;
            }
        };

        match result.category {
            Classification::Category(predicted) => {
                evaluation.matrix[slot(expected)][slot(predicted)] += 1;
            }
            Classification::Undetermined => evaluation.undetermined[slot(expected)] += 1,
        }
    }

    evaluation
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |value| format!("{value:.2}"))
}

impl Evaluation {
    /// Rows with a valid label that the engine accepted.
    pub fn labeled(&self) -> usize {
        self.matrix.iter().flatten().sum::<usize>() + self.undetermined.iter().sum::<usize>()
    }

    pub fn correct(&self) -> usize {
        (0..CLASSES).map(|i| self.matrix[i][i]).sum()
    }

    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.correct(), self.labeled())
    }

    fn support(&self, category: Category) -> usize {
        let row = slot(category);
        self.matrix[row].iter().sum::<usize>() + self.undetermined[row]
    }

    fn predicted(&self, category: Category) -> usize {
        let column = slot(category);
        self.matrix.iter().map(|row| row[column]).sum()
    }

    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        Category::ALL
            .into_iter()
            .map(|category| {
                let hits = self.matrix[slot(category)][slot(category)];
                let support = self.support(category);
                let precision = ratio(hits, self.predicted(category));
                let recall = ratio(hits, support);
                let f1 = match (precision, recall) {
                    (Some(p), Some(r)) if p + r > 0.0 => Some(2.0 * p * r / (p + r)),
                    (Some(_), Some(_)) => Some(0.0),
                    _ => None,
                };
                ClassMetrics {
                    category,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let mut output = String::new();

        match self.accuracy() {
            Some(accuracy) => {
                let _ = writeln!(
                    output,
                    "Accuracy: {:.2}% ({} of {} labeled rows)",
                    accuracy * 100.0,
                    self.correct(),
                    self.labeled()
                );
            }
            None => {
                let _ = writeln!(output, "No labeled rows to evaluate.");
            }
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "Confusion matrix (rows expected, columns predicted):");
        let header: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
        let _ = writeln!(output, "| expected | {} | Undetermined |", header.join(" | "));
        let _ = writeln!(output, "|---{}|---|", "|---".repeat(CLASSES));
        for category in Category::ALL {
            let row = slot(category);
            let counts: Vec<String> = self.matrix[row].iter().map(usize::to_string).collect();
            let _ = writeln!(
                output,
                "| {} | {} | {} |",
                category,
                counts.join(" | "),
                self.undetermined[row]
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "Per category:");
        for metrics in self.class_metrics() {
            let _ = writeln!(
                output,
                "- {}: precision {}, recall {}, f1 {} (support {})",
                metrics.category,
                format_ratio(metrics.precision),
                format_ratio(metrics.recall),
                format_ratio(metrics.f1),
                metrics.support
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Skipped: {} unlabeled, {} invalid labels, {} rejected",
            self.unlabeled, self.invalid_labels, self.rejected
        );

        output
    }
}
