use std::fmt::Write;

use chrono::NaiveDate;

use crate::engine::Assessment;
use crate::models::{Category, Classification};

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: Classification,
    pub count: usize,
    pub avg_score: Option<f64>,
}

/// Counts classified students per label, best category first, with
/// `Undetermined` last. Rejected rows are not counted.
pub fn summarize_by_category(assessments: &[Assessment]) -> Vec<CategorySummary> {
    let labels = Category::ALL
        .into_iter()
        .rev()
        .map(Classification::Category)
        .chain(std::iter::once(Classification::Undetermined));

    labels
        .filter_map(|label| {
            let scores: Vec<Option<f64>> = assessments
                .iter()
                .filter_map(|assessment| assessment.outcome.as_ref().ok())
                .filter(|result| result.category == label)
                .map(|result| result.crisp_score)
                .collect();

            if scores.is_empty() {
                return None;
            }

            let known: Vec<f64> = scores.iter().flatten().copied().collect();
            let avg_score = if known.is_empty() {
                None
            } else {
                Some(known.iter().sum::<f64>() / known.len() as f64)
            };

            Some(CategorySummary {
                category: label,
                count: scores.len(),
                avg_score,
            })
        })
        .collect()
}

pub fn build_report(
    cohort: Option<&str>,
    generated_on: NaiveDate,
    assessments: &[Assessment],
) -> String {
    let summaries = summarize_by_category(assessments);

    let mut output = String::new();
    let cohort_label = cohort.unwrap_or("all students");

    let _ = writeln!(output, "# Student Performance Report");
    let _ = writeln!(
        output,
        "Generated for {} on {} ({} rows)",
        cohort_label,
        generated_on,
        assessments.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Category Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No students classified.");
    } else {
        for summary in summaries.iter() {
            match summary.avg_score {
                Some(score) => {
                    let _ = writeln!(
                        output,
                        "- {}: {} students (avg score {:.1})",
                        summary.category, summary.count, score
                    );
                }
                None => {
                    let _ = writeln!(output, "- {}: {} students", summary.category, summary.count);
                }
            }
        }
    }

    let mut at_risk: Vec<(&Assessment, Category, f64)> = assessments
        .iter()
        .filter_map(|assessment| {
            let result = assessment.outcome.as_ref().ok()?;
            let category = result.category.category()?;
            matches!(category, Category::Poor | Category::NeedsImprovement)
                .then_some((assessment, category, result.crisp_score.unwrap_or(0.0)))
        })
        .collect();
    at_risk.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Students Needing Support");

    if at_risk.is_empty() {
        let _ = writeln!(output, "No students in Poor or Needs Improvement.");
    } else {
        for (assessment, category, score) in at_risk.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} ({}) score {:.1}",
                assessment.student.display_name(),
                category,
                score
            );
        }
    }

    let undetermined: Vec<&Assessment> = assessments
        .iter()
        .filter(|assessment| {
            matches!(
                assessment.outcome.as_ref().map(|result| result.category),
                Ok(Classification::Undetermined)
            )
        })
        .collect();

    let _ = writeln!(output);
    let _ = writeln!(output, "## Undetermined");

    if undetermined.is_empty() {
        let _ = writeln!(output, "Every classified student matched at least one rule.");
    } else {
        for assessment in undetermined {
            let _ = writeln!(output, "- {}", assessment.student.display_name());
        }
    }

    let rejected: Vec<(&Assessment, String)> = assessments
        .iter()
        .filter_map(|assessment| {
            let err = assessment.outcome.as_ref().err()?;
            Some((assessment, err.to_string()))
        })
        .collect();

    if !rejected.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Rejected Rows");
        for (assessment, reason) in rejected {
            let _ = writeln!(output, "- {}: {}", assessment.student.display_name(), reason);
        }
    }

    output
}
