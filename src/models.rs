use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::EngineError;

/// The five academic metrics fed into the classifier, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Gpa,
    Cca,
    Attendance,
    Midterm,
    FinalExam,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Gpa,
        Metric::Cca,
        Metric::Attendance,
        Metric::Midterm,
        Metric::FinalExam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Gpa => "gpa",
            Metric::Cca => "cca",
            Metric::Attendance => "attendance",
            Metric::Midterm => "midterm",
            Metric::FinalExam => "final_exam",
        }
    }

    /// Inclusive `(min, max)` range a raw value is clamped into.
    pub fn domain(&self) -> (f64, f64) {
        match self {
            Metric::Gpa => (0.0, 4.0),
            Metric::Attendance => (0.0, 1.0),
            Metric::Cca | Metric::Midterm | Metric::FinalExam => (0.0, 100.0),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "gpa" => Ok(Metric::Gpa),
            "cca" => Ok(Metric::Cca),
            "attendance" => Ok(Metric::Attendance),
            "midterm" => Ok(Metric::Midterm),
            "final_exam" | "final" => Ok(Metric::FinalExam),
            _ => Err(EngineError::UnknownMetric {
                name: s.to_string(),
            }),
        }
    }
}

/// Linguistic term of a fuzzy partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Low,
    Medium,
    High,
}

impl Term {
    pub fn as_str(&self) -> &'static str {
        match self {
            Term::Low => "low",
            Term::Medium => "medium",
            Term::High => "high",
        }
    }
}

/// Output performance category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Poor,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
    Satisfactory,
    Good,
    Excellent,
}

impl Category {
    /// Worst to best.
    pub const ALL: [Category; 5] = [
        Category::Poor,
        Category::NeedsImprovement,
        Category::Satisfactory,
        Category::Good,
        Category::Excellent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Poor => "Poor",
            Category::NeedsImprovement => "Needs Improvement",
            Category::Satisfactory => "Satisfactory",
            Category::Good => "Good",
            Category::Excellent => "Excellent",
        }
    }

    /// Crisp value a fired rule contributes to the weighted-average score.
    pub fn representative_value(&self) -> f64 {
        match self {
            Category::Poor => 20.0,
            Category::NeedsImprovement => 50.0,
            Category::Satisfactory => 70.0,
            Category::Good => 85.0,
            Category::Excellent => 95.0,
        }
    }

    /// Band a crisp score on the 0-100 scale falls into.
    pub fn from_score(score: f64) -> Category {
        if score <= 40.0 {
            Category::Poor
        } else if score <= 60.0 {
            Category::NeedsImprovement
        } else if score <= 80.0 {
            Category::Satisfactory
        } else if score <= 95.0 {
            Category::Good
        } else {
            Category::Excellent
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = EngineError;

    /// Case-insensitive; `_` and `-` stand in for spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().replace(['_', '-'], " ");
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(&label))
            .ok_or_else(|| EngineError::UnknownCategory {
                name: s.to_string(),
            })
    }
}

/// One complete evaluation request. Every field is required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricInput {
    pub gpa: f64,
    pub cca: f64,
    pub attendance: f64,
    pub midterm: f64,
    pub final_exam: f64,
}

impl MetricInput {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Gpa => self.gpa,
            Metric::Cca => self.cca,
            Metric::Attendance => self.attendance,
            Metric::Midterm => self.midterm,
            Metric::FinalExam => self.final_exam,
        }
    }

    /// Rejects NaN, which cannot be clamped into a domain. Every other value
    /// is accepted.
    pub fn validate(&self) -> Result<(), EngineError> {
        match Metric::ALL
            .into_iter()
            .find(|metric| self.value(*metric).is_nan())
        {
            Some(metric) => Err(EngineError::NotANumber { metric }),
            None => Ok(()),
        }
    }

    /// Metrics whose raw value lies outside the metric's domain.
    pub fn out_of_domain(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|metric| {
                let (min, max) = metric.domain();
                let value = self.value(*metric);
                value < min || value > max
            })
            .collect()
    }
}

/// A student row as it arrives from storage or a CSV export. Metrics are
/// optional here so that absent values can be rejected explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub gpa: Option<f64>,
    pub cca: Option<f64>,
    pub attendance: Option<f64>,
    pub midterm: Option<f64>,
    pub final_exam: Option<f64>,
    /// Known category for labeled exports, checked by `evaluate`.
    #[serde(
        default,
        alias = "Performance",
        alias = "category",
        alias = "Category",
        alias = "label",
        alias = "Label"
    )]
    pub performance: Option<String>,
}

impl StudentRecord {
    fn raw(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Gpa => self.gpa,
            Metric::Cca => self.cca,
            Metric::Attendance => self.attendance,
            Metric::Midterm => self.midterm,
            Metric::FinalExam => self.final_exam,
        }
    }

    pub fn display_name(&self) -> String {
        match (&self.name, self.user_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("student #{id}"),
            (None, None) => "unnamed student".to_string(),
        }
    }

    /// Parses the expected label, if the row carries one.
    pub fn expected_category(&self) -> Result<Option<Category>, EngineError> {
        self.performance.as_deref().map(str::parse).transpose()
    }

    /// Validates the record at the engine boundary: all five metrics must be
    /// present and NaN is rejected (it cannot be clamped).
    pub fn metrics(&self) -> Result<MetricInput, EngineError> {
        let mut values = [0.0; 5];
        for (slot, metric) in values.iter_mut().zip(Metric::ALL) {
            *slot = self
                .raw(metric)
                .ok_or(EngineError::MissingMetric { metric })?;
        }

        let [gpa, cca, attendance, midterm, final_exam] = values;
        let input = MetricInput {
            gpa,
            cca,
            attendance,
            midterm,
            final_exam,
        };
        input.validate()?;
        Ok(input)
    }
}

/// Degrees of membership of one metric in its Low/Medium/High sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Membership {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Membership {
    pub fn get(&self, term: Term) -> f64 {
        match term {
            Term::Low => self.low,
            Term::Medium => self.medium,
            Term::High => self.high,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MembershipVector {
    pub gpa: Membership,
    pub cca: Membership,
    pub attendance: Membership,
    pub midterm: Membership,
    pub final_exam: Membership,
}

impl MembershipVector {
    pub fn get(&self, metric: Metric) -> &Membership {
        match metric {
            Metric::Gpa => &self.gpa,
            Metric::Cca => &self.cca,
            Metric::Attendance => &self.attendance,
            Metric::Midterm => &self.midterm,
            Metric::FinalExam => &self.final_exam,
        }
    }

    pub fn get_mut(&mut self, metric: Metric) -> &mut Membership {
        match metric {
            Metric::Gpa => &mut self.gpa,
            Metric::Cca => &mut self.cca,
            Metric::Attendance => &mut self.attendance,
            Metric::Midterm => &mut self.midterm,
            Metric::FinalExam => &mut self.final_exam,
        }
    }
}

/// Degree of truth for each output category. Also used for per-category
/// thresholds in configuration, hence `Deserialize`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryDegrees {
    #[serde(rename = "Poor")]
    pub poor: f64,
    #[serde(rename = "Needs Improvement")]
    pub needs_improvement: f64,
    #[serde(rename = "Satisfactory")]
    pub satisfactory: f64,
    #[serde(rename = "Good")]
    pub good: f64,
    #[serde(rename = "Excellent")]
    pub excellent: f64,
}

impl CategoryDegrees {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Poor => self.poor,
            Category::NeedsImprovement => self.needs_improvement,
            Category::Satisfactory => self.satisfactory,
            Category::Good => self.good,
            Category::Excellent => self.excellent,
        }
    }

    fn slot(&mut self, category: Category) -> &mut f64 {
        match category {
            Category::Poor => &mut self.poor,
            Category::NeedsImprovement => &mut self.needs_improvement,
            Category::Satisfactory => &mut self.satisfactory,
            Category::Good => &mut self.good,
            Category::Excellent => &mut self.excellent,
        }
    }

    /// Fuzzy OR: keeps the larger of the current and incoming degree.
    pub fn raise(&mut self, category: Category, degree: f64) {
        let slot = self.slot(category);
        *slot = slot.max(degree);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    pub fn is_all_zero(&self) -> bool {
        self.iter().all(|(_, degree)| degree == 0.0)
    }
}

/// Final decision of the pipeline. `Undetermined` means no rule fired and is
/// a regular outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Category(Category),
    Undetermined,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Category(category) => category.as_str(),
            Classification::Undetermined => "Undetermined",
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            Classification::Category(category) => Some(*category),
            Classification::Undetermined => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A rule that fired during inference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleFiring {
    pub rule: usize,
    pub category: Category,
    pub strength: f64,
    pub weighted_value: f64,
}

/// Everything produced by one evaluation. Built once, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub category: Classification,
    pub crisp_score: Option<f64>,
    pub inputs: MetricInput,
    pub fuzzy_membership: MembershipVector,
    pub inference_output: CategoryDegrees,
    pub fired_rules: Vec<RuleFiring>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clamped: Vec<Metric>,
}
