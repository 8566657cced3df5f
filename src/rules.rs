//! The fixed rule base and Mamdani min-max evaluation.
//!
//! Each rule names one term per metric, in `Metric::ALL` order, and the
//! category it concludes. Antecedents are joined with fuzzy AND (minimum);
//! rules sharing a conclusion are aggregated with fuzzy OR (maximum).
//! Combinations without a rule contribute nothing.

use std::fmt;

use crate::models::{Category, CategoryDegrees, MembershipVector, Metric, RuleFiring, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub antecedent: [Term; 5],
    pub consequent: Category,
}

impl Rule {
    /// Firing strength: the minimum membership across all five antecedents.
    pub fn strength(&self, memberships: &MembershipVector) -> f64 {
        Metric::ALL
            .into_iter()
            .zip(self.antecedent)
            .map(|(metric, term)| memberships.get(metric).get(term))
            .fold(1.0, f64::min)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses: Vec<String> = Metric::ALL
            .into_iter()
            .zip(self.antecedent)
            .map(|(metric, term)| format!("{} IS {}", metric, term.as_str()))
            .collect();
        write!(f, "IF {} THEN {}", clauses.join(" AND "), self.consequent)
    }
}

const fn rule(antecedent: [Term; 5], consequent: Category) -> Rule {
    Rule {
        antecedent,
        consequent,
    }
}

use Category::{Excellent, Good, NeedsImprovement, Poor, Satisfactory};
use Term::{High as H, Low as L, Medium as M};

// Two antecedents (H M H H H and H H M H H) conclude both Good and
// Excellent. Both categories then carry the same degree and the
// tie-break priority settles the label.
pub const RULES: &[Rule] = &[
    // Mostly low
    rule([L, L, L, L, L], Poor),
    rule([L, L, L, L, M], Poor),
    rule([L, L, L, M, L], Poor),
    rule([L, L, M, L, L], Poor),
    rule([L, M, L, L, L], Poor),
    rule([M, L, L, L, L], Poor),

    // One or two weak metrics among mediums
    rule([M, M, M, L, M], NeedsImprovement),
    rule([M, M, M, M, L], NeedsImprovement),
    rule([M, M, L, M, M], NeedsImprovement),
    rule([M, L, M, M, M], NeedsImprovement),
    rule([L, M, M, M, M], NeedsImprovement),
    rule([L, L, M, M, M], NeedsImprovement),
    rule([L, M, L, M, M], NeedsImprovement),
    rule([L, M, M, L, M], NeedsImprovement),
    rule([L, M, M, M, L], NeedsImprovement),
    rule([M, L, L, M, M], NeedsImprovement),
    rule([M, L, M, L, M], NeedsImprovement),
    rule([M, L, M, M, L], NeedsImprovement),
    rule([M, M, L, L, M], NeedsImprovement),
    rule([M, M, L, M, L], NeedsImprovement),
    rule([M, M, M, L, L], NeedsImprovement),
    rule([L, L, H, M, M], NeedsImprovement),
    rule([L, M, L, L, M], NeedsImprovement),
    rule([M, L, L, L, M], NeedsImprovement),

    // All medium, with up to two strong metrics
    rule([M, M, M, M, M], Satisfactory),
    rule([H, M, M, M, M], Satisfactory),
    rule([M, H, M, M, M], Satisfactory),
    rule([M, M, H, M, M], Satisfactory),
    rule([M, M, M, H, M], Satisfactory),
    rule([M, M, M, M, H], Satisfactory),
    rule([H, H, M, M, M], Satisfactory),
    rule([H, M, H, M, M], Satisfactory),
    rule([H, M, M, H, M], Satisfactory),
    rule([H, M, M, M, H], Satisfactory),
    rule([M, H, H, M, M], Satisfactory),
    rule([M, H, M, H, M], Satisfactory),
    rule([M, H, M, M, H], Satisfactory),
    rule([M, M, H, H, M], Satisfactory),
    rule([M, M, H, M, H], Satisfactory),
    rule([M, M, M, H, H], Satisfactory),

    // Three or four strong metrics
    rule([H, H, H, M, M], Good),
    rule([H, H, M, H, M], Good),
    rule([H, H, M, M, H], Good),
    rule([H, M, H, H, M], Good),
    rule([H, M, H, M, H], Good),
    rule([H, M, M, H, H], Good),
    rule([M, H, H, H, M], Good),
    rule([M, H, H, M, H], Good),
    rule([M, H, M, H, H], Good),
    rule([M, M, H, H, H], Good),
    rule([H, H, H, H, M], Good),
    rule([H, H, H, M, H], Good),
    rule([H, H, M, H, H], Good),
    rule([H, M, H, H, H], Good),
    rule([M, H, H, H, H], Good),

    rule([H, H, H, H, H], Excellent),
    rule([H, M, H, H, H], Excellent),
    rule([H, H, M, H, H], Excellent),
];

/// Result of evaluating the rule base against one membership vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub degrees: CategoryDegrees,
    pub firings: Vec<RuleFiring>,
}

impl Inference {
    pub fn no_rule_fired(&self) -> bool {
        self.firings.is_empty()
    }

    /// Weighted average of the representative values of every fired rule,
    /// on a 0-100 scale. `None` when nothing fired.
    pub fn crisp_score(&self) -> Option<f64> {
        let total_weight: f64 = self.firings.iter().map(|firing| firing.strength).sum();
        if total_weight <= 0.0 {
            return None;
        }
        let weighted_sum: f64 = self.firings.iter().map(|firing| firing.weighted_value).sum();
        Some(weighted_sum / total_weight)
    }
}

pub fn infer(rules: &[Rule], memberships: &MembershipVector) -> Inference {
    let mut degrees = CategoryDegrees::default();
    let mut firings = Vec::new();

    for (index, rule) in rules.iter().enumerate() {
        let strength = rule.strength(memberships);
        if strength <= 0.0 {
            continue;
        }

        degrees.raise(rule.consequent, strength);
        firings.push(RuleFiring {
            rule: index,
            category: rule.consequent,
            strength,
            weighted_value: strength * rule.consequent.representative_value(),
        });
    }

    Inference { degrees, firings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Membership;

    fn crisp(term: Term) -> Membership {
        match term {
            Term::Low => Membership {
                low: 1.0,
                ..Default::default()
            },
            Term::Medium => Membership {
                medium: 1.0,
                ..Default::default()
            },
            Term::High => Membership {
                high: 1.0,
                ..Default::default()
            },
        }
    }

    fn vector(terms: [Term; 5]) -> MembershipVector {
        let mut vector = MembershipVector::default();
        for (metric, term) in Metric::ALL.into_iter().zip(terms) {
            *vector.get_mut(metric) = crisp(term);
        }
        vector
    }

    #[test]
    fn table_covers_every_category() {
        for category in Category::ALL {
            assert!(
                RULES.iter().any(|rule| rule.consequent == category),
                "no rule concludes {category}"
            );
        }
        assert_eq!(RULES.len(), 58);
    }

    #[test]
    fn strength_is_minimum_of_antecedents() {
        let mut memberships = vector([M, M, M, M, M]);
        memberships.cca.medium = 0.4;
        memberships.final_exam.medium = 0.7;
        let rule = rule([M, M, M, M, M], Satisfactory);
        assert_eq!(rule.strength(&memberships), 0.4);
    }

    #[test]
    fn aggregation_keeps_strongest_rule() {
        let mut memberships = vector([M, M, M, M, M]);
        memberships.gpa.high = 0.3;
        memberships.cca.high = 0.6;
        let inference = infer(RULES, &memberships);
        assert_eq!(inference.degrees.satisfactory, 1.0);
        assert_eq!(inference.degrees.good, 0.0);
        assert!(inference.firings.len() >= 3);
    }

    #[test]
    fn all_high_is_excellent_only() {
        let inference = infer(RULES, &vector([H, H, H, H, H]));
        assert_eq!(inference.degrees.excellent, 1.0);
        assert_eq!(inference.degrees.good, 0.0);
        assert_eq!(inference.firings.len(), 1);
        assert_eq!(inference.crisp_score(), Some(95.0));
    }

    #[test]
    fn conflicting_rules_share_their_degree() {
        let inference = infer(RULES, &vector([H, M, H, H, H]));
        assert_eq!(inference.degrees.good, 1.0);
        assert_eq!(inference.degrees.excellent, 1.0);
        assert_eq!(inference.crisp_score(), Some(90.0));
    }

    #[test]
    fn unmapped_combination_yields_no_firing() {
        let inference = infer(RULES, &vector([L, H, H, H, H]));
        assert!(inference.no_rule_fired());
        assert!(inference.degrees.is_all_zero());
        assert_eq!(inference.crisp_score(), None);
    }

    #[test]
    fn crisp_score_weights_by_strength() {
        let mut memberships = vector([L, L, L, L, L]);
        memberships.gpa.medium = 1.0;
        memberships.cca.medium = 1.0;
        memberships.attendance.medium = 1.0;
        memberships.midterm.medium = 1.0;
        memberships.final_exam.medium = 1.0;
        memberships.gpa.low = 0.0;
        let inference = infer(RULES, &memberships);
        let score = inference.crisp_score().unwrap();
        assert!(score > 20.0 && score < 70.0);
    }

    #[test]
    fn display_reads_as_rule() {
        let text = RULES[0].to_string();
        assert_eq!(
            text,
            "IF gpa IS low AND cca IS low AND attendance IS low AND midterm IS low AND final_exam IS low THEN Poor"
        );
    }
}
