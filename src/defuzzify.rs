//! Collapses category degrees into a single label.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{Category, CategoryDegrees, Classification};
use crate::rules::Inference;

/// Order in which equally strong categories are preferred.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Excellent first.
    #[default]
    Optimistic,
    /// Poor first.
    Conservative,
    /// Explicit ordering, highest priority first. Must name every category once.
    Custom(Vec<Category>),
}

impl TieBreak {
    pub fn priority(&self) -> Vec<Category> {
        match self {
            TieBreak::Optimistic => Category::ALL.into_iter().rev().collect(),
            TieBreak::Conservative => Category::ALL.to_vec(),
            TieBreak::Custom(order) => order.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let TieBreak::Custom(order) = self else {
            return Ok(());
        };
        if order.len() != Category::ALL.len() {
            return Err(EngineError::InvalidPriority {
                reason: format!(
                    "expected {} categories, got {}",
                    Category::ALL.len(),
                    order.len()
                ),
            });
        }
        for category in Category::ALL {
            if !order.contains(&category) {
                return Err(EngineError::InvalidPriority {
                    reason: format!("'{category}' is not listed"),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Highest degree wins.
    #[default]
    MaxMembership,
    /// Highest degree among categories that reach their threshold; falls back
    /// to `MaxMembership` when none does.
    Thresholded,
    /// Bands the weighted-average crisp score.
    WeightedAverage,
}

/// Minimum degrees used by `Strategy::Thresholded`.
pub fn default_thresholds() -> CategoryDegrees {
    CategoryDegrees {
        poor: 0.3,
        needs_improvement: 0.2,
        satisfactory: 0.4,
        good: 0.5,
        excellent: 0.7,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Defuzzifier {
    strategy: Strategy,
    priority: Vec<Category>,
    thresholds: CategoryDegrees,
}

impl Default for Defuzzifier {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            priority: TieBreak::default().priority(),
            thresholds: default_thresholds(),
        }
    }
}

impl Defuzzifier {
    pub fn new(
        strategy: Strategy,
        tie_break: &TieBreak,
        thresholds: CategoryDegrees,
    ) -> Result<Self, EngineError> {
        tie_break.validate()?;
        Ok(Self {
            strategy,
            priority: tie_break.priority(),
            thresholds,
        })
    }

    /// An all-zero degree vector always yields `Undetermined`, whatever the
    /// strategy.
    pub fn categorize(&self, inference: &Inference) -> Classification {
        if inference.degrees.is_all_zero() {
            return Classification::Undetermined;
        }

        match self.strategy {
            Strategy::MaxMembership => self.max_membership(&inference.degrees),
            Strategy::Thresholded => self.thresholded(&inference.degrees),
            Strategy::WeightedAverage => match inference.crisp_score() {
                Some(score) => Classification::Category(Category::from_score(score)),
                None => Classification::Undetermined,
            },
        }
    }

    fn max_membership(&self, degrees: &CategoryDegrees) -> Classification {
        self.pick(degrees, |_| true)
    }

    fn thresholded(&self, degrees: &CategoryDegrees) -> Classification {
        match self.pick(degrees, |category| {
            degrees.get(category) >= self.thresholds.get(category)
        }) {
            Classification::Undetermined => self.max_membership(degrees),
            picked => picked,
        }
    }

    /// Walks the priority order so that on equal degrees the earlier
    /// category is kept.
    fn pick(
        &self,
        degrees: &CategoryDegrees,
        eligible: impl Fn(Category) -> bool,
    ) -> Classification {
        let mut best: Option<(Category, f64)> = None;
        for category in self.priority.iter().copied() {
            let degree = degrees.get(category);
            if degree <= 0.0 || !eligible(category) {
                continue;
            }
            match best {
                Some((_, best_degree)) if degree <= best_degree => {}
                _ => best = Some((category, degree)),
            }
        }

        match best {
            Some((category, _)) => Classification::Category(category),
            None => Classification::Undetermined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleFiring;

    fn inference(degrees: CategoryDegrees) -> Inference {
        let firings = degrees
            .iter()
            .filter(|(_, degree)| *degree > 0.0)
            .enumerate()
            .map(|(rule, (category, strength))| RuleFiring {
                rule,
                category,
                strength,
                weighted_value: strength * category.representative_value(),
            })
            .collect();
        Inference { degrees, firings }
    }

    #[test]
    fn highest_degree_wins() {
        let degrees = CategoryDegrees {
            satisfactory: 0.4,
            good: 0.6,
            ..Default::default()
        };
        let result = Defuzzifier::default().categorize(&inference(degrees));
        assert_eq!(result, Classification::Category(Category::Good));
    }

    #[test]
    fn optimistic_tie_break_prefers_better_category() {
        let degrees = CategoryDegrees {
            needs_improvement: 0.5,
            satisfactory: 0.5,
            ..Default::default()
        };
        let result = Defuzzifier::default().categorize(&inference(degrees));
        assert_eq!(result, Classification::Category(Category::Satisfactory));
    }

    #[test]
    fn conservative_tie_break_prefers_worse_category() {
        let degrees = CategoryDegrees {
            needs_improvement: 0.5,
            satisfactory: 0.5,
            ..Default::default()
        };
        let defuzzifier = Defuzzifier::new(
            Strategy::MaxMembership,
            &TieBreak::Conservative,
            default_thresholds(),
        )
        .unwrap();
        let result = defuzzifier.categorize(&inference(degrees));
        assert_eq!(result, Classification::Category(Category::NeedsImprovement));
    }

    #[test]
    fn all_zero_is_undetermined_for_every_strategy() {
        for strategy in [
            Strategy::MaxMembership,
            Strategy::Thresholded,
            Strategy::WeightedAverage,
        ] {
            let defuzzifier =
                Defuzzifier::new(strategy, &TieBreak::Optimistic, default_thresholds()).unwrap();
            let result = defuzzifier.categorize(&inference(CategoryDegrees::default()));
            assert_eq!(result, Classification::Undetermined);
        }
    }

    #[test]
    fn thresholded_skips_categories_below_threshold() {
        let degrees = CategoryDegrees {
            needs_improvement: 0.25,
            excellent: 0.6,
            ..Default::default()
        };
        let defuzzifier = Defuzzifier::new(
            Strategy::Thresholded,
            &TieBreak::Optimistic,
            default_thresholds(),
        )
        .unwrap();
        let result = defuzzifier.categorize(&inference(degrees));
        assert_eq!(result, Classification::Category(Category::NeedsImprovement));
    }

    #[test]
    fn thresholded_falls_back_to_max_membership() {
        let degrees = CategoryDegrees {
            poor: 0.1,
            good: 0.3,
            ..Default::default()
        };
        let defuzzifier = Defuzzifier::new(
            Strategy::Thresholded,
            &TieBreak::Optimistic,
            default_thresholds(),
        )
        .unwrap();
        let result = defuzzifier.categorize(&inference(degrees));
        assert_eq!(result, Classification::Category(Category::Good));
    }

    #[test]
    fn weighted_average_bands_crisp_score() {
        let degrees = CategoryDegrees {
            satisfactory: 0.5,
            good: 0.5,
            ..Default::default()
        };
        let defuzzifier = Defuzzifier::new(
            Strategy::WeightedAverage,
            &TieBreak::Optimistic,
            default_thresholds(),
        )
        .unwrap();
        // (70 + 85) / 2 = 77.5
        let result = defuzzifier.categorize(&inference(degrees));
        assert_eq!(result, Classification::Category(Category::Satisfactory));
    }

    #[test]
    fn custom_priority_must_list_every_category() {
        let partial = TieBreak::Custom(vec![Category::Good, Category::Poor]);
        assert!(matches!(
            partial.validate(),
            Err(EngineError::InvalidPriority { .. })
        ));

        let mut duplicated = Category::ALL.to_vec();
        duplicated[0] = Category::Good;
        assert!(TieBreak::Custom(duplicated).validate().is_err());

        let custom = TieBreak::Custom(vec![
            Category::Satisfactory,
            Category::Good,
            Category::Excellent,
            Category::NeedsImprovement,
            Category::Poor,
        ]);
        assert!(custom.validate().is_ok());
        assert_eq!(custom.priority()[0], Category::Satisfactory);
    }
}
