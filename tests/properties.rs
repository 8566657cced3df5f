use proptest::prelude::*;

use fuzzy_performance::membership::PartitionSet;
use fuzzy_performance::{Classification, Engine, Metric, MetricInput};

fn metric_strategy() -> impl Strategy<Value = Metric> {
    prop::sample::select(Metric::ALL.to_vec())
}

fn input_strategy() -> impl Strategy<Value = MetricInput> {
    (
        0.0..=4.0f64,
        0.0..=100.0f64,
        0.0..=1.0f64,
        0.0..=100.0f64,
        0.0..=100.0f64,
    )
        .prop_map(|(gpa, cca, attendance, midterm, final_exam)| MetricInput {
            gpa,
            cca,
            attendance,
            midterm,
            final_exam,
        })
}

fn scaled(metric: Metric, unit: f64) -> f64 {
    let (min, max) = metric.domain();
    min + (max - min) * unit
}

proptest! {
    #[test]
    fn memberships_stay_in_unit_interval(metric in metric_strategy(), raw in -1000.0..1000.0f64) {
        let membership = PartitionSet::default().membership(metric, raw);
        for degree in [membership.low, membership.medium, membership.high] {
            prop_assert!((0.0..=1.0).contains(&degree));
        }
        prop_assert!(membership.low + membership.high <= 1.0);
    }

    #[test]
    fn low_falls_and_high_rises(metric in metric_strategy(), a in 0.0..=1.0f64, b in 0.0..=1.0f64) {
        let set = PartitionSet::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let first = set.membership(metric, scaled(metric, lo));
        let second = set.membership(metric, scaled(metric, hi));
        prop_assert!(first.low >= second.low);
        prop_assert!(first.high <= second.high);
    }

    #[test]
    fn curves_are_continuous(metric in metric_strategy(), unit in 0.0..=1.0f64) {
        let set = PartitionSet::default();
        let (min, max) = metric.domain();
        let step = (max - min) * 1e-9;
        let x = scaled(metric, unit);
        let here = set.membership(metric, x);
        let next = set.membership(metric, x + step);
        prop_assert!((here.low - next.low).abs() < 1e-6);
        prop_assert!((here.medium - next.medium).abs() < 1e-6);
        prop_assert!((here.high - next.high).abs() < 1e-6);
    }

    #[test]
    fn clamping_is_idempotent(metric in metric_strategy(), factor in 1.0..10.0f64) {
        let set = PartitionSet::default();
        let (_, max) = metric.domain();
        prop_assert_eq!(set.membership(metric, max * factor), set.membership(metric, max));
    }

    #[test]
    fn classification_is_deterministic(input in input_strategy()) {
        let engine = Engine::default();
        let first = engine.classify(&input).unwrap();
        let second = engine.classify(&input).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert!(first.clamped.is_empty());
    }

    #[test]
    fn undetermined_exactly_when_nothing_fired(input in input_strategy()) {
        let result = Engine::default().classify(&input).unwrap();
        let undetermined = result.category == Classification::Undetermined;
        prop_assert_eq!(undetermined, result.fired_rules.is_empty());
        prop_assert_eq!(undetermined, result.inference_output.is_all_zero());
    }
}
