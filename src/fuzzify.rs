use crate::membership::PartitionSet;
use crate::models::{MembershipVector, Metric, MetricInput};

/// Maps each of the five raw metrics onto its Low/Medium/High degrees.
pub fn fuzzify(partitions: &PartitionSet, input: &MetricInput) -> MembershipVector {
    let mut vector = MembershipVector::default();
    for metric in Metric::ALL {
        *vector.get_mut(metric) = partitions.membership(metric, input.value(metric));
    }
    vector
}
