// This file has code from https://github.com/LIHPC-Computational-Geometry/coupe

use num_traits::ToPrimitive;

use crate::params::PartitionParams;
use crate::Weight;

/// Calculates the total weight for each part of a given partition.
pub fn compute_parts_load(partition: &[usize], num_parts: usize, weights: &[Weight]) -> Vec<Weight> {
    let mut loads = vec![0; num_parts];

    for (&part, w) in partition.iter().zip(weights) {
        if part < num_parts {
            loads[part] += w;
        }
    }

    loads
}

/// Compute imbalance after passing part loads.
///
/// The imbalance is the largest relative overshoot of a part above its
/// target share; a perfectly balanced partition has an imbalance of zero.
pub fn compute_imbalance_from_part_loads(params: &PartitionParams, part_loads: &[Weight]) -> f64 {
    debug_assert_eq!(part_loads.len(), params.num_parts());
    let total_weight: Weight = part_loads.iter().sum();

    part_loads
        .iter()
        .enumerate()
        .filter_map(|(part, &part_weight)| {
            let ideal_part_weight = params.target_weight(part, total_weight);
            if ideal_part_weight == 0.0 {
                return None;
            }
            let part_weight = part_weight.to_f64().unwrap_or(0.0);
            Some((part_weight - ideal_part_weight) / ideal_part_weight)
        })
        .fold(0.0f64, |acc, dev| acc.max(dev))
}

/// Compute the imbalance of the given partition.
pub fn imbalance(params: &PartitionParams, partition: &[usize], weights: &[Weight]) -> f64 {
    let part_loads = compute_parts_load(partition, params.num_parts(), weights);

    compute_imbalance_from_part_loads(params, &part_loads)
}

#[cfg(test)]
mod tests {
    use approx::assert_ulps_eq;
    use itertools::assert_equal;
    use crate::imbalance::{compute_parts_load, imbalance};
    use crate::params::PartitionParams;

    #[test]
    fn test_compute_parts_load() {
        // Arrange
        let partition = [0, 0, 1, 1];
        let vtx_weights = vec![4, 7, 5, 2];
        let num_parts = 2;

        // Act
        let partition_weights = compute_parts_load(&partition, num_parts, &vtx_weights);

        // Assert
        assert_equal(partition_weights, [11, 7]);
    }

    #[test]
    fn test_imbalance() {
        // Arrange
        let partition = [0, 0, 1, 1];
        let vtx_weights = vec![3, 3, 2, 2];
        let params = PartitionParams::new(2, 0.05).unwrap();

        // Act
        let imb = imbalance(&params, &partition, &vtx_weights);

        // Assert
        assert_ulps_eq!(imb, 0.2);
    }

    #[test]
    fn test_imbalance_with_uneven_targets() {
        // Arrange
        let partition = [0, 1, 1, 1];
        let vtx_weights = vec![1, 1, 1, 1];
        let params = PartitionParams::new(2, 0.05)
            .unwrap()
            .with_target_fractions(vec![1.0, 3.0])
            .unwrap();

        // Act
        let imb = imbalance(&params, &partition, &vtx_weights);

        // Assert
        assert_ulps_eq!(imb, 0.0);
    }
}
