use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::algorithms::MultiLevelPartitioner;
use crate::graph::subgraph::partitions;
use crate::graph::Graph;
use crate::params::PartitionParams;
use crate::partitioning::Partitioning;
use crate::{Error, Partition, Result};

/// k-way partitioning by recursive multilevel bisection.
///
/// The parts are split into a lower and an upper half; the graph is bisected
/// with the summed target fractions of both halves, and both induced
/// subgraphs are partitioned recursively into their half of the parts.
/// Every bisection uses [`PartitionParams::bisection_tolerance`] so the nested
/// imbalances compound to the requested tolerance.
///
/// # Example
///
/// ```rust
/// use mlpart::algorithms::{MultiLevelPartitioner, RecursiveBisection};
/// use mlpart::generators::grid_graph;
/// use mlpart::PartitionParams;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let graph = grid_graph(8, 8, 8);
/// let params = PartitionParams::new(4, 0.05)?;
/// let multilevel = MultiLevelPartitioner { seed: Some(1), ..Default::default() };
///
/// let partitioning = RecursiveBisection { multilevel }.partition_graph(&graph, &params)?;
///
/// assert_eq!(partitioning.num_parts(), 4);
/// assert!(partitioning.imbalance(&params) <= 0.05);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursiveBisection {
    /// Engine used for every bisection. Its seed seeds the whole recursion.
    pub multilevel: MultiLevelPartitioner,
}

impl RecursiveBisection {
    pub fn partition_graph(&self, graph: &Graph, params: &PartitionParams) -> Result<Partitioning> {
        let mut rng = match self.multilevel.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let mut parts = vec![0; graph.len()];
        let super_map: Vec<usize> = (0..graph.len()).collect();
        self.split(
            graph,
            &super_map,
            params.target_fractions(),
            0,
            params.bisection_tolerance(),
            &mut parts,
            &mut rng,
        )?;

        Partitioning::from_assignment(graph, params.num_parts(), parts)
    }

    // Assigns the vertices of `graph` to parts `first_part..first_part + fractions.len()`,
    // writing to `parts` through `super_map`.
    #[allow(clippy::too_many_arguments)]
    fn split(
        &self,
        graph: &Graph,
        super_map: &[usize],
        fractions: &[f64],
        first_part: usize,
        tolerance: f64,
        parts: &mut [usize],
        rng: &mut SmallRng,
    ) -> Result<()> {
        if fractions.len() == 1 {
            for &vertex in super_map {
                parts[vertex] = first_part;
            }
            return Ok(());
        }

        let mid = fractions.len() / 2;
        let (lower, upper) = fractions.split_at(mid);
        let params = PartitionParams::new(2, tolerance)?
            .with_target_fractions(vec![lower.iter().sum(), upper.iter().sum()])?;

        let (bisection, stats) = self.multilevel.bisect_with_rng(graph, &params, rng)?;
        debug!(
            "parts {first_part}..{}: bisected {} vertices, cut {}, {} levels",
            first_part + fractions.len(),
            graph.len(),
            bisection.cut_weight(),
            stats.levels.len()
        );

        let halves = [(lower, first_part), (upper, first_part + mid)];
        for (subgraph, (fractions, first_part)) in partitions(graph, &bisection)?.iter().zip(halves) {
            let super_map: Vec<usize> = subgraph.super_map().iter().map(|&local| super_map[local]).collect();
            self.split(subgraph.graph(), &super_map, fractions, first_part, tolerance, parts, rng)?;
        }
        Ok(())
    }
}

impl<'a> Partition<(&'a Graph, &'a PartitionParams)> for RecursiveBisection {
    type Metadata = ();
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        (graph, params): (&'a Graph, &'a PartitionParams),
    ) -> std::result::Result<Self::Metadata, Self::Error> {
        if part_ids.len() != graph.len() {
            return Err(Error::InputLenMismatch {
                expected: graph.len(),
                actual: part_ids.len(),
            });
        }
        let partitioning = self.partition_graph(graph, params)?;
        part_ids.copy_from_slice(partitioning.parts());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::generators::{grid_graph, random_weights};
    use crate::imbalance::imbalance;
    use super::*;

    fn recursive_bisection(seed: u64) -> RecursiveBisection {
        RecursiveBisection {
            multilevel: MultiLevelPartitioner { seed: Some(seed), ..Default::default() },
        }
    }

    #[test]
    fn test_4_way_partition_of_grid() {
        // Arrange
        let graph = grid_graph(10, 11, 12);
        let params = PartitionParams::new(4, 0.05).unwrap();

        // Act
        let partitioning = recursive_bisection(5).partition_graph(&graph, &params).unwrap();

        // Assert
        assert_eq!(partitioning.num_parts(), 4);
        for part in 0..4 {
            assert!(partitioning.part_weight(part) > 0);
            assert!(partitioning.part_weight(part) <= params.max_part_weight(part, graph.total_weight()));
        }
        assert!(partitioning.imbalance(&params) <= 0.05);
        assert_eq!(partitioning.cut_weight(), graph.edge_cut(partitioning.parts()));
    }

    #[test]
    fn test_3_way_partition_with_weights() {
        // Arrange
        let mut rng = SmallRng::seed_from_u64(4);
        let weights = random_weights(12 * 12 * 12, 1, 3, &mut rng).unwrap();
        let graph = grid_graph(12, 12, 12).with_vertex_weights(weights.clone()).unwrap();
        let params = PartitionParams::new(3, 0.1).unwrap();

        // Act
        let partitioning = recursive_bisection(7).partition_graph(&graph, &params).unwrap();

        // Assert
        assert!(partitioning.parts().iter().all(|&part| part < 3));
        assert!(partitioning.part_weights().iter().all(|&weight| weight > 0));
        assert!(imbalance(&params, partitioning.parts(), &weights) <= 0.1);
    }

    #[test]
    fn test_single_part() {
        let graph = grid_graph(3, 3, 3);
        let params = PartitionParams::new(1, 0.0).unwrap();
        let partitioning = recursive_bisection(0).partition_graph(&graph, &params).unwrap();
        assert!(partitioning.parts().iter().all(|&part| part == 0));
        assert_eq!(partitioning.cut_weight(), 0);
    }

    #[test]
    fn test_partition_trait_fills_part_ids() {
        // Arrange
        let graph = grid_graph(8, 8, 4);
        let params = PartitionParams::new(8, 0.1).unwrap();
        let mut partition = vec![0; graph.len()];

        // Act
        recursive_bisection(3).partition(&mut partition, (&graph, &params)).unwrap();

        // Assert
        for part in 0..8 {
            assert!(partition.contains(&part));
        }
        assert!(imbalance(&params, &partition, graph.vertex_weights()) <= 0.1);
    }

    #[test]
    fn test_same_seed_same_partition() {
        let graph = grid_graph(9, 9, 9);
        let params = PartitionParams::new(5, 0.05).unwrap();
        let first = recursive_bisection(21).partition_graph(&graph, &params).unwrap();
        let second = recursive_bisection(21).partition_graph(&graph, &params).unwrap();
        assert_eq!(first, second);
    }
}
