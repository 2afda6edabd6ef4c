use std::collections::hash_map::Entry;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;

use crate::algorithms::Aggregator;
use crate::graph::builder::GraphBuilder;
use crate::graph::Graph;
use crate::{Error, Result, Weight};

const UNMATCHED: usize = usize::MAX;

/// Mapping from every fine vertex onto a coarse vertex in `[0, num_coarse)`.
///
/// Each coarse vertex is reached by one or two fine vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    fine_to_coarse: Vec<usize>,
    num_coarse: usize,
}

impl Aggregation {
    pub fn new(fine_to_coarse: Vec<usize>, num_coarse: usize) -> Result<Self> {
        let mut group_sizes = vec![0; num_coarse];
        for &coarse_vertex in &fine_to_coarse {
            let size = group_sizes
                .get_mut(coarse_vertex)
                .ok_or(Error::VertexOutOfRange { index: coarse_vertex, len: num_coarse })?;
            *size += 1;
        }
        if let Some((coarse, &members)) = group_sizes.iter().enumerate().find(|(_, &s)| s == 0 || s > 2) {
            return Err(Error::AggregationMismatch { coarse, members });
        }
        Ok(Self { fine_to_coarse, num_coarse })
    }

    pub fn num_fine(&self) -> usize {
        self.fine_to_coarse.len()
    }

    pub fn num_coarse(&self) -> usize {
        self.num_coarse
    }

    pub fn coarse_vertex(&self, fine_vertex: usize) -> usize {
        self.fine_to_coarse[fine_vertex]
    }

    /// The coarse vertex of every fine vertex, indexed by fine vertex.
    pub fn mapping(&self) -> &[usize] {
        &self.fine_to_coarse
    }

    /// Number of fine vertices collapsed into each coarse vertex.
    pub fn group_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_coarse];
        for &coarse_vertex in &self.fine_to_coarse {
            sizes[coarse_vertex] += 1;
        }
        sizes
    }

    /// The fine vertices of every coarse vertex, in increasing fine index.
    pub fn members(&self) -> Vec<(usize, Option<usize>)> {
        let mut members = vec![(UNMATCHED, None); self.num_coarse];
        for (fine_vertex, &coarse_vertex) in self.fine_to_coarse.iter().enumerate() {
            let group = &mut members[coarse_vertex];
            if group.0 == UNMATCHED {
                group.0 = fine_vertex;
            } else {
                group.1 = Some(fine_vertex);
            }
        }
        members
    }

    /// Synthesize the coarse graph: a coarse vertex weighs as much as its
    /// members, and edges between members of two coarse vertices are merged
    /// into one edge carrying their summed weight. Edges inside a group vanish.
    pub fn coarsen(&self, fine_graph: &Graph) -> Result<Graph> {
        if fine_graph.len() != self.num_fine() {
            return Err(Error::InputLenMismatch {
                expected: self.num_fine(),
                actual: fine_graph.len(),
            });
        }

        let mut builder = GraphBuilder::with_capacity(self.num_coarse, fine_graph.num_edges());

        // Position of every coarse neighbor in the adjacency under construction.
        let mut slots: FxHashMap<usize, usize> = FxHashMap::default();
        let mut neighbors = Vec::new();
        let mut edge_weights: Vec<Weight> = Vec::new();

        for (coarse_vertex, (first, second)) in self.members().into_iter().enumerate() {
            slots.clear();
            neighbors.clear();
            edge_weights.clear();
            let mut vertex_weight = 0;

            for fine_vertex in std::iter::once(first).chain(second) {
                vertex_weight += fine_graph.vertex_weight(fine_vertex);

                for (fine_neighbor, edge_weight) in fine_graph.neighbors(fine_vertex) {
                    let coarse_neighbor = self.fine_to_coarse[fine_neighbor];
                    if coarse_neighbor == coarse_vertex {
                        continue;
                    }
                    match slots.entry(coarse_neighbor) {
                        Entry::Occupied(slot) => edge_weights[*slot.get()] += edge_weight,
                        Entry::Vacant(slot) => {
                            slot.insert(neighbors.len());
                            neighbors.push(coarse_neighbor);
                            edge_weights.push(edge_weight);
                        }
                    }
                }
            }

            builder.add_vertex(vertex_weight, neighbors.len(), &neighbors, &edge_weights)?;
        }

        builder.finish()
    }
}

/// How a driver vertex picks its partner among its unmatched neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchingRule {
    /// The neighbor joined by the heaviest edge; ties are broken uniformly at random.
    #[default]
    HeavyEdge,
    /// Any unmatched neighbor, uniformly at random.
    Random,
}

/// Pairwise matching driven by a uniformly random permutation of the vertices.
///
/// Every vertex is visited once. An unmatched vertex is paired with one of
/// its unmatched neighbors (see [`MatchingRule`]) or becomes a coarse vertex
/// on its own when all of its neighbors are taken.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomMatchingAggregator {
    pub rule: MatchingRule,
}

impl RandomMatchingAggregator {
    fn select_partner(
        &self,
        graph: &Graph,
        vertex: usize,
        fine_to_coarse: &[usize],
        rng: &mut SmallRng,
    ) -> Option<usize> {
        let mut partner = None;
        let mut best_key = 0;
        let mut ties = 0u32;

        for (neighbor, edge_weight) in graph.neighbors(vertex) {
            // Ensure the candidate is not already matched.
            if neighbor == vertex || fine_to_coarse[neighbor] != UNMATCHED {
                continue;
            }
            let key = match self.rule {
                MatchingRule::HeavyEdge => edge_weight,
                MatchingRule::Random => 0,
            };
            if partner.is_none() || key > best_key {
                partner = Some(neighbor);
                best_key = key;
                ties = 1;
            } else if key == best_key {
                // Reservoir sampling keeps each tied candidate with equal probability.
                ties += 1;
                if rng.gen_range(0..ties) == 0 {
                    partner = Some(neighbor);
                }
            }
        }

        partner
    }
}

impl Aggregator for RandomMatchingAggregator {
    fn aggregate(&self, graph: &Graph, rng: &mut SmallRng) -> Aggregation {
        let mut fine_to_coarse = vec![UNMATCHED; graph.len()];

        let mut vertices: Vec<usize> = (0..graph.len()).collect();
        vertices.shuffle(rng);
        let mut super_vertex = 0usize;

        for vertex in vertices {
            // If already matched, then ignore
            if fine_to_coarse[vertex] != UNMATCHED {
                continue;
            }
            let partner = self.select_partner(graph, vertex, &fine_to_coarse, rng);

            fine_to_coarse[vertex] = super_vertex;
            if let Some(partner) = partner {
                fine_to_coarse[partner] = super_vertex;
            }
            super_vertex += 1;
        }

        Aggregation { fine_to_coarse, num_coarse: super_vertex }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use crate::generators::{grid_graph, random_graph, star_graph};
    use super::*;

    #[test]
    fn test_heavy_edge_matching_pairs_heaviest_neighbors() {
        // Arrange
        // 0 -10- 1 -1- 2 -10- 3
        let graph = GraphBuilder::from_edges(vec![1, 2, 3, 4], &[(0, 1, 10), (1, 2, 1), (2, 3, 10)]).unwrap();
        let mut rng = SmallRng::seed_from_u64(5);

        // Act
        let aggregation = RandomMatchingAggregator::default().aggregate(&graph, &mut rng);
        let coarse_graph = aggregation.coarsen(&graph).unwrap();

        // Assert
        let mapping = aggregation.mapping();
        assert_eq!(aggregation.num_coarse(), 2);
        assert_eq!(mapping[0], mapping[1]);
        assert_eq!(mapping[2], mapping[3]);
        assert_ne!(mapping[0], mapping[2]);

        assert_eq!(coarse_graph.len(), 2);
        assert_eq!(coarse_graph.num_edges(), 2);
        assert_eq!(coarse_graph.vertex_weight(mapping[0]), 3);
        assert_eq!(coarse_graph.vertex_weight(mapping[2]), 7);
        assert_eq!(coarse_graph.get_edge_weight(0, 1), Some(1));
        assert_eq!(coarse_graph.get_edge_weight(1, 0), Some(1));
    }

    #[test]
    fn test_3_node_heavy_edge_matching_coarse() {
        // Arrange
        let graph = GraphBuilder::from_edges(vec![3, 4, 5], &[(0, 1, 5), (0, 2, 10), (1, 2, 15)]).unwrap();
        let mut rng = SmallRng::seed_from_u64(5);

        // Act
        let aggregation = RandomMatchingAggregator::default().aggregate(&graph, &mut rng);
        let coarse_graph = aggregation.coarsen(&graph).unwrap();

        // Assert
        assert_eq!(aggregation.num_coarse(), 2);
        assert_eq!(coarse_graph.total_weight(), 12);
        let (pair, _single) = aggregation
            .members()
            .into_iter()
            .partition::<Vec<_>, _>(|(_, second)| second.is_some());
        let (first, second) = pair[0];
        let internal = graph.get_edge_weight(first, second.unwrap()).unwrap();
        assert_eq!(coarse_graph.get_edge_weight(0, 1), Some(30 - internal));
        assert_eq!(coarse_graph.get_edge_weight(1, 0), Some(30 - internal));
        assert!(coarse_graph.get_edge_weight(0, 0).is_none());
        assert!(coarse_graph.get_edge_weight(1, 1).is_none());
    }

    #[test]
    fn test_coarsen_merges_parallel_edges() {
        // Arrange
        // 0 -3- 1
        // 6     5
        // 3 -4- 2
        let graph = GraphBuilder::from_edges(
            vec![1, 2, 3, 4],
            &[(0, 1, 3), (1, 2, 5), (2, 3, 4), (3, 0, 6)],
        )
        .unwrap();
        let aggregation = Aggregation::new(vec![0, 0, 1, 1], 2).unwrap();

        // Act
        let coarse_graph = aggregation.coarsen(&graph).unwrap();

        // Assert
        assert_eq!(coarse_graph.len(), 2);
        assert_eq!(coarse_graph.num_edges(), 2);
        assert_eq!(coarse_graph.degree(0), 1);
        assert_eq!(coarse_graph.get_edge_weight(0, 1), Some(11));
        assert_eq!(coarse_graph.vertex_weights(), &[3, 7]);
        assert_eq!(aggregation.members(), vec![(0, Some(1)), (2, Some(3))]);
        assert_eq!(aggregation.group_sizes(), vec![2, 2]);
    }

    #[test]
    fn test_invalid_aggregations() {
        assert_eq!(
            Aggregation::new(vec![0, 0, 0], 1),
            Err(Error::AggregationMismatch { coarse: 0, members: 3 })
        );
        assert_eq!(
            Aggregation::new(vec![0, 2], 3),
            Err(Error::AggregationMismatch { coarse: 1, members: 0 })
        );
        assert_eq!(
            Aggregation::new(vec![0, 5], 2),
            Err(Error::VertexOutOfRange { index: 5, len: 2 })
        );
        let aggregation = Aggregation::new(vec![0, 1], 2).unwrap();
        assert!(aggregation.coarsen(&star_graph(3)).is_err());
    }

    #[test]
    fn test_star_collapses_one_leaf() {
        // Arrange
        let graph = star_graph(6);
        let mut rng = SmallRng::seed_from_u64(11);

        // Act
        let aggregation = RandomMatchingAggregator { rule: MatchingRule::Random }.aggregate(&graph, &mut rng);

        // Assert
        assert_eq!(aggregation.num_coarse(), 6);
        assert_eq!(aggregation.group_sizes().iter().filter(|&&s| s == 2).count(), 1);
    }

    #[test]
    fn test_aggregation_is_reproducible() {
        let graph = grid_graph(6, 7, 8);
        let aggregator = RandomMatchingAggregator::default();
        let first = aggregator.aggregate(&graph, &mut SmallRng::seed_from_u64(42));
        let second = aggregator.aggregate(&graph, &mut SmallRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_grid_aggregation_ratio() {
        // Arrange
        let graph = grid_graph(30, 40, 50);
        let n = graph.len();
        let mut rng = SmallRng::seed_from_u64(7);

        // Act
        let aggregation = RandomMatchingAggregator::default().aggregate(&graph, &mut rng);

        // Assert
        assert_eq!(n, 60000);
        assert!(aggregation.num_coarse() >= n / 2);
        assert!((aggregation.num_coarse() as f64) < 0.6 * n as f64, "{} coarse vertices", aggregation.num_coarse());
    }

    proptest! {
        #[test]
        fn prop_matching_halves_at_most(
            n in 1usize..60,
            edge_prob in 0.0f64..0.8f64,
            heavy_edge in any::<bool>(),
            seed in any::<u64>(),
        ) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let graph = random_graph(n, edge_prob, &mut rng);
            let rule = if heavy_edge { MatchingRule::HeavyEdge } else { MatchingRule::Random };

            let aggregation = RandomMatchingAggregator { rule }.aggregate(&graph, &mut rng);

            prop_assert!(aggregation.num_coarse() >= (n + 1) / 2);
            prop_assert!(aggregation.num_coarse() <= n);
            prop_assert!(aggregation.group_sizes().iter().all(|&s| s == 1 || s == 2));
            prop_assert!(Aggregation::new(aggregation.mapping().to_vec(), aggregation.num_coarse()).is_ok());
            for (first, second) in aggregation.members() {
                if let Some(second) = second {
                    prop_assert!(graph.get_edge_weight(first, second).is_some());
                }
            }
        }

        #[test]
        fn prop_coarse_cut_matches_projected_cut(
            n in 2usize..50,
            edge_prob in 0.05f64..0.7f64,
            seed in any::<u64>(),
        ) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let graph = random_graph(n, edge_prob, &mut rng);
            let aggregation = RandomMatchingAggregator::default().aggregate(&graph, &mut rng);
            let coarse_graph = aggregation.coarsen(&graph).unwrap();
            let coarse_parts: Vec<usize> = (0..coarse_graph.len()).map(|_| rng.gen_range(0..3)).collect();
            let fine_parts: Vec<usize> = aggregation.mapping().iter().map(|&c| coarse_parts[c]).collect();

            prop_assert_eq!(coarse_graph.total_weight(), graph.total_weight());
            prop_assert_eq!(coarse_graph.edge_cut(&coarse_parts), graph.edge_cut(&fine_parts));
        }
    }
}
