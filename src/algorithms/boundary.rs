// Two-way boundary and gain bookkeeping, in the spirit of the internal/external
// degree arrays and boundary list kept by METIS during 2-way refinement.

use crate::graph::Graph;
use crate::partitioning::Partitioning;
use crate::{Error, Result, Weight};

/// Per-vertex gains and the set of boundary vertices of a bisection.
///
/// The tracker is a cache derived from a [`Partitioning`]; it does not own or
/// observe it. After every [`Partitioning::move_vertex`] the caller must call
/// [`BoundaryTracker::update`] with the moved vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryTracker {
    /// Weight of the edges towards the vertex's own side.
    internal: Vec<Weight>,
    /// Weight of the edges towards the other side.
    external: Vec<Weight>,
    /// Number of edges towards the other side.
    external_edges: Vec<usize>,
    boundary: Vec<usize>,
    /// Slot of every vertex in `boundary`.
    position: Vec<Option<usize>>,
}

impl BoundaryTracker {
    pub fn new(graph: &Graph, partitioning: &Partitioning) -> Result<Self> {
        if partitioning.num_parts() != 2 {
            return Err(Error::BiPartitioningOnly(partitioning.num_parts()));
        }
        if partitioning.len() != graph.len() {
            return Err(Error::InputLenMismatch {
                expected: graph.len(),
                actual: partitioning.len(),
            });
        }

        let n = graph.len();
        let mut tracker = Self {
            internal: vec![0; n],
            external: vec![0; n],
            external_edges: vec![0; n],
            boundary: Vec::new(),
            position: vec![None; n],
        };
        for vertex in 0..n {
            tracker.compute(graph, partitioning, vertex);
            tracker.refresh_membership(vertex);
        }
        Ok(tracker)
    }

    pub fn len(&self) -> usize {
        self.internal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_empty()
    }

    /// Cut decrease obtained by moving `vertex` to the other side.
    pub fn gain(&self, vertex: usize) -> Weight {
        self.external[vertex] - self.internal[vertex]
    }

    pub fn internal_weight(&self, vertex: usize) -> Weight {
        self.internal[vertex]
    }

    pub fn external_weight(&self, vertex: usize) -> Weight {
        self.external[vertex]
    }

    pub fn is_boundary(&self, vertex: usize) -> bool {
        self.position[vertex].is_some()
    }

    /// Boundary vertices, in no particular order.
    pub fn boundary(&self) -> &[usize] {
        &self.boundary
    }

    /// Account for `moved` having just switched sides in `partitioning`.
    pub fn update(&mut self, graph: &Graph, partitioning: &Partitioning, moved: usize) {
        let side = partitioning.part(moved);

        // Every edge of the moved vertex changes from internal to external and back.
        std::mem::swap(&mut self.internal[moved], &mut self.external[moved]);
        let non_loop_edges = graph.neighbors(moved).filter(|&(neighbor, _)| neighbor != moved).count();
        self.external_edges[moved] = non_loop_edges - self.external_edges[moved];
        self.refresh_membership(moved);

        for (neighbor, edge_weight) in graph.neighbors(moved) {
            if neighbor == moved {
                continue;
            }
            if partitioning.part(neighbor) == side {
                self.internal[neighbor] += edge_weight;
                self.external[neighbor] -= edge_weight;
                self.external_edges[neighbor] -= 1;
            } else {
                self.internal[neighbor] -= edge_weight;
                self.external[neighbor] += edge_weight;
                self.external_edges[neighbor] += 1;
            }
            self.refresh_membership(neighbor);
        }
    }

    fn compute(&mut self, graph: &Graph, partitioning: &Partitioning, vertex: usize) {
        let side = partitioning.part(vertex);
        let (mut internal, mut external, mut external_edges) = (0, 0, 0);
        for (neighbor, edge_weight) in graph.neighbors(vertex) {
            if neighbor == vertex {
                continue;
            }
            if partitioning.part(neighbor) == side {
                internal += edge_weight;
            } else {
                external += edge_weight;
                external_edges += 1;
            }
        }
        self.internal[vertex] = internal;
        self.external[vertex] = external;
        self.external_edges[vertex] = external_edges;
    }

    fn refresh_membership(&mut self, vertex: usize) {
        match (self.external_edges[vertex] > 0, self.position[vertex]) {
            (true, None) => {
                self.position[vertex] = Some(self.boundary.len());
                self.boundary.push(vertex);
            }
            (false, Some(slot)) => {
                self.boundary.swap_remove(slot);
                if let Some(&swapped) = self.boundary.get(slot) {
                    self.position[swapped] = Some(slot);
                }
                self.position[vertex] = None;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use crate::generators::{grid_graph, random_graph};
    use crate::graph::builder::GraphBuilder;
    use super::*;

    fn sorted(vertices: &[usize]) -> Vec<usize> {
        let mut vertices = vertices.to_vec();
        vertices.sort_unstable();
        vertices
    }

    #[test]
    fn test_gains_on_path() {
        // Arrange
        // 0 -3- 1 -2- 2 -5- 3
        let graph = GraphBuilder::from_edges(vec![1; 4], &[(0, 1, 3), (1, 2, 2), (2, 3, 5)]).unwrap();
        let partitioning = Partitioning::from_assignment(&graph, 2, vec![0, 0, 1, 1]).unwrap();

        // Act
        let tracker = BoundaryTracker::new(&graph, &partitioning).unwrap();

        // Assert
        assert_eq!(tracker.gain(0), -3);
        assert_eq!(tracker.gain(1), -1);
        assert_eq!(tracker.gain(2), -3);
        assert_eq!(tracker.gain(3), -5);
        assert_eq!(tracker.internal_weight(1), 3);
        assert_eq!(tracker.external_weight(1), 2);
        assert_eq!(sorted(tracker.boundary()), vec![1, 2]);
        assert!(!tracker.is_boundary(0));
    }

    #[test]
    fn test_update_after_move() {
        // Arrange
        let graph = GraphBuilder::from_edges(vec![1; 4], &[(0, 1, 3), (1, 2, 2), (2, 3, 5)]).unwrap();
        let mut partitioning = Partitioning::from_assignment(&graph, 2, vec![0, 0, 1, 1]).unwrap();
        let mut tracker = BoundaryTracker::new(&graph, &partitioning).unwrap();

        // Act
        partitioning.move_vertex(&graph, 1, 1).unwrap();
        tracker.update(&graph, &partitioning, 1);

        // Assert
        assert_eq!(tracker.gain(1), 1);
        assert_eq!(tracker.gain(0), 3);
        assert_eq!(tracker.gain(2), -7);
        assert_eq!(sorted(tracker.boundary()), vec![0, 1]);
    }

    #[test]
    fn test_zero_weight_edges_still_make_a_boundary() {
        let graph = GraphBuilder::from_edges(vec![1; 2], &[(0, 1, 0)]).unwrap();
        let partitioning = Partitioning::from_assignment(&graph, 2, vec![0, 1]).unwrap();
        let tracker = BoundaryTracker::new(&graph, &partitioning).unwrap();
        assert_eq!(sorted(tracker.boundary()), vec![0, 1]);
        assert_eq!(tracker.gain(0), 0);
    }

    #[test]
    fn test_k_way_partitioning_is_rejected() {
        let graph = grid_graph(2, 2, 2);
        let partitioning = Partitioning::new(&graph, 3).unwrap();
        assert_eq!(BoundaryTracker::new(&graph, &partitioning), Err(Error::BiPartitioningOnly(3)));
    }

    #[test]
    fn test_incremental_updates_match_rebuild() {
        // Arrange
        let mut rng = SmallRng::seed_from_u64(3);
        let graph = random_graph(80, 0.1, &mut rng);
        let parts = (0..graph.len()).map(|_| rng.gen_range(0..2)).collect();
        let mut partitioning = Partitioning::from_assignment(&graph, 2, parts).unwrap();
        let mut tracker = BoundaryTracker::new(&graph, &partitioning).unwrap();

        for _ in 0..500 {
            // Act
            let vertex = rng.gen_range(0..graph.len());
            let to = 1 - partitioning.part(vertex);
            partitioning.move_vertex(&graph, vertex, to).unwrap();
            tracker.update(&graph, &partitioning, vertex);

            // Assert
            let rebuilt = BoundaryTracker::new(&graph, &partitioning).unwrap();
            for v in 0..graph.len() {
                assert_eq!(tracker.gain(v), rebuilt.gain(v));
                assert_eq!(tracker.is_boundary(v), rebuilt.is_boundary(v));
            }
            assert_eq!(sorted(tracker.boundary()), sorted(rebuilt.boundary()));
        }
    }
}
