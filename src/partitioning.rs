use crate::algorithms::Aggregation;
use crate::graph::Graph;
use crate::imbalance::compute_imbalance_from_part_loads;
use crate::params::PartitionParams;
use crate::{Error, Result, Weight};

/// Assignment of every vertex of one graph to a part, together with the
/// aggregate weight of each part and the running cut weight.
///
/// The graph is not stored; every method touching adjacency takes it as an
/// argument and must be handed the graph the partitioning was created for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partitioning {
    parts: Vec<usize>,
    part_weights: Vec<Weight>,
    cut: Weight,
}

impl Partitioning {
    /// Every vertex in part 0.
    pub fn new(graph: &Graph, num_parts: usize) -> Result<Self> {
        let mut partitioning = Self {
            parts: vec![0; graph.len()],
            part_weights: vec![0; num_parts],
            cut: 0,
        };
        partitioning.assign_all(graph, 0)?;
        Ok(partitioning)
    }

    /// Wrap an explicit assignment, computing part weights and the cut.
    pub fn from_assignment(graph: &Graph, num_parts: usize, parts: Vec<usize>) -> Result<Self> {
        if parts.len() != graph.len() {
            return Err(Error::InputLenMismatch {
                expected: graph.len(),
                actual: parts.len(),
            });
        }
        if let Some(&part) = parts.iter().find(|&&p| p >= num_parts) {
            return Err(Error::PartitionOutOfRange { part, num_parts });
        }

        let mut part_weights = vec![0; num_parts];
        for (vertex, &part) in parts.iter().enumerate() {
            part_weights[part] += graph.vertex_weight(vertex);
        }
        let cut = graph.edge_cut(&parts);
        Ok(Self { parts, part_weights, cut })
    }

    /// Put every vertex into `part`. The cut drops to zero.
    pub fn assign_all(&mut self, graph: &Graph, part: usize) -> Result<()> {
        debug_assert_eq!(self.parts.len(), graph.len());
        if part >= self.num_parts() {
            return Err(Error::PartitionOutOfRange { part, num_parts: self.num_parts() });
        }
        self.parts.fill(part);
        self.part_weights.fill(0);
        self.part_weights[part] = graph.total_weight();
        self.cut = 0;
        Ok(())
    }

    /// Move `vertex` to part `to`, updating part weights and the cut in
    /// O(degree). Moving into the current part or an unknown part is an error
    /// and leaves the state untouched.
    pub fn move_vertex(&mut self, graph: &Graph, vertex: usize, to: usize) -> Result<()> {
        debug_assert_eq!(self.parts.len(), graph.len());
        if vertex >= self.parts.len() {
            return Err(Error::VertexOutOfRange { index: vertex, len: self.parts.len() });
        }
        if to >= self.num_parts() {
            return Err(Error::PartitionOutOfRange { part: to, num_parts: self.num_parts() });
        }
        let from = self.parts[vertex];
        if from == to {
            return Err(Error::SamePartition { vertex, part: to });
        }

        for (neighbor, edge_weight) in graph.neighbors(vertex) {
            if neighbor == vertex {
                continue;
            }
            let neighbor_part = self.parts[neighbor];
            if neighbor_part == from {
                self.cut += edge_weight;
            } else if neighbor_part == to {
                self.cut -= edge_weight;
            }
        }

        let weight = graph.vertex_weight(vertex);
        self.part_weights[from] -= weight;
        self.part_weights[to] += weight;
        self.parts[vertex] = to;
        Ok(())
    }

    /// Carry this coarse assignment over to the finer graph the aggregation
    /// was computed on: every fine vertex inherits the part of its coarse vertex.
    pub fn project(&self, aggregation: &Aggregation, fine_graph: &Graph) -> Result<Self> {
        if aggregation.num_coarse() != self.parts.len() {
            return Err(Error::InputLenMismatch {
                expected: self.parts.len(),
                actual: aggregation.num_coarse(),
            });
        }
        let parts = aggregation
            .mapping()
            .iter()
            .map(|&coarse_vertex| self.parts[coarse_vertex])
            .collect();
        Self::from_assignment(fine_graph, self.num_parts(), parts)
    }

    pub fn num_parts(&self) -> usize {
        self.part_weights.len()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn part(&self, vertex: usize) -> usize {
        self.parts[vertex]
    }

    pub fn parts(&self) -> &[usize] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<usize> {
        self.parts
    }

    pub fn part_weight(&self, part: usize) -> Weight {
        self.part_weights[part]
    }

    pub fn part_weights(&self) -> &[Weight] {
        &self.part_weights
    }

    /// Total weight of the edges joining different parts, each undirected edge once.
    pub fn cut_weight(&self) -> Weight {
        self.cut
    }

    /// Largest relative overshoot of a part above its target weight.
    pub fn imbalance(&self, params: &PartitionParams) -> f64 {
        compute_imbalance_from_part_loads(params, &self.part_weights)
    }
}
