use crate::graph::Graph;
use crate::{Error, Result, Weight};

/// Incremental constructor for an immutable [`Graph`].
///
/// Vertices are appended in index order, each together with its complete
/// adjacency. Duplicate neighbors are kept as separate entries: merging
/// parallel edges is up to whoever assembles the neighbor lists.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    num_vertices: usize,
    offsets: Vec<usize>,
    targets: Vec<usize>,
    edge_weights: Vec<Weight>,
    vertex_weights: Vec<Weight>,
}

impl GraphBuilder {
    /// A builder expecting exactly `num_vertices` calls to [`GraphBuilder::add_vertex`].
    pub fn new(num_vertices: usize) -> Self {
        Self::with_capacity(num_vertices, 0)
    }

    pub fn with_capacity(num_vertices: usize, num_edges: usize) -> Self {
        let mut offsets = Vec::with_capacity(num_vertices + 1);
        offsets.push(0);
        Self {
            num_vertices,
            offsets,
            targets: Vec::with_capacity(num_edges),
            edge_weights: Vec::with_capacity(num_edges),
            vertex_weights: Vec::with_capacity(num_vertices),
        }
    }

    /// Number of vertices added so far; also the index the next vertex gets.
    pub fn num_added(&self) -> usize {
        self.vertex_weights.len()
    }

    /// Append the next vertex with the first `degree` entries of `neighbors`
    /// and `weights` as its adjacency. Returns the index of the new vertex.
    pub fn add_vertex(
        &mut self,
        weight: Weight,
        degree: usize,
        neighbors: &[usize],
        weights: &[Weight],
    ) -> Result<usize> {
        let vertex = self.num_added();
        if vertex == self.num_vertices {
            return Err(Error::VertexCountMismatch {
                expected: self.num_vertices,
                actual: vertex + 1,
            });
        }
        if neighbors.len() < degree || weights.len() < degree {
            return Err(Error::DegreeMismatch {
                vertex,
                degree,
                neighbors: neighbors.len(),
                weights: weights.len(),
            });
        }
        if weight < 0 || weights[..degree].iter().any(|&w| w < 0) {
            return Err(Error::NegativeValues);
        }

        self.targets.extend_from_slice(&neighbors[..degree]);
        self.edge_weights.extend_from_slice(&weights[..degree]);
        self.offsets.push(self.targets.len());
        self.vertex_weights.push(weight);
        Ok(vertex)
    }

    /// Freeze the accumulated adjacency into a [`Graph`].
    pub fn finish(self) -> Result<Graph> {
        if self.num_added() != self.num_vertices {
            return Err(Error::VertexCountMismatch {
                expected: self.num_vertices,
                actual: self.num_added(),
            });
        }
        if let Some(&index) = self.targets.iter().find(|&&t| t >= self.num_vertices) {
            return Err(Error::VertexOutOfRange { index, len: self.num_vertices });
        }
        Ok(Graph::from_raw_parts(
            self.offsets,
            self.targets,
            self.edge_weights,
            self.vertex_weights,
        ))
    }

    /// Build a symmetric graph from a list of undirected edges `(u, v, weight)`.
    ///
    /// Each edge is stored as `u -> v` and `v -> u`; adjacency order follows the
    /// order of the list.
    pub fn from_edges(vertex_weights: Vec<Weight>, edges: &[(usize, usize, Weight)]) -> Result<Graph> {
        let num_vertices = vertex_weights.len();
        let mut adjacency: Vec<(Vec<usize>, Vec<Weight>)> = vec![(Vec::new(), Vec::new()); num_vertices];

        for &(u, v, weight) in edges {
            for (from, to) in [(u, v), (v, u)] {
                let (neighbors, weights) = adjacency
                    .get_mut(from)
                    .ok_or(Error::VertexOutOfRange { index: from, len: num_vertices })?;
                neighbors.push(to);
                weights.push(weight);
            }
        }

        let mut builder = GraphBuilder::with_capacity(num_vertices, 2 * edges.len());
        for ((neighbors, weights), weight) in adjacency.iter().zip(vertex_weights) {
            builder.add_vertex(weight, neighbors.len(), neighbors, weights)?;
        }
        builder.finish()
    }
}
