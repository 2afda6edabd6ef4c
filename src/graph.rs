// This file has code from https://github.com/LIHPC-Computational-Geometry/coupe

use std::fmt;
use std::iter::{Cloned, FusedIterator, Zip};
use std::ops::Range;
use std::slice::Iter;

use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator};
use rayon::iter::ParallelIterator as _;

use crate::{Error, Result, Weight};

pub mod builder;
pub mod subgraph;

/// Struct that represents an undirected weighted graph.
///
/// The adjacency is stored in compressed form: the neighbors of vertex `v`
/// are `targets[offsets[v]..offsets[v + 1]]` with the matching edge weights
/// in `edge_weights`. Every undirected edge is stored once in each direction.
/// A graph is immutable once built, see [`builder::GraphBuilder`].
#[derive(Clone, PartialEq, Eq)]
pub struct Graph {
    offsets: Vec<usize>,
    targets: Vec<usize>,
    edge_weights: Vec<Weight>,
    vertex_weights: Vec<Weight>,
    total_weight: Weight,
}

impl Graph {

    /// Create a new graph without vertices.
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            targets: Vec::new(),
            edge_weights: Vec::new(),
            vertex_weights: Vec::new(),
            total_weight: 0,
        }
    }

    pub(crate) fn from_raw_parts(
        offsets: Vec<usize>,
        targets: Vec<usize>,
        edge_weights: Vec<Weight>,
        vertex_weights: Vec<Weight>,
    ) -> Self {
        debug_assert_eq!(offsets.len(), vertex_weights.len() + 1);
        debug_assert_eq!(targets.len(), edge_weights.len());
        debug_assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        let total_weight = vertex_weights.iter().sum();
        Self {
            offsets,
            targets,
            edge_weights,
            vertex_weights,
            total_weight,
        }
    }

    /// The number of vertices in the graph.
    pub fn len(&self) -> usize {
        self.vertex_weights.len()
    }

    /// Whether the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of adjacency entries, i.e. twice the number of undirected edges.
    pub fn num_edges(&self) -> usize {
        self.targets.len()
    }

    /// An iterator over the neighbors of the given vertex.
    pub fn neighbors(&self, vertex: usize) -> Zip<Cloned<Iter<'_, usize>>, Cloned<Iter<'_, Weight>>> {
        let range = self.edge_range(vertex);
        self.targets[range.clone()].iter().cloned().zip(self.edge_weights[range].iter().cloned())
    }

    pub fn degree(&self, vertex: usize) -> usize {
        self.offsets[vertex + 1] - self.offsets[vertex]
    }

    pub fn vertex_weight(&self, vertex: usize) -> Weight {
        self.vertex_weights[vertex]
    }

    pub fn vertex_weights(&self) -> &[Weight] {
        &self.vertex_weights
    }

    /// Sum of all vertex weights, computed once when the graph is built.
    pub fn total_weight(&self) -> Weight {
        self.total_weight
    }

    pub fn max_vertex_weight(&self) -> Weight {
        self.vertex_weights.iter().copied().max().unwrap_or(0)
    }

    /// Offset array of length `len() + 1` into the flat adjacency arrays.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    fn edge_range(&self, vertex: usize) -> Range<usize> {
        self.offsets[vertex]..self.offsets[vertex + 1]
    }

    /// View on a single vertex.
    pub fn vertex(&self, index: usize) -> Vertex<'_> {
        debug_assert!(index < self.len());
        Vertex { graph: self, index }
    }

    /// View on a single adjacency entry.
    pub fn edge(&self, index: usize) -> Edge<'_> {
        debug_assert!(index < self.num_edges());
        Edge { graph: self, index }
    }

    /// All vertices of the graph, in index order.
    pub fn vertices(&self) -> VertexSet<'_> {
        VertexSet { graph: self, range: 0..self.len() }
    }

    /// The contiguous vertex range `[begin, end)`.
    pub fn vertex_set(&self, begin: usize, end: usize) -> Result<VertexSet<'_>> {
        if begin > end {
            return Err(Error::VertexOutOfRange { index: begin, len: end });
        }
        if end > self.len() {
            return Err(Error::VertexOutOfRange { index: end, len: self.len() });
        }
        Ok(VertexSet { graph: self, range: begin..end })
    }

    /// Get the total weight of the adjacency entries from `vertex1` to `vertex2`.
    pub fn get_edge_weight(&self, vertex1: usize, vertex2: usize) -> Option<Weight> {
        self.neighbors(vertex1)
            .filter(|(neighbor, _)| *neighbor == vertex2)
            .map(|(_, edge_weight)| edge_weight)
            .reduce(|a, b| a + b)
    }

    /// Replace the vertex weights, keeping the adjacency.
    pub fn with_vertex_weights(self, vertex_weights: Vec<Weight>) -> Result<Self> {
        if vertex_weights.len() != self.len() {
            return Err(Error::InputLenMismatch {
                expected: self.len(),
                actual: vertex_weights.len(),
            });
        }
        if vertex_weights.iter().any(|&w| w < 0) {
            return Err(Error::NegativeValues);
        }
        Ok(Self::from_raw_parts(self.offsets, self.targets, self.edge_weights, vertex_weights))
    }

    /// The edge cut of a partition.
    ///
    /// Given a partition and a weighted graph associated to a mesh, the edge
    /// cut of a partition is defined as the total weight of the edges that link
    /// graph nodes of different parts. Every undirected edge counts once.
    ///
    /// # Example
    ///
    /// A partition with two parts (0 and 1)
    /// ```text,ignore
    ///          0
    ///    1*──┆─*────* 0
    ///    ╱ ╲ ┆╱    ╱
    ///  1*  1*┆ <┈┈╱┈┈┈ Dotted line passes through edged that contribute to edge cut.
    ///    ╲ ╱ ┆   ╱     If all edges have a weight of 1 then edge_cut = 3
    ///    1*  ┆╲ ╱
    ///          * 0
    /// ```
    pub fn edge_cut(&self, partition: &[usize]) -> Weight {
        debug_assert_eq!(self.len(), partition.len());

        let indptr = &self.offsets;
        indptr
            .par_iter()
            .zip(&indptr[1..])
            .enumerate()
            .map(|(vertex, (start, end))| {
                let neighbors = &self.targets[*start..*end];
                let edge_weights = &self.edge_weights[*start..*end];
                let vertex_part = partition[vertex];
                neighbors
                    .iter()
                    .zip(edge_weights)
                    .filter(|(neighbor, _edge_weight)| **neighbor < vertex)
                    .filter(|(neighbor, _edge_weight)| vertex_part != partition[**neighbor])
                    .map(|(_neighbor, edge_weight)| *edge_weight)
                    .sum::<Weight>()
            })
            .sum()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("vertices", &self.len())
            .field("edges", &self.num_edges())
            .field("total_weight", &self.total_weight)
            .finish()
    }
}

/// Lightweight handle on one vertex of a [`Graph`].
#[derive(Clone, Copy)]
pub struct Vertex<'g> {
    graph: &'g Graph,
    index: usize,
}

impl<'g> Vertex<'g> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn weight(&self) -> Weight {
        self.graph.vertex_weights[self.index]
    }

    pub fn degree(&self) -> usize {
        self.graph.degree(self.index)
    }

    /// The adjacency entries leaving this vertex.
    pub fn edges(&self) -> impl ExactSizeIterator<Item = Edge<'g>> + 'g {
        let graph = self.graph;
        graph.edge_range(self.index).map(move |index| Edge { graph, index })
    }

    pub fn neighbors(&self) -> Zip<Cloned<Iter<'g, usize>>, Cloned<Iter<'g, Weight>>> {
        self.graph.neighbors(self.index)
    }
}

impl PartialEq for Vertex<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.index == other.index
    }
}

impl Eq for Vertex<'_> {}

impl fmt::Debug for Vertex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vertex")
            .field("index", &self.index)
            .field("weight", &self.weight())
            .field("degree", &self.degree())
            .finish()
    }
}

/// Lightweight handle on one adjacency entry of a [`Graph`].
#[derive(Clone, Copy)]
pub struct Edge<'g> {
    graph: &'g Graph,
    index: usize,
}

impl<'g> Edge<'g> {
    /// Position of the entry in the flat adjacency arrays.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn destination(&self) -> usize {
        self.graph.targets[self.index]
    }

    pub fn weight(&self) -> Weight {
        self.graph.edge_weights[self.index]
    }

    pub fn destination_vertex(&self) -> Vertex<'g> {
        self.graph.vertex(self.destination())
    }
}

impl PartialEq for Edge<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.index == other.index
    }
}

impl Eq for Edge<'_> {}

impl fmt::Debug for Edge<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("index", &self.index)
            .field("destination", &self.destination())
            .field("weight", &self.weight())
            .finish()
    }
}

/// Contiguous half-open range of vertices of one graph.
#[derive(Clone, Debug)]
pub struct VertexSet<'g> {
    graph: &'g Graph,
    range: Range<usize>,
}

impl<'g> VertexSet<'g> {
    pub fn begin(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn contains(&self, vertex: usize) -> bool {
        self.range.contains(&vertex)
    }

    pub fn iter(&self) -> VertexIter<'g> {
        VertexIter { graph: self.graph, range: self.range.clone() }
    }
}

impl<'g> IntoIterator for VertexSet<'g> {
    type Item = Vertex<'g>;
    type IntoIter = VertexIter<'g>;

    fn into_iter(self) -> Self::IntoIter {
        VertexIter { graph: self.graph, range: self.range }
    }
}

impl<'g> IntoIterator for &VertexSet<'g> {
    type Item = Vertex<'g>;
    type IntoIter = VertexIter<'g>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward iterator over a [`VertexSet`], in index order.
#[derive(Clone, Debug)]
pub struct VertexIter<'g> {
    graph: &'g Graph,
    range: Range<usize>,
}

impl<'g> Iterator for VertexIter<'g> {
    type Item = Vertex<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(|index| Vertex { graph: self.graph, index })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl ExactSizeIterator for VertexIter<'_> {}

impl FusedIterator for VertexIter<'_> {}

#[cfg(test)]
mod tests {
    use itertools::assert_equal;
    use super::builder::GraphBuilder;
    use super::*;

    fn square_with_diagonal() -> Graph {
        // 0 - 1
        // | \ |
        // 3 - 2
        GraphBuilder::from_edges(
            vec![1, 2, 3, 4],
            &[(0, 1, 5), (1, 2, 1), (2, 3, 2), (3, 0, 4), (0, 2, 7)],
        )
        .unwrap()
    }

    #[test]
    fn test_compressed_layout() {
        // Arrange
        let graph = square_with_diagonal();

        // Assert
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.num_edges(), 10);
        assert_eq!(graph.total_weight(), 10);
        assert_eq!(graph.max_vertex_weight(), 4);
        assert_eq!(graph.offsets(), &[0, 3, 5, 8, 10]);
        assert_eq!(graph.degree(0), 3);
        assert_eq!(graph.degree(1), 2);
        assert_equal(graph.neighbors(1), [(0, 5), (2, 1)]);
    }

    #[test]
    fn test_vertex_and_edge_views() {
        // Arrange
        let graph = square_with_diagonal();

        // Act
        let vertex = graph.vertex(2);
        let edges: Vec<_> = vertex.edges().collect();

        // Assert
        assert_eq!(vertex.index(), 2);
        assert_eq!(vertex.weight(), 3);
        assert_eq!(vertex.degree(), 3);
        assert_equal(edges.iter().map(|e| e.destination()), [1, 3, 0]);
        assert_equal(edges.iter().map(|e| e.weight()), [1, 2, 7]);
        assert_eq!(edges[0].index(), 5);
        assert_eq!(edges[2].destination_vertex(), graph.vertex(0));
        assert_eq!(graph.edge(5), edges[0]);
    }

    #[test]
    fn test_vertex_set_iteration() {
        // Arrange
        let graph = square_with_diagonal();

        // Act
        let all = graph.vertices();
        let middle = graph.vertex_set(1, 3).unwrap();

        // Assert
        assert_eq!(all.len(), 4);
        assert_equal(all.iter().map(|v| v.index()), 0..4);
        assert_eq!(middle.len(), 2);
        assert!(middle.contains(2) && !middle.contains(3));
        assert_equal(middle.into_iter().map(|v| v.weight()), [2, 3]);
        assert!(graph.vertex_set(2, 2).unwrap().is_empty());
        assert!(graph.vertex_set(1, 5).is_err());
        assert!(graph.vertex_set(3, 2).is_err());
    }

    #[test]
    fn test_edge_cut() {
        // Arrange
        let graph = square_with_diagonal();

        // Act
        let cut_left_right = graph.edge_cut(&[0, 1, 1, 0]);
        let cut_nothing = graph.edge_cut(&[0, 0, 0, 0]);

        // Assert
        assert_eq!(cut_left_right, 5 + 7 + 2);
        assert_eq!(cut_nothing, 0);
    }

    #[test]
    fn test_get_edge_weight() {
        // Arrange
        let graph = square_with_diagonal();

        // Assert
        assert_eq!(graph.get_edge_weight(0, 2), Some(7));
        assert_eq!(graph.get_edge_weight(2, 0), Some(7));
        assert_eq!(graph.get_edge_weight(1, 3), None);
    }

    #[test]
    fn test_with_vertex_weights() {
        // Arrange
        let graph = square_with_diagonal();

        // Act
        let reweighted = graph.clone().with_vertex_weights(vec![2, 2, 2, 2]).unwrap();

        // Assert
        assert_eq!(reweighted.total_weight(), 8);
        assert_eq!(reweighted.num_edges(), graph.num_edges());
        assert_eq!(
            graph.clone().with_vertex_weights(vec![1, 1]),
            Err(Error::InputLenMismatch { expected: 4, actual: 2 })
        );
        assert_eq!(graph.with_vertex_weights(vec![1, -1, 1, 1]), Err(Error::NegativeValues));
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.num_edges(), 0);
        assert_eq!(graph.vertices().len(), 0);
        assert_eq!(graph.edge_cut(&[]), 0);
    }
}
