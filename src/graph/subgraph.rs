use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

use crate::graph::builder::GraphBuilder;
use crate::graph::Graph;
use crate::partitioning::Partitioning;
use crate::{Error, Result, Weight};

/// Graph induced by the vertices of one part, with the way back to the parent.
///
/// Local vertex `i` is the `i`-th parent vertex of the part in increasing
/// parent order; only edges with both endpoints in the part are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgraph {
    graph: Graph,
    super_map: Vec<usize>,
}

impl Subgraph {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.super_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.super_map.is_empty()
    }

    /// Parent index of local vertex `local`.
    pub fn super_vertex(&self, local: usize) -> usize {
        self.super_map[local]
    }

    pub fn super_map(&self) -> &[usize] {
        &self.super_map
    }

    pub fn into_parts(self) -> (Graph, Vec<usize>) {
        (self.graph, self.super_map)
    }
}

/// Split `graph` into the subgraphs induced by every part of `partitioning`,
/// in part order. Empty parts yield empty subgraphs.
pub fn partitions(graph: &Graph, partitioning: &Partitioning) -> Result<Vec<Subgraph>> {
    if partitioning.len() != graph.len() {
        return Err(Error::InputLenMismatch {
            expected: graph.len(),
            actual: partitioning.len(),
        });
    }

    let num_parts = partitioning.num_parts();
    let mut super_maps = vec![Vec::new(); num_parts];
    let mut local_index = vec![0; graph.len()];
    for (vertex, &part) in partitioning.parts().iter().enumerate() {
        local_index[vertex] = super_maps[part].len();
        super_maps[part].push(vertex);
    }

    // Parts are independent from each other once the local indices are known.
    super_maps
        .into_par_iter()
        .enumerate()
        .map(|(part, super_map)| -> Result<Subgraph> {
            let mut builder = GraphBuilder::new(super_map.len());
            let mut neighbors = Vec::new();
            let mut edge_weights: Vec<Weight> = Vec::new();

            for &vertex in &super_map {
                neighbors.clear();
                edge_weights.clear();
                for (neighbor, edge_weight) in graph.neighbors(vertex) {
                    if partitioning.part(neighbor) == part {
                        neighbors.push(local_index[neighbor]);
                        edge_weights.push(edge_weight);
                    }
                }
                builder.add_vertex(graph.vertex_weight(vertex), neighbors.len(), &neighbors, &edge_weights)?;
            }

            Ok(Subgraph { graph: builder.finish()?, super_map })
        })
        .collect()
}
