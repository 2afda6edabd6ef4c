use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::algorithms::InitialPartitioner;
use crate::graph::Graph;
use crate::params::PartitionParams;
use crate::partitioning::Partitioning;
use crate::{Error, Result};

/// Unconstrained seed: every vertex draws its part uniformly from `[0, k)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPartitioner;

impl InitialPartitioner for RandomPartitioner {
    fn execute(&self, graph: &Graph, params: &PartitionParams, rng: &mut SmallRng) -> Result<Partitioning> {
        let num_parts = params.num_parts();
        let parts = (0..graph.len()).map(|_| rng.gen_range(0..num_parts)).collect();
        Partitioning::from_assignment(graph, num_parts, parts)
    }
}

/// Balance-aware random bisection.
///
/// Vertices are visited in random order; a vertex joins part 0 while that
/// keeps part 0 at or below its target weight and part 1 otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomBisector;

impl InitialPartitioner for RandomBisector {
    fn execute(&self, graph: &Graph, params: &PartitionParams, rng: &mut SmallRng) -> Result<Partitioning> {
        if params.num_parts() != 2 {
            return Err(Error::BiPartitioningOnly(params.num_parts()));
        }

        let target_weight = params.target_weight(0, graph.total_weight());
        let mut vertices: Vec<usize> = (0..graph.len()).collect();
        vertices.shuffle(rng);

        let mut parts = vec![1; graph.len()];
        let mut part_weight = 0;
        for vertex in vertices {
            let weight = graph.vertex_weight(vertex);
            if (part_weight + weight) as f64 <= target_weight {
                parts[vertex] = 0;
                part_weight += weight;
            }
        }

        Partitioning::from_assignment(graph, 2, parts)
    }
}

/// Seeding strategy used at the coarsest level of a multilevel run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Seeding {
    Random,
    #[default]
    RandomBisection,
}

impl InitialPartitioner for Seeding {
    fn execute(&self, graph: &Graph, params: &PartitionParams, rng: &mut SmallRng) -> Result<Partitioning> {
        match self {
            Seeding::Random => RandomPartitioner.execute(graph, params, rng),
            Seeding::RandomBisection => RandomBisector.execute(graph, params, rng),
        }
    }
}
