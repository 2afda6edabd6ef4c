use rand::rngs::SmallRng;

use crate::graph::Graph;
use crate::params::PartitionParams;
use crate::partitioning::Partitioning;
use crate::Result;

mod boundary;
mod coarsening;
mod fm_refiner;
mod multilevel_partitioner;
mod random_partitioner;
mod recursive_bisection;

pub use boundary::BoundaryTracker;
pub use coarsening::{Aggregation, MatchingRule, RandomMatchingAggregator};
pub use fm_refiner::{FmRefiner, RefineStats};
pub use multilevel_partitioner::{LevelStats, MultiLevelPartitioner, MultilevelStats};
pub use random_partitioner::{RandomBisector, RandomPartitioner, Seeding};
pub use recursive_bisection::RecursiveBisection;

/// Computes the coarse-vertex mapping of one coarsening step.
pub trait Aggregator {
    fn aggregate(&self, graph: &Graph, rng: &mut SmallRng) -> Aggregation;
}

/// Produces the partitioning a multilevel run starts from.
pub trait InitialPartitioner {
    fn execute(&self, graph: &Graph, params: &PartitionParams, rng: &mut SmallRng) -> Result<Partitioning>;
}
