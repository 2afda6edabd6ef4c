use log::{debug, info, trace, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::algorithms::fm_refiner::Score;
use crate::algorithms::{
    Aggregation, Aggregator, BoundaryTracker, FmRefiner, InitialPartitioner, MatchingRule,
    RandomMatchingAggregator, RefineStats, Seeding,
};
use crate::graph::Graph;
use crate::params::PartitionParams;
use crate::partitioning::Partitioning;
use crate::{Error, Partition, Result, Weight};

// A coarse graph together with the mapping from the graph one level finer.
struct Level {
    graph: Graph,
    aggregation: Aggregation,
}

/// What happened at one level of the hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelStats {
    pub num_vertices: usize,
    /// Adjacency entries, i.e. twice the number of undirected edges.
    pub num_edges: usize,
    /// Cut right after projection (after seeding at the coarsest level).
    pub projected_cut: Weight,
    pub refined_cut: Weight,
    pub passes: usize,
    pub balanced: bool,
}

/// Diagnostic data of one multilevel bisection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultilevelStats {
    /// From the coarsest level to the input graph.
    pub levels: Vec<LevelStats>,
    /// Cut of the retained seed before refinement.
    pub seed_cut: Weight,
    /// Coarsening stopped because a matching no longer shrank the graph enough.
    pub stagnated: bool,
}

/// Multilevel Partitioner
///
/// An implementation of the multilevel bisection scheme: the graph is coarsened
/// by randomized matching until it is small, the coarsest graph is bisected by
/// a seeding strategy, and the bisection is projected back level by level with
/// an FM refinement at every level.
///
/// # Example
///
/// ```rust
/// use mlpart::algorithms::MultiLevelPartitioner;
/// use mlpart::generators::grid_graph;
/// use mlpart::{Partition, PartitionParams};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
///
///     let graph = grid_graph(10, 11, 12);
///     let params = PartitionParams::new(2, 0.015)?;
///     let mut partition = vec![0; graph.len()];
///
///     let stats = MultiLevelPartitioner { seed: Some(5), ..Default::default() }
///         .partition(&mut partition, (&graph, &params))?;
///
///     let edge_cut = graph.edge_cut(&partition);
///     assert_eq!(stats.levels.last().map(|level| level.refined_cut), Some(edge_cut));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MultiLevelPartitioner {
    /// Seed for MultiLevel Graph Partitioner
    pub seed: Option<u64>,

    /// Coarsening stops once a graph has at most this many vertices.
    pub coarsest_size: usize,

    /// Coarsening stops when a matching keeps more than this fraction of the
    /// vertices of the graph it was computed on.
    pub stagnation_ratio: f64,

    /// Pass limit of the FM refiner at every level.
    pub max_passes: usize,

    /// Number of seeds tried on the coarsest graph; the best one after
    /// refinement is kept.
    pub initial_tries: usize,

    pub seeding: Seeding,

    pub matching: MatchingRule,
}

impl Default for MultiLevelPartitioner {
    fn default() -> Self {
        MultiLevelPartitioner {
            seed: None,
            coarsest_size: 100,
            stagnation_ratio: 0.85,
            max_passes: 25,
            initial_tries: 4,
            seeding: Seeding::default(),
            matching: MatchingRule::default(),
        }
    }
}

impl MultiLevelPartitioner {
    /// Bisect `graph` according to `params`, which must ask for two parts.
    pub fn bisect(&self, graph: &Graph, params: &PartitionParams) -> Result<(Partitioning, MultilevelStats)> {
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        self.bisect_with_rng(graph, params, &mut rng)
    }

    /// Same as [`MultiLevelPartitioner::bisect`], drawing from `rng` instead of `self.seed`.
    pub fn bisect_with_rng(
        &self,
        graph: &Graph,
        params: &PartitionParams,
        rng: &mut SmallRng,
    ) -> Result<(Partitioning, MultilevelStats)> {
        if params.num_parts() != 2 {
            return Err(Error::BiPartitioningOnly(params.num_parts()));
        }
        if !(self.stagnation_ratio > 0.0 && self.stagnation_ratio <= 1.0) {
            return Err(Error::InvalidParameter(format!(
                "stagnation ratio must be in (0, 1], got {}",
                self.stagnation_ratio
            )));
        }

        let refiner = FmRefiner { max_passes: self.max_passes };
        let mut stats = MultilevelStats::default();

        let mut hierarchy = self.coarsen(graph, rng, &mut stats)?;

        let coarsest = hierarchy.last().map_or(graph, |level| &level.graph);
        let (mut partitioning, refine_stats) = self.seed_coarsest(coarsest, params, &refiner, rng)?;
        stats.seed_cut = refine_stats.initial_cut;
        stats.levels.push(LevelStats {
            num_vertices: coarsest.len(),
            num_edges: coarsest.num_edges(),
            projected_cut: refine_stats.initial_cut,
            refined_cut: refine_stats.final_cut,
            passes: refine_stats.passes,
            balanced: refine_stats.balanced,
        });

        // Walk back to the input graph, dropping each coarse level once projected.
        while let Some(level) = hierarchy.pop() {
            let fine_graph = hierarchy.last().map_or(graph, |level| &level.graph);
            partitioning = partitioning.project(&level.aggregation, fine_graph)?;

            let mut tracker = BoundaryTracker::new(fine_graph, &partitioning)?;
            let refine_stats = refiner.refine(params, &mut tracker, &mut partitioning, fine_graph)?;
            debug!(
                "level {}: {} vertices, cut {} -> {} in {} passes",
                hierarchy.len(),
                fine_graph.len(),
                refine_stats.initial_cut,
                refine_stats.final_cut,
                refine_stats.passes
            );

            stats.levels.push(LevelStats {
                num_vertices: fine_graph.len(),
                num_edges: fine_graph.num_edges(),
                projected_cut: refine_stats.initial_cut,
                refined_cut: refine_stats.final_cut,
                passes: refine_stats.passes,
                balanced: refine_stats.balanced,
            });
        }

        info!(
            "bisected {} vertices over {} levels: cut {}, part weights {:?}",
            graph.len(),
            stats.levels.len(),
            partitioning.cut_weight(),
            partitioning.part_weights()
        );
        Ok((partitioning, stats))
    }

    // Builds the hierarchy, finest coarse graph first.
    fn coarsen(&self, graph: &Graph, rng: &mut SmallRng, stats: &mut MultilevelStats) -> Result<Vec<Level>> {
        let aggregator = RandomMatchingAggregator { rule: self.matching };
        let mut hierarchy: Vec<Level> = Vec::new();

        loop {
            let current = hierarchy.last().map_or(graph, |level| &level.graph);
            if current.len() <= self.coarsest_size || current.num_edges() == 0 {
                break;
            }

            let aggregation = aggregator.aggregate(current, rng);
            let ratio = aggregation.num_coarse() as f64 / current.len() as f64;
            if ratio >= self.stagnation_ratio {
                warn!(
                    "coarsening stagnated at {} vertices (ratio {ratio:.3}), seeding a larger graph",
                    current.len()
                );
                stats.stagnated = true;
                break;
            }

            let coarse_graph = aggregation.coarsen(current)?;
            debug!(
                "level {}: {} vertices, {} edges",
                hierarchy.len() + 1,
                coarse_graph.len(),
                coarse_graph.num_edges() / 2
            );
            hierarchy.push(Level { graph: coarse_graph, aggregation });
        }

        Ok(hierarchy)
    }

    // Seeds and refines the coarsest graph `initial_tries` times, keeping the best.
    fn seed_coarsest(
        &self,
        graph: &Graph,
        params: &PartitionParams,
        refiner: &FmRefiner,
        rng: &mut SmallRng,
    ) -> Result<(Partitioning, RefineStats)> {
        let total_weight = graph.total_weight();
        let mut attempt = || -> Result<(Partitioning, RefineStats)> {
            let mut partitioning = self.seeding.execute(graph, params, rng)?;
            let mut tracker = BoundaryTracker::new(graph, &partitioning)?;
            let refine_stats = refiner.refine(params, &mut tracker, &mut partitioning, graph)?;
            Ok((partitioning, refine_stats))
        };

        let mut best = attempt()?;
        for try_index in 1..self.initial_tries {
            let candidate = attempt()?;
            trace!("seed {try_index}: cut {}", candidate.1.final_cut);
            if Score::of(params, &candidate.0, total_weight) < Score::of(params, &best.0, total_weight) {
                best = candidate;
            }
        }
        Ok(best)
    }
}

impl<'a> Partition<(&'a Graph, &'a PartitionParams)> for MultiLevelPartitioner {
    type Metadata = MultilevelStats;
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
        let (partitioning, stats) = self.bisect(graph, params)?;
        part_ids.copy_from_slice(partitioning.parts());
        Ok(stats)
    }
}
