// This file contains a Fiduccia-Mattheyses style refiner for bisections.
// # Reference
//
// Fiduccia, C. M., and R. M. Mattheyses. "A linear-time heuristic for improving network
// partitions." 19th Design Automation Conference (1982): 175-181.

use std::collections::BinaryHeap;

use log::{trace, warn};

use crate::algorithms::BoundaryTracker;
use crate::graph::Graph;
use crate::params::PartitionParams;
use crate::partitioning::Partitioning;
use crate::{Error, Result, Weight};

/// A move applied during a pass, kept so that it can be undone.
#[derive(Debug, Clone, Copy)]
struct Move {
    vertex: usize,
    /// The part the vertex was in before the move.
    from: usize,
}

/// Queue entry: gain, tie-break rank, vertex.
type Entry = (Weight, usize, usize);

// Equal gains go to the highest id on side 0 and to the lowest id on side 1,
// so part 0 drifts towards low ids and part 1 towards high ids and the
// boundary sweeps as one front.
fn entry(side: usize, gain: Weight, vertex: usize) -> Entry {
    let rank = if side == 0 { vertex } else { usize::MAX - vertex };
    (gain, rank, vertex)
}

/// Quality of a bisection, compared lexicographically: balance first, then
/// cut, then distance of part 0 from its target weight.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub(crate) struct Score {
    pub violation: Weight,
    pub cut: Weight,
    pub deviation: f64,
}

impl Score {
    pub(crate) fn of(params: &PartitionParams, partitioning: &Partitioning, total_weight: Weight) -> Self {
        Self {
            violation: params.violation(partitioning.part_weights(), total_weight),
            cut: partitioning.cut_weight(),
            deviation: (partitioning.part_weight(0) as f64 - params.target_weight(0, total_weight)).abs(),
        }
    }
}

/// Diagnostic data of one [`FmRefiner::refine`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefineStats {
    pub passes: usize,
    /// Moves kept after rolling back every pass to its best prefix.
    pub moves: usize,
    pub initial_cut: Weight,
    pub final_cut: Weight,
    /// Whether every part ended within its maximum weight.
    pub balanced: bool,
}

/// Move-based local search over a bisection.
///
/// Each pass repeatedly moves the unlocked boundary vertex with the highest
/// gain whose move keeps the target side within its maximum weight, then
/// locks it. Negative gains are accepted, which lets a pass climb out of local
/// minima; once the pass ends, the moves past the best state seen are undone.
///
/// # Example
///
/// ```rust
/// use mlpart::algorithms::{BoundaryTracker, FmRefiner};
/// use mlpart::generators::grid_graph;
/// use mlpart::{PartitionParams, Partitioning};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let graph = grid_graph(4, 4, 1);
/// let params = PartitionParams::new(2, 0.25)?;
/// let parts = (0..graph.len()).map(|v| v % 2).collect();
/// let mut partitioning = Partitioning::from_assignment(&graph, 2, parts)?;
/// let mut tracker = BoundaryTracker::new(&graph, &partitioning)?;
///
/// let stats = FmRefiner::default().refine(&params, &mut tracker, &mut partitioning, &graph)?;
///
/// assert!(stats.final_cut < stats.initial_cut);
/// assert!(stats.balanced);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FmRefiner {
    /// Maximum number of passes over the boundary.
    pub max_passes: usize,
}

impl Default for FmRefiner {
    fn default() -> Self {
        Self { max_passes: 25 }
    }
}

impl FmRefiner {
    /// Refine `partitioning` in place. `tracker` must describe `partitioning`
    /// on `graph`; it is kept up to date with every move.
    pub fn refine(
        &self,
        params: &PartitionParams,
        tracker: &mut BoundaryTracker,
        partitioning: &mut Partitioning,
        graph: &Graph,
    ) -> Result<RefineStats> {
        if params.num_parts() != 2 {
            return Err(Error::BiPartitioningOnly(params.num_parts()));
        }
        if partitioning.num_parts() != 2 {
            return Err(Error::BiPartitioningOnly(partitioning.num_parts()));
        }
        for len in [partitioning.len(), tracker.len()] {
            if len != graph.len() {
                return Err(Error::InputLenMismatch { expected: graph.len(), actual: len });
            }
        }

        let total_weight = graph.total_weight();
        let mut stats = RefineStats {
            initial_cut: partitioning.cut_weight(),
            ..Default::default()
        };

        for pass in 0..self.max_passes {
            let start = Score::of(params, partitioning, total_weight);
            let kept = refine_pass(params, tracker, partitioning, graph)?;
            let end = Score::of(params, partitioning, total_weight);
            stats.passes += 1;
            stats.moves += kept;

            trace!(
                "pass {pass}: kept {kept} moves, cut {} -> {}, violation {} -> {}",
                start.cut, end.cut, start.violation, end.violation
            );

            if kept == 0 || (end.violation == start.violation && end.cut == start.cut) {
                break;
            }
        }

        stats.final_cut = partitioning.cut_weight();
        stats.balanced = params.violation(partitioning.part_weights(), total_weight) == 0;
        if !stats.balanced {
            warn!(
                "refinement left part weights {:?} above their bounds",
                partitioning.part_weights()
            );
        }
        Ok(stats)
    }
}

/// One FM pass. Returns the number of moves kept.
fn refine_pass(
    params: &PartitionParams,
    tracker: &mut BoundaryTracker,
    partitioning: &mut Partitioning,
    graph: &Graph,
) -> Result<usize> {
    let n = graph.len();
    let total_weight = graph.total_weight();
    let max_weights = [params.max_part_weight(0, total_weight), params.max_part_weight(1, total_weight)];

    let mut locked = vec![false; n];
    // One queue per source side, holding entries that may be stale.
    let mut queues: [BinaryHeap<Entry>; 2] = [BinaryHeap::new(), BinaryHeap::new()];
    for &vertex in tracker.boundary() {
        let side = partitioning.part(vertex);
        queues[side].push(entry(side, tracker.gain(vertex), vertex));
    }

    let mut best = Score::of(params, partitioning, total_weight);
    let mut best_len = 0;
    let mut moves: Vec<Move> = Vec::new();

    // Every vertex moves at most once, so a pass ends once no unlocked vertex
    // can legally move.
    while let Some(vertex) = select_move(params, &mut queues, &locked, tracker, partitioning, graph, max_weights) {
        let from = partitioning.part(vertex);
        partitioning.move_vertex(graph, vertex, 1 - from)?;
        tracker.update(graph, partitioning, vertex);
        locked[vertex] = true;
        moves.push(Move { vertex, from });

        for (neighbor, _edge_weight) in graph.neighbors(vertex) {
            if !locked[neighbor] && tracker.is_boundary(neighbor) {
                let side = partitioning.part(neighbor);
                queues[side].push(entry(side, tracker.gain(neighbor), neighbor));
            }
        }

        let current = Score::of(params, partitioning, total_weight);
        if current < best {
            best = current;
            best_len = moves.len();
        }
    }

    // Roll back to the best prefix of the pass.
    for Move { vertex, from } in moves.drain(best_len..).rev() {
        partitioning.move_vertex(graph, vertex, from)?;
        tracker.update(graph, partitioning, vertex);
    }

    Ok(best_len)
}

/// The vertex to move next, if any.
fn select_move(
    params: &PartitionParams,
    queues: &mut [BinaryHeap<Entry>; 2],
    locked: &[bool],
    tracker: &BoundaryTracker,
    partitioning: &Partitioning,
    graph: &Graph,
    max_weights: [Weight; 2],
) -> Option<usize> {
    let mut candidate: Option<(Weight, usize)> = None;

    for (side, queue) in queues.iter_mut().enumerate() {
        // Discard entries invalidated by earlier moves.
        while let Some(&(gain, _rank, vertex)) = queue.peek() {
            let valid = !locked[vertex]
                && partitioning.part(vertex) == side
                && tracker.is_boundary(vertex)
                && tracker.gain(vertex) == gain;
            if valid {
                break;
            }
            queue.pop();
        }

        if let Some(&(gain, _rank, vertex)) = queue.peek() {
            let to = 1 - side;
            let fits = partitioning.part_weight(to) + graph.vertex_weight(vertex) <= max_weights[to];
            if fits && candidate.map_or(true, |(best_gain, _)| gain > best_gain) {
                candidate = Some((gain, vertex));
            }
        }
    }

    candidate
        .map(|(_, vertex)| vertex)
        .or_else(|| forced_move(params, queues, locked, tracker, partitioning, graph, max_weights))
}

/// A move out of an overweight side, taken regardless of its gain as long as
/// it lowers the total violation.
fn forced_move(
    params: &PartitionParams,
    queues: &[BinaryHeap<Entry>; 2],
    locked: &[bool],
    tracker: &BoundaryTracker,
    partitioning: &Partitioning,
    graph: &Graph,
    max_weights: [Weight; 2],
) -> Option<usize> {
    let side = (0..2).find(|&side| partitioning.part_weight(side) > max_weights[side])?;

    let vertex = match queues[side].peek() {
        Some(&(_gain, _rank, vertex)) => vertex,
        None => (0..graph.len())
            .filter(|&v| !locked[v] && partitioning.part(v) == side)
            .max_by_key(|&v| tracker.gain(v))?,
    };

    let total_weight = graph.total_weight();
    let weight = graph.vertex_weight(vertex);
    let mut part_weights = [partitioning.part_weight(0), partitioning.part_weight(1)];
    let before = params.violation(&part_weights, total_weight);
    part_weights[side] -= weight;
    part_weights[1 - side] += weight;

    (params.violation(&part_weights, total_weight) < before).then_some(vertex)
}
