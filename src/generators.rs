use rand::Rng;

use crate::graph::Graph;
use crate::{Error, Result, Weight};

/// Generate the weight vector where each vertex has the same weight.
pub fn uniform_weights(no_of_vertices: usize) -> Vec<Weight> {
    vec![1; no_of_vertices]
}

/// Generate the weight vector where each vertex has a random weight in `[min_weight, max_weight]`.
pub fn random_weights<R: Rng + ?Sized>(
    no_of_vertices: usize,
    min_weight: Weight,
    max_weight: Weight,
    rng: &mut R,
) -> Result<Vec<Weight>> {
    if max_weight < min_weight {
        return Err(Error::InvalidParameter("max weight must be greater than min weight".into()));
    }
    if min_weight < 0 {
        return Err(Error::NegativeValues);
    }

    Ok((0..no_of_vertices)
        .map(|_| rng.gen_range(min_weight..=max_weight))
        .collect())
}

/// Unit-weighted `nx × ny × nz` grid where every vertex is joined to its
/// axis-aligned neighbors. Vertex `(x, y, z)` has index `x + nx * (y + ny * z)`.
pub fn grid_graph(nx: usize, ny: usize, nz: usize) -> Graph {
    let num_vertices = nx * ny * nz;
    let index = |x: usize, y: usize, z: usize| x + nx * (y + ny * z);

    let mut offsets = Vec::with_capacity(num_vertices + 1);
    let mut targets = Vec::with_capacity(6 * num_vertices);
    offsets.push(0);

    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                if x > 0 {
                    targets.push(index(x - 1, y, z));
                }
                if x + 1 < nx {
                    targets.push(index(x + 1, y, z));
                }
                if y > 0 {
                    targets.push(index(x, y - 1, z));
                }
                if y + 1 < ny {
                    targets.push(index(x, y + 1, z));
                }
                if z > 0 {
                    targets.push(index(x, y, z - 1));
                }
                if z + 1 < nz {
                    targets.push(index(x, y, z + 1));
                }
                offsets.push(targets.len());
            }
        }
    }

    let edge_weights = vec![1; targets.len()];
    Graph::from_raw_parts(offsets, targets, edge_weights, uniform_weights(num_vertices))
}

/// Unit-weighted star: vertex 0 joined to `leaves` leaves `1..=leaves`.
pub fn star_graph(leaves: usize) -> Graph {
    let mut offsets = Vec::with_capacity(leaves + 2);
    let mut targets: Vec<usize> = (1..=leaves).collect();
    offsets.push(0);
    offsets.push(leaves);
    for _ in 0..leaves {
        targets.push(0);
        offsets.push(targets.len());
    }

    let edge_weights = vec![1; targets.len()];
    Graph::from_raw_parts(offsets, targets, edge_weights, uniform_weights(leaves + 1))
}

/// Random graph where each of the `n (n - 1) / 2` possible edges exists with
/// probability `edge_prob`, with edge weights drawn from `1..=5`.
pub fn random_graph<R: Rng + ?Sized>(n: usize, edge_prob: f64, rng: &mut R) -> Graph {
    let mut adjacency: Vec<Vec<(usize, Weight)>> = vec![Vec::new(); n];
    for u in 0..n {
        for v in (u + 1)..n {
            if rng.gen::<f64>() < edge_prob {
                let weight = rng.gen_range(1..=5);
                adjacency[u].push((v, weight));
                adjacency[v].push((u, weight));
            }
        }
    }

    let mut offsets = Vec::with_capacity(n + 1);
    offsets.push(0);
    let mut targets = Vec::new();
    let mut edge_weights = Vec::new();
    for neighbors in adjacency {
        for (neighbor, weight) in neighbors {
            targets.push(neighbor);
            edge_weights.push(weight);
        }
        offsets.push(targets.len());
    }

    Graph::from_raw_parts(offsets, targets, edge_weights, uniform_weights(n))
}
