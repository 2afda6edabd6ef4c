use std::path::Path;

use sprs::io::{read_matrix_market, IoError};
use sprs::CsMat;
use thiserror::Error;

use crate::graph::builder::GraphBuilder;
use crate::graph::Graph;
use crate::Weight;

/// Failure to turn a Matrix Market file into a [`Graph`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read matrix market file: {0}")]
    Read(#[from] IoError),

    #[error("adjacency matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error(transparent)]
    Graph(#[from] crate::Error),
}

/// Read a matrix market file and output Graph struct.
///
/// The matrix is read as the adjacency matrix of an undirected graph with unit
/// vertex weights: the diagonal is dropped, an entry without its transposed
/// counterpart is mirrored, and an edge weighs the larger absolute value of its
/// two entries, rounded and at least 1.
pub fn read_matrix_market_as_graph(file_path: &Path) -> Result<Graph, LoadError> {
    // read the matrix market file as a TriMat with edge lengths. sprs refuses
    // to read an integer file as floats, so those are read as i64.
    let matrix: CsMat<f64> = match read_matrix_market::<f64, usize, _>(file_path) {
        Ok(triplets) => triplets.to_csr(),
        Err(IoError::MismatchedMatrixMarketRead(..)) => {
            read_matrix_market::<i64, usize, _>(file_path)?.to_csr::<usize>().map(|&value| value as f64)
        }
        Err(error) => return Err(error.into()),
    };
    if matrix.rows() != matrix.cols() {
        return Err(LoadError::NotSquare { rows: matrix.rows(), cols: matrix.cols() });
    }

    let mut adjacency: Vec<Vec<(usize, Weight)>> = vec![Vec::new(); matrix.rows()];
    for (row, vector) in matrix.outer_iterator().enumerate() {
        for (col, &value) in vector.iter() {
            if row == col {
                continue;
            }
            let transposed = matrix.get(col, row);
            let magnitude = transposed.map_or(value.abs(), |&other| value.abs().max(other.abs()));
            let weight = magnitude.round().max(1.0) as Weight;

            adjacency[row].push((col, weight));
            if transposed.is_none() {
                adjacency[col].push((row, weight));
            }
        }
    }

    let mut builder = GraphBuilder::with_capacity(adjacency.len(), matrix.nnz());
    for mut edges in adjacency {
        edges.sort_unstable();
        let (neighbors, weights): (Vec<usize>, Vec<Weight>) = edges.into_iter().unzip();
        builder.add_vertex(1, neighbors.len(), &neighbors, &weights)?;
    }
    Ok(builder.finish()?)
}
