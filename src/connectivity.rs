// Copyright 2026 Hypermesh Foundation. All rights reserved.
// GoTrim Gossip Simulation Suite - Algebraic Connectivity
//
// Diagnostic only: lambda_2 of the graph Laplacian divided by the edge count
// summarizes how fast uniform edge sampling mixes information. Nothing in the
// simulation branches on it.

use ndarray::Array2;

use crate::error::{Result, SimError};
use crate::topology::Graph;

const JACOBI_TOLERANCE: f64 = 1e-12;
const JACOBI_MAX_SWEEPS: usize = 100;

/// Dense combinatorial Laplacian `D - A`. Parallel edges add up.
pub fn laplacian(graph: &Graph) -> Array2<f64> {
    let n = graph.node_count();
    let mut matrix = Array2::<f64>::zeros((n, n));
    for &(u, v) in graph.edges() {
        matrix[[u, u]] += 1.0;
        matrix[[v, v]] += 1.0;
        matrix[[u, v]] -= 1.0;
        matrix[[v, u]] -= 1.0;
    }
    matrix
}

/// `lambda_2 / |E|` for the given graph.
pub fn compute_connectivity(graph: &Graph) -> Result<f64> {
    if graph.node_count() < 2 {
        return Err(SimError::InvalidConfig(
            "algebraic connectivity needs at least 2 nodes".to_string(),
        ));
    }
    let eigenvalues = symmetric_eigenvalues(laplacian(graph));
    Ok(eigenvalues[1] / graph.edge_count() as f64)
}

/// All eigenvalues of a symmetric matrix in ascending order, by cyclic
/// Jacobi rotations.
pub fn symmetric_eigenvalues(mut a: Array2<f64>) -> Vec<f64> {
    let n = a.nrows();
    let scale = a.iter().map(|x| x * x).sum::<f64>().sqrt().max(1.0);

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off_diagonal: f64 = (0..n)
            .flat_map(|p| (p + 1..n).map(move |q| (p, q)))
            .map(|(p, q)| a[[p, q]] * a[[p, q]])
            .sum();
        if off_diagonal.sqrt() <= JACOBI_TOLERANCE * scale {
            break;
        }
        for p in 0..n {
            for q in p + 1..n {
                if a[[p, q]].abs() > f64::MIN_POSITIVE {
                    rotate(&mut a, p, q);
                }
            }
        }
    }

    let mut eigenvalues: Vec<f64> = (0..n).map(|k| a[[k, k]]).collect();
    eigenvalues.sort_by(f64::total_cmp);
    eigenvalues
}

/// Apply the Jacobi rotation that zeroes `a[p][q]`.
fn rotate(a: &mut Array2<f64>, p: usize, q: usize) {
    let n = a.nrows();
    let apq = a[[p, q]];
    let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
    let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
    let c = 1.0 / (t * t + 1.0).sqrt();
    let s = t * c;

    for k in 0..n {
        let akp = a[[k, p]];
        let akq = a[[k, q]];
        a[[k, p]] = c * akp - s * akq;
        a[[k, q]] = s * akp + c * akq;
    }
    for k in 0..n {
        let apk = a[[p, k]];
        let aqk = a[[q, k]];
        a[[p, k]] = c * apk - s * aqk;
        a[[q, k]] = s * apk + c * aqk;
    }
}
