// Copyright 2026 Hypermesh Foundation. All rights reserved.
// GoTrim Gossip Simulation Suite - Network Topologies
//
// Gossip runs over a fixed undirected graph whose edge list is sampled with
// replacement once per step. Generators mirror the synthetic topologies used
// in the experiments; a disconnected draw is regenerated with the next seed a
// bounded number of times.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SimError};

/// Regeneration attempts before a disconnected topology is a fatal error.
pub const MAX_GRAPH_ATTEMPTS: u32 = 16;

// ─── Graph ──────────────────────────────────────────────────────────────────

/// Undirected graph over nodes `0..n` with an ordered edge list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    node_count: usize,
    edges: Vec<(usize, usize)>,
}

impl Graph {
    /// Validate an edge list: endpoints must be distinct and `< node_count`.
    pub fn new(node_count: usize, edges: Vec<(usize, usize)>) -> Result<Self> {
        if edges.is_empty() {
            return Err(SimError::NoEdges);
        }
        if let Some(&(u, v)) = edges.iter().find(|&&(u, v)| u == v || u >= node_count || v >= node_count) {
            return Err(SimError::EdgeOutOfRange { u, v, n: node_count });
        }
        Ok(Self { node_count, edges })
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn neighbors(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.node_count];
        for &(u, v) in &self.edges {
            adjacency[u].push(v);
            adjacency[v].push(u);
        }
        adjacency
    }

    /// Breadth-first reachability from node 0.
    pub fn is_connected(&self) -> bool {
        if self.node_count == 0 {
            return true;
        }
        let adjacency = self.neighbors();
        let mut seen = vec![false; self.node_count];
        let mut queue = VecDeque::new();
        seen[0] = true;
        queue.push_back(0);
        let mut reached = 1;
        while let Some(current) = queue.pop_front() {
            for &next in &adjacency[current] {
                if !seen[next] {
                    seen[next] = true;
                    reached += 1;
                    queue.push_back(next);
                }
            }
        }
        reached == self.node_count
    }

    /// Draw one edge uniformly at random.
    pub fn sample_edge<R: Rng + ?Sized>(&self, rng: &mut R) -> (usize, usize) {
        self.edges[rng.gen_range(0..self.edges.len())]
    }
}

// ─── Generators ─────────────────────────────────────────────────────────────

/// Config tag; accepts the same spellings as [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GraphKind {
    Complete,
    /// Small world, degree 4, rewiring probability 0.4.
    WattsStrogatz,
    /// Small world, degree 6, rewiring probability 0.8.
    WattsStrogatzD6,
    /// Most-square `rows x cols` lattice with `rows * cols = n`.
    Grid2d,
    Cycle,
}

impl FromStr for GraphKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "complete" => Ok(Self::Complete),
            "watts_strogatz" => Ok(Self::WattsStrogatz),
            "watts_strogatz_d6" => Ok(Self::WattsStrogatzD6),
            "grid_2d" | "2d_grid" => Ok(Self::Grid2d),
            "cycle" => Ok(Self::Cycle),
            _ => Err(SimError::UnknownGraphKind(s.to_string())),
        }
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Complete => "complete",
            Self::WattsStrogatz => "watts_strogatz",
            Self::WattsStrogatzD6 => "watts_strogatz_d6",
            Self::Grid2d => "grid_2d",
            Self::Cycle => "cycle",
        };
        write!(f, "{}", tag)
    }
}

impl TryFrom<String> for GraphKind {
    type Error = SimError;

    fn try_from(tag: String) -> Result<Self> {
        tag.parse()
    }
}

impl From<GraphKind> for String {
    fn from(kind: GraphKind) -> String {
        kind.to_string()
    }
}

/// Build a connected graph of the given kind, retrying with `seed + 1`,
/// `seed + 2`, ... when a random draw comes out disconnected.
pub fn generate_graph(n: usize, kind: GraphKind, seed: u64) -> Result<Graph> {
    if n < 2 {
        return Err(SimError::InvalidConfig(format!("a gossip network needs at least 2 nodes, got {n}")));
    }
    for attempt in 0..MAX_GRAPH_ATTEMPTS {
        let graph = build(n, kind, seed.wrapping_add(attempt as u64))?;
        if graph.is_connected() {
            return Ok(graph);
        }
        warn!(%kind, n, attempt, "generated graph is disconnected, regenerating");
    }
    Err(SimError::GraphDisconnected { attempts: MAX_GRAPH_ATTEMPTS })
}

fn build(n: usize, kind: GraphKind, seed: u64) -> Result<Graph> {
    let edges = match kind {
        GraphKind::Complete => complete_edges(n),
        GraphKind::Cycle => cycle_edges(n),
        GraphKind::Grid2d => {
            let (rows, cols) = best_side_from_surface(n);
            grid_edges(rows, cols)
        }
        GraphKind::WattsStrogatz => watts_strogatz_edges(n, 4, 0.4, seed),
        GraphKind::WattsStrogatzD6 => watts_strogatz_edges(n, 6, 0.8, seed),
    };
    Graph::new(n, edges)
}

fn complete_edges(n: usize) -> Vec<(usize, usize)> {
    (0..n).flat_map(|u| (u + 1..n).map(move |v| (u, v))).collect()
}

fn cycle_edges(n: usize) -> Vec<(usize, usize)> {
    if n == 2 {
        return vec![(0, 1)];
    }
    (0..n).map(|u| (u, (u + 1) % n)).collect()
}

/// Largest divisor of `s` not above `sqrt(s)`, paired with its cofactor.
fn best_side_from_surface(s: usize) -> (usize, usize) {
    let root = (s as f64).sqrt() as usize;
    (1..=root.max(1))
        .rev()
        .find(|i| s % i == 0)
        .map(|i| (i, s / i))
        .unwrap_or((1, s))
}

fn grid_edges(rows: usize, cols: usize) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            let node = r * cols + c;
            if r + 1 < rows {
                edges.push((node, node + cols));
            }
            if c + 1 < cols {
                edges.push((node, node + 1));
            }
        }
    }
    edges
}

/// Ring lattice with `k / 2` neighbours per side whose lattice edges are each
/// rewired with probability `p` to a uniformly chosen non-neighbour.
fn watts_strogatz_edges(n: usize, k: usize, p: f64, seed: u64) -> Vec<(usize, usize)> {
    if k >= n {
        return complete_edges(n);
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();
    let key = |u: usize, v: usize| (u.min(v), u.max(v));
    for offset in 1..=k / 2 {
        for u in 0..n {
            edges.insert(key(u, (u + offset) % n));
        }
    }

    let mut degree = vec![0usize; n];
    for &(u, v) in &edges {
        degree[u] += 1;
        degree[v] += 1;
    }

    for offset in 1..=k / 2 {
        for u in 0..n {
            let v = (u + offset) % n;
            if !edges.contains(&key(u, v)) || rng.gen::<f64>() >= p || degree[u] >= n - 1 {
                continue;
            }
            let candidates: Vec<usize> = (0..n)
                .filter(|&w| w != u && !edges.contains(&key(u, w)))
                .collect();
            if let Some(&w) = candidates.choose(&mut rng) {
                edges.remove(&key(u, v));
                edges.insert(key(u, w));
                degree[v] -= 1;
                degree[w] += 1;
            }
        }
    }
    edges.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_validation() {
        assert!(matches!(Graph::new(3, vec![]), Err(SimError::NoEdges)));
        assert!(matches!(
            Graph::new(3, vec![(0, 1), (1, 3)]),
            Err(SimError::EdgeOutOfRange { u: 1, v: 3, n: 3 })
        ));
        assert!(matches!(
            Graph::new(3, vec![(2, 2)]),
            Err(SimError::EdgeOutOfRange { .. })
        ));
    }

    #[test]
    fn deterministic_topologies_have_expected_sizes() {
        let complete = generate_graph(6, GraphKind::Complete, 0).unwrap();
        assert_eq!(complete.edge_count(), 15);
        let cycle = generate_graph(6, GraphKind::Cycle, 0).unwrap();
        assert_eq!(cycle.edge_count(), 6);
        let grid = generate_graph(12, GraphKind::Grid2d, 0).unwrap();
        // 3 x 4 lattice: 3 * 3 horizontal + 2 * 4 vertical.
        assert_eq!(grid.edge_count(), 17);
        assert!(grid.is_connected());
    }

    #[test]
    fn prime_grid_degenerates_to_a_path() {
        assert_eq!(best_side_from_surface(7), (1, 7));
        assert_eq!(best_side_from_surface(100), (10, 10));
        let path = generate_graph(7, GraphKind::Grid2d, 0).unwrap();
        assert_eq!(path.edge_count(), 6);
    }

    #[test]
    fn small_world_keeps_edge_count_and_connectivity() {
        for seed in 0..5 {
            let g = generate_graph(50, GraphKind::WattsStrogatz, seed).unwrap();
            assert_eq!(g.edge_count(), 100);
            assert!(g.is_connected());
            let d6 = generate_graph(50, GraphKind::WattsStrogatzD6, seed).unwrap();
            assert_eq!(d6.edge_count(), 150);
        }
    }

    #[test]
    fn same_seed_same_graph() {
        let a = generate_graph(30, GraphKind::WattsStrogatz, 42).unwrap();
        let b = generate_graph(30, GraphKind::WattsStrogatz, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn disconnected_graph_detected() {
        let g = Graph::new(4, vec![(0, 1), (2, 3)]).unwrap();
        assert!(!g.is_connected());
    }

    #[test]
    fn graph_tags_parse() {
        assert_eq!("Watts-Strogatz".parse::<GraphKind>().unwrap(), GraphKind::WattsStrogatz);
        assert_eq!("2D Grid".parse::<GraphKind>().unwrap(), GraphKind::Grid2d);
        assert!(matches!(
            "hypercube".parse::<GraphKind>(),
            Err(SimError::UnknownGraphKind(_))
        ));
        assert!(generate_graph(1, GraphKind::Complete, 0).is_err());
    }

    #[test]
    fn graph_tags_round_trip_through_serde() {
        let kinds = [
            GraphKind::Complete,
            GraphKind::WattsStrogatz,
            GraphKind::WattsStrogatzD6,
            GraphKind::Grid2d,
            GraphKind::Cycle,
        ];
        for kind in kinds {
            let yaml = serde_yaml::to_string(&kind).unwrap();
            assert_eq!(yaml.trim(), kind.to_string());
            assert_eq!(serde_yaml::from_str::<GraphKind>(&yaml).unwrap(), kind);
        }
        assert_eq!(serde_yaml::from_str::<GraphKind>("grid_2d").unwrap(), GraphKind::Grid2d);
        assert_eq!(serde_yaml::from_str::<GraphKind>("2D Grid").unwrap(), GraphKind::Grid2d);
        assert!(serde_yaml::from_str::<GraphKind>("grid2d").is_err());
    }
}
