//! Transaction-graph construction and structural risk scoring
//!
//! Builds a directed graph of money flow from an observed transaction list
//! and derives a bounded risk contribution for one wallet from two structural
//! signals: an iterative influence measure over the whole graph and the
//! wallet's normalized local connectivity. The graph is built fresh per
//! request and discarded after scoring; there is no cross-request state.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use thiserror::Error;

use crate::models::fraud::TransactionInput;
use crate::services::round4;

// ============================================================================
// Scoring Constants
// ============================================================================

/// Contribution for a wallet with no observed edges. Such a wallet is not
/// assessable from graph structure, but is not risk-free either.
pub const ABSENT_WALLET_BASELINE: f64 = 0.1;

/// Floor applied to every in-graph wallet, keeping it above the
/// absent-wallet baseline
const IN_GRAPH_FLOOR: f64 = 0.3;

/// Influence multiplier; high-centrality hubs are the strongest fraud
/// signal, so influence dominates the combined contribution
const INFLUENCE_WEIGHT: f64 = 2.5;

// ============================================================================
// Transaction Graph
// ============================================================================

/// Accumulated money flow along one ordered address pair.
///
/// Repeated transactions between the same pair accumulate here instead of
/// creating parallel edges, which keeps degree semantics deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeFlow {
    pub total_value: f64,
    pub tx_count: u32,
}

/// Directed graph of observed money flow between wallet addresses
#[derive(Debug, Default)]
pub struct TransactionGraph {
    graph: DiGraph<String, EdgeFlow>,
    nodes: HashMap<String, NodeIndex>,
}

impl TransactionGraph {
    /// Build a graph from a transaction list. An empty list yields an empty
    /// graph, which is valid input for every scorer.
    pub fn build(transactions: &[TransactionInput]) -> Self {
        let mut tg = Self::default();
        for tx in transactions {
            let from = tg.get_or_add_node(&tx.from_address);
            let to = tg.get_or_add_node(&tx.to_address);
            match tg.graph.find_edge(from, to) {
                Some(edge) => {
                    let flow = &mut tg.graph[edge];
                    flow.total_value += tx.value;
                    flow.tx_count += 1;
                }
                None => {
                    tg.graph.add_edge(
                        from,
                        to,
                        EdgeFlow {
                            total_value: tx.value,
                            tx_count: 1,
                        },
                    );
                }
            }
        }
        tg
    }

    fn get_or_add_node(&mut self, address: &str) -> NodeIndex {
        if let Some(idx) = self.nodes.get(address) {
            return *idx;
        }
        let idx = self.graph.add_node(address.to_string());
        self.nodes.insert(address.to_string(), idx);
        idx
    }

    pub fn contains(&self, address: &str) -> bool {
        self.nodes.contains_key(address)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Accumulated flow for one ordered address pair, if any
    pub fn flow(&self, from: &str, to: &str) -> Option<EdgeFlow> {
        let from = *self.nodes.get(from)?;
        let to = *self.nodes.get(to)?;
        let edge = self.graph.find_edge(from, to)?;
        Some(self.graph[edge])
    }

    /// In-degree plus out-degree over distinct ordered pairs
    pub fn degree(&self, address: &str) -> usize {
        match self.nodes.get(address) {
            Some(&idx) => {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .count()
                    + self
                        .graph
                        .neighbors_directed(idx, Direction::Outgoing)
                        .count()
            }
            None => 0,
        }
    }
}

// ============================================================================
// Influence Models
// ============================================================================

/// Why an influence computation could not produce a result
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InfluenceError {
    #[error("influence computation did not converge within {0} iterations")]
    NotConverged(usize),
}

/// Iterative node-importance measure over the directed graph.
///
/// Implementations distribute a unit of total importance across all nodes,
/// weighted by incoming edges recursively from other important nodes. The
/// concrete numerical method is swappable without touching the scorer.
pub trait InfluenceModel: Send + Sync {
    fn compute(&self, graph: &TransactionGraph) -> Result<HashMap<String, f64>, InfluenceError>;
}

/// Power-iteration PageRank with uniform dangling-mass redistribution
#[derive(Debug, Clone)]
pub struct PageRankModel {
    pub damping: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for PageRankModel {
    fn default() -> Self {
        Self {
            damping: 0.9,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

impl InfluenceModel for PageRankModel {
    fn compute(&self, graph: &TransactionGraph) -> Result<HashMap<String, f64>, InfluenceError> {
        let g = &graph.graph;
        let n = g.node_count();
        if n == 0 {
            return Ok(HashMap::new());
        }

        let n_f = n as f64;
        let out_degree: Vec<usize> = g
            .node_indices()
            .map(|i| g.neighbors_directed(i, Direction::Outgoing).count())
            .collect();
        let mut ranks = vec![1.0 / n_f; n];

        for _ in 0..self.max_iterations {
            let dangling_mass: f64 = g
                .node_indices()
                .filter(|i| out_degree[i.index()] == 0)
                .map(|i| ranks[i.index()])
                .sum();

            let base = (1.0 - self.damping) / n_f + self.damping * dangling_mass / n_f;
            let mut next = vec![base; n];
            for node in g.node_indices() {
                let deg = out_degree[node.index()];
                if deg == 0 {
                    continue;
                }
                let share = self.damping * ranks[node.index()] / deg as f64;
                for succ in g.neighbors_directed(node, Direction::Outgoing) {
                    next[succ.index()] += share;
                }
            }

            // L1 convergence check, scaled by node count
            let err: f64 = next
                .iter()
                .zip(&ranks)
                .map(|(a, b)| (a - b).abs())
                .sum();
            ranks = next;
            if err < n_f * self.tolerance {
                return Ok(g
                    .node_indices()
                    .map(|i| (g[i].clone(), ranks[i.index()]))
                    .collect());
            }
        }

        Err(InfluenceError::NotConverged(self.max_iterations))
    }
}

// ============================================================================
// Graph Risk Scorer
// ============================================================================

/// Structural risk scorer for one wallet within a transaction graph
pub struct WalletGraphEngine {
    influence: Box<dyn InfluenceModel>,
}

impl Default for WalletGraphEngine {
    fn default() -> Self {
        Self::new(Box::new(PageRankModel::default()))
    }
}

impl WalletGraphEngine {
    pub fn new(influence: Box<dyn InfluenceModel>) -> Self {
        Self { influence }
    }

    /// Structural risk contribution for `wallet`, always in [0, 1].
    ///
    /// Non-convergence of the influence computation is an expected, handled
    /// condition: the wallet's influence estimate falls back to
    /// `degree / max(1, node_count)` and this method never fails.
    pub fn score(&self, wallet: &str, graph: &TransactionGraph) -> f64 {
        if !graph.contains(wallet) {
            return ABSENT_WALLET_BASELINE;
        }

        let influence = match self.influence.compute(graph) {
            Ok(ranks) => ranks.get(wallet).copied().unwrap_or(0.0),
            Err(InfluenceError::NotConverged(iterations)) => {
                tracing::warn!(
                    wallet = %wallet,
                    iterations,
                    "Influence computation did not converge, using degree heuristic"
                );
                graph.degree(wallet) as f64 / graph.node_count().max(1) as f64
            }
        };

        let node_count = graph.node_count();
        let local_connectivity = if node_count > 1 {
            graph.degree(wallet) as f64 / (node_count - 1) as f64
        } else {
            // A self-loop-only graph has no peers to normalize against
            0.0
        };

        round4(IN_GRAPH_FLOOR + influence * INFLUENCE_WEIGHT + local_connectivity).min(1.0)
    }
}
