//! Fraud detection service aggregating the three risk signals
//!
//! Combines the graph-structural contribution, the value-sequence anomaly
//! contribution, and the cross-chain heuristic into one fraud score with a
//! categorical risk level and human-readable reasons. The whole path is
//! pure and synchronous: each call builds its own graph and fits its own
//! anomaly model, so concurrent calls share no mutable state.

use std::collections::HashSet;

use crate::models::fraud::{AnalyzeRequest, FraudAssessment, RiskLevel};
use crate::services::anomaly::TimeSeriesAnomalyDetector;
use crate::services::graph_engine::{TransactionGraph, WalletGraphEngine};
use crate::services::round4;

// ============================================================================
// Policy Constants
// ============================================================================

/// Number of chains the service natively supports (ethereum, bsc, polygon)
pub const SUPPORTED_CHAIN_COUNT: usize = 3;

/// Sub-score threshold above which a signal contributes a reason string.
/// These encode reporting policy, not scoring mechanism.
pub const DEFAULT_REASON_THRESHOLD: f64 = 0.7;

/// Base cross-chain contribution for a wallet seen on no chains
const CROSS_CHAIN_BASE: f64 = 0.35;

/// Span added as distinct-chain coverage approaches the supported set
const CROSS_CHAIN_SPAN: f64 = 0.65;

/// Reason reported when graph structure drives the score
pub const REASON_GRAPH: &str = "Wallet has suspicious graph centrality and high-risk neighbors";

/// Reason reported when the value sequence drives the score
pub const REASON_ANOMALY: &str = "Transaction sequence exhibits anomalous spikes";

/// Reason reported when chain diversity drives the score
pub const REASON_CROSS_CHAIN: &str =
    "Cross-chain behavior indicates rapid bridge-and-drain pattern";

// ============================================================================
// Service
// ============================================================================

/// Wallet fraud scoring service
pub struct FraudDetectionService {
    graph_engine: WalletGraphEngine,
    ts_detector: TimeSeriesAnomalyDetector,
    graph_reason_threshold: f64,
    anomaly_reason_threshold: f64,
    cross_chain_reason_threshold: f64,
}

impl Default for FraudDetectionService {
    fn default() -> Self {
        Self::new(
            WalletGraphEngine::default(),
            TimeSeriesAnomalyDetector::default(),
        )
    }
}

impl FraudDetectionService {
    pub fn new(graph_engine: WalletGraphEngine, ts_detector: TimeSeriesAnomalyDetector) -> Self {
        Self {
            graph_engine,
            ts_detector,
            graph_reason_threshold: DEFAULT_REASON_THRESHOLD,
            anomaly_reason_threshold: DEFAULT_REASON_THRESHOLD,
            cross_chain_reason_threshold: DEFAULT_REASON_THRESHOLD,
        }
    }

    /// Override the per-signal reason thresholds
    pub fn with_reason_thresholds(mut self, graph: f64, anomaly: f64, cross_chain: f64) -> Self {
        self.graph_reason_threshold = graph;
        self.anomaly_reason_threshold = anomaly;
        self.cross_chain_reason_threshold = cross_chain;
        self
    }

    /// Score one wallet from its observed transactions.
    ///
    /// Always returns a well-formed assessment for well-formed input: the
    /// score is in [0, 1] rounded to 4 decimals and the risk level is one
    /// of the four buckets. Degenerate input (empty transaction list,
    /// wallet absent from the graph, short value sequence) resolves to
    /// fixed baseline contributions, never errors.
    pub fn analyze(&self, request: &AnalyzeRequest) -> FraudAssessment {
        let graph = TransactionGraph::build(&request.transactions);
        let graph_score = self.graph_engine.score(&request.wallet_address, &graph);

        let values: Vec<f64> = request.transactions.iter().map(|tx| tx.value).collect();
        let anomaly_score = self.ts_detector.score(&values);

        let cross_chain_score = Self::cross_chain_score(&request.chains);

        let fraud_score = round4((graph_score + anomaly_score + cross_chain_score) / 3.0);

        let mut reasons = Vec::new();
        if graph_score > self.graph_reason_threshold {
            reasons.push(REASON_GRAPH.to_string());
        }
        if anomaly_score > self.anomaly_reason_threshold {
            reasons.push(REASON_ANOMALY.to_string());
        }
        if cross_chain_score > self.cross_chain_reason_threshold {
            reasons.push(REASON_CROSS_CHAIN.to_string());
        }

        FraudAssessment {
            wallet_address: request.wallet_address.clone(),
            fraud_score,
            risk_level: RiskLevel::from_score(fraud_score),
            reasons,
        }
    }

    /// Heuristic contribution from the diversity of chains involved.
    /// Monotonic non-decreasing in the number of distinct chains; exactly
    /// 1.0 once the whole supported set is covered.
    pub fn cross_chain_score(chains: &[String]) -> f64 {
        let distinct = chains.iter().collect::<HashSet<_>>().len();
        let factor = distinct as f64 / SUPPORTED_CHAIN_COUNT as f64;
        round4(CROSS_CHAIN_BASE + factor * CROSS_CHAIN_SPAN).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fraud::TransactionInput;

    fn chains(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cross_chain_score_values() {
        assert_eq!(FraudDetectionService::cross_chain_score(&[]), 0.35);
        assert_eq!(
            FraudDetectionService::cross_chain_score(&chains(&["ethereum"])),
            0.5667
        );
        assert_eq!(
            FraudDetectionService::cross_chain_score(&chains(&["ethereum", "bsc"])),
            0.7833
        );
        assert_eq!(
            FraudDetectionService::cross_chain_score(&chains(&["ethereum", "bsc", "polygon"])),
            1.0
        );
    }

    #[test]
    fn test_cross_chain_score_counts_distinct_chains() {
        assert_eq!(
            FraudDetectionService::cross_chain_score(&chains(&[
                "ethereum", "ethereum", "ethereum"
            ])),
            0.5667
        );
    }

    #[test]
    fn test_cross_chain_score_caps_beyond_supported_set() {
        let score = FraudDetectionService::cross_chain_score(&chains(&[
            "ethereum", "bsc", "polygon", "arbitrum",
        ]));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_cross_chain_score_monotonic() {
        let names = ["ethereum", "bsc", "polygon", "arbitrum", "base"];
        let mut previous = FraudDetectionService::cross_chain_score(&[]);
        for take in 1..=names.len() {
            let score = FraudDetectionService::cross_chain_score(&chains(&names[..take]));
            assert!(score >= previous);
            previous = score;
        }
    }

    #[test]
    fn test_reasons_follow_evaluation_order() {
        // Thresholds at zero force every reason on
        let service = FraudDetectionService::default().with_reason_thresholds(0.0, 0.0, 0.0);
        let request = AnalyzeRequest {
            wallet_address: "0xabc".to_string(),
            chains: chains(&["ethereum"]),
            transactions: vec![TransactionInput {
                tx_hash: "0x1".to_string(),
                chain: "ethereum".to_string(),
                from_address: "0xabc".to_string(),
                to_address: "0xdef".to_string(),
                value: 10.0,
                timestamp: 1_700_000_000,
            }],
        };
        let assessment = service.analyze(&request);
        assert_eq!(
            assessment.reasons,
            vec![
                REASON_GRAPH.to_string(),
                REASON_ANOMALY.to_string(),
                REASON_CROSS_CHAIN.to_string()
            ]
        );
    }

    #[test]
    fn test_analyze_empty_request_uses_baselines() {
        let service = FraudDetectionService::default();
        let request = AnalyzeRequest {
            wallet_address: "0xzzz".to_string(),
            chains: Vec::new(),
            transactions: Vec::new(),
        };
        let assessment = service.analyze(&request);
        // mean(0.1, 0.2, 0.35) rounded to 4 decimals
        assert!((assessment.fraud_score - 0.2167).abs() < 1e-9);
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert!(assessment.reasons.is_empty());
    }
}
