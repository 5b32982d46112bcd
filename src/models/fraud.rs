//! Request and response models for wallet fraud analysis

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One observed transaction on a supported chain.
///
/// Transactions are immutable once received. Duplicates are not rejected;
/// they simply accumulate additional flow in the transaction graph.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct TransactionInput {
    pub tx_hash: String,
    pub chain: String,
    pub from_address: String,
    pub to_address: String,
    /// Transferred amount; must be non-negative
    #[validate(range(min = 0.0))]
    pub value: f64,
    /// Unix timestamp in seconds
    pub timestamp: i64,
}

/// Request DTO for scoring one wallet
#[derive(Debug, Deserialize, Validate, Clone)]
pub struct AnalyzeRequest {
    #[validate(length(min = 1))]
    pub wallet_address: String,
    pub chains: Vec<String>,
    #[validate]
    pub transactions: Vec<TransactionInput>,
}

/// Categorical risk bucket derived from the numeric fraud score
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Bucket a fraud score; thresholds are closed and left-inclusive,
    /// evaluated high to low.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            RiskLevel::Critical
        } else if score >= 0.6 {
            RiskLevel::High
        } else if score >= 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Final assessment returned for one wallet.
///
/// Created once per analysis call and never mutated afterwards. The core
/// does not persist assessments.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FraudAssessment {
    pub wallet_address: String,
    /// Aggregated score in [0, 1], rounded to 4 decimals
    pub fraud_score: f64,
    pub risk_level: RiskLevel,
    /// Human-readable reasons, in signal evaluation order; may be empty
    pub reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RiskLevel::Critical).unwrap(),
            "\"critical\""
        );
        assert_eq!(serde_json::to_string(&RiskLevel::Low).unwrap(), "\"low\"");
    }

    #[test]
    fn test_risk_level_as_str_matches_serde() {
        for level in [
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ] {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(json, format!("\"{}\"", level.as_str()));
        }
    }

    #[test]
    fn test_analyze_request_rejects_negative_value() {
        let request = AnalyzeRequest {
            wallet_address: "0xabc".to_string(),
            chains: vec!["ethereum".to_string()],
            transactions: vec![TransactionInput {
                tx_hash: "0x1".to_string(),
                chain: "ethereum".to_string(),
                from_address: "0xabc".to_string(),
                to_address: "0xdef".to_string(),
                value: -1.0,
                timestamp: 1_700_000_000,
            }],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_analyze_request_accepts_empty_transactions() {
        let request = AnalyzeRequest {
            wallet_address: "0xzzz".to_string(),
            chains: vec!["ethereum".to_string()],
            transactions: Vec::new(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_assessment_response_shape() {
        let assessment = FraudAssessment {
            wallet_address: "0xabc".to_string(),
            fraud_score: 0.2889,
            risk_level: RiskLevel::Low,
            reasons: Vec::new(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&assessment).unwrap()).unwrap();
        assert_eq!(json["wallet_address"], "0xabc");
        assert_eq!(json["fraud_score"], 0.2889);
        assert_eq!(json["risk_level"], "low");
        assert!(json["reasons"].as_array().unwrap().is_empty());
    }
}
