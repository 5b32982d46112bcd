//! Thin JSON-RPC clients for the supported chains
//!
//! Maps a chain name to its HTTP JSON-RPC provider and exposes the one
//! lookup the platform needs: the latest block number. The scoring path
//! never calls into this module.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use thiserror::Error;

/// Chain RPC lookup errors
#[derive(Debug, Error)]
pub enum ChainRpcError {
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed RPC response: {0}")]
    MalformedResponse(String),
}

/// JSON-RPC client keyed by chain name
pub struct MultiChainRpcClient {
    endpoints: HashMap<String, String>,
    client: Client,
}

impl MultiChainRpcClient {
    /// Create a client over a chain-name to provider-URL map
    pub fn new(endpoints: HashMap<String, String>) -> Self {
        Self {
            endpoints,
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Names of the chains this client can reach
    pub fn supported_chains(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    /// Latest block number for `chain` via `eth_blockNumber`
    pub async fn latest_block(&self, chain: &str) -> Result<u64, ChainRpcError> {
        let url = self
            .endpoints
            .get(chain)
            .ok_or_else(|| ChainRpcError::UnsupportedChain(chain.to_string()))?;

        let body = json!({
            "jsonrpc": "2.0",
            "method": "eth_blockNumber",
            "params": [],
            "id": 1,
        });

        let response: serde_json::Value = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        let result = response
            .get("result")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ChainRpcError::MalformedResponse(response.to_string()))?;

        parse_hex_quantity(result)
    }
}

/// Parse a 0x-prefixed hex quantity as returned by `eth_blockNumber`
fn parse_hex_quantity(raw: &str) -> Result<u64, ChainRpcError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(digits, 16).map_err(|_| ChainRpcError::MalformedResponse(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_quantity() {
        assert_eq!(parse_hex_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_hex_quantity("0x10").unwrap(), 16);
        assert_eq!(parse_hex_quantity("0x112a880").unwrap(), 18_000_000);
        assert!(parse_hex_quantity("0xzz").is_err());
        assert!(parse_hex_quantity("").is_err());
    }

    #[tokio::test]
    async fn test_unknown_chain_is_an_error() {
        let client = MultiChainRpcClient::new(HashMap::from([(
            "ethereum".to_string(),
            "http://localhost:1".to_string(),
        )]));

        let err = client.latest_block("dogecoin").await.unwrap_err();
        assert!(matches!(err, ChainRpcError::UnsupportedChain(_)));
    }

    #[test]
    fn test_supported_chains_reflect_endpoints() {
        let client = MultiChainRpcClient::new(HashMap::from([
            ("ethereum".to_string(), "http://localhost:1".to_string()),
            ("bsc".to_string(), "http://localhost:2".to_string()),
        ]));

        let mut chains: Vec<&str> = client.supported_chains().collect();
        chains.sort_unstable();
        assert_eq!(chains, vec!["bsc", "ethereum"]);
    }
}
