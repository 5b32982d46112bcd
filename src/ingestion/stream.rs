//! Append-only fraud event stream backed by Redis Streams
//!
//! Upstream collectors append observed events; the consumer tails the
//! stream from its last-seen position. Entries carry one `payload` field
//! with the JSON-encoded event.

use chrono::{DateTime, Utc};
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Stream position representing "nothing consumed yet"
pub const STREAM_START: &str = "0-0";

/// How long a single read blocks waiting for a new entry
const READ_BLOCK_MS: usize = 1000;

/// Ingestion stream errors
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Malformed event payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Stream entry is missing the payload field")]
    MissingPayload,
}

/// One observed on-chain event appended by upstream collectors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FraudEvent {
    pub event_id: Uuid,
    pub wallet_address: String,
    pub chain: String,
    pub observed_at: DateTime<Utc>,
}

impl FraudEvent {
    pub fn new(wallet_address: impl Into<String>, chain: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            wallet_address: wallet_address.into(),
            chain: chain.into(),
            observed_at: Utc::now(),
        }
    }
}

/// Producer/consumer handle for the fraud event stream
pub struct FraudEventStream {
    client: redis::Client,
    stream: String,
}

impl FraudEventStream {
    pub fn new(redis_url: &str, stream: impl Into<String>) -> Result<Self, IngestionError> {
        Ok(Self {
            client: redis::Client::open(redis_url)?,
            stream: stream.into(),
        })
    }

    pub fn stream_name(&self) -> &str {
        &self.stream
    }

    /// Append one event; returns the entry id assigned by the stream
    pub async fn publish(&self, event: &FraudEvent) -> Result<String, IngestionError> {
        let payload = serde_json::to_string(event)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let entry_id: String = conn
            .xadd(&self.stream, "*", &[("payload", payload.as_str())])
            .await?;
        Ok(entry_id)
    }

    /// Read the first entry after `last_id`, blocking briefly.
    /// Returns `None` when the read times out with nothing new.
    pub async fn read_next(
        &self,
        last_id: &str,
    ) -> Result<Option<(String, FraudEvent)>, IngestionError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let options = StreamReadOptions::default().block(READ_BLOCK_MS).count(1);
        let reply: StreamReadReply = conn
            .xread_options(&[&self.stream], &[last_id], &options)
            .await?;

        let Some(key) = reply.keys.into_iter().next() else {
            return Ok(None);
        };
        let Some(entry) = key.ids.into_iter().next() else {
            return Ok(None);
        };

        let payload = match entry.map.get("payload") {
            Some(redis::Value::Data(bytes)) => String::from_utf8_lossy(bytes).into_owned(),
            _ => return Err(IngestionError::MissingPayload),
        };
        let event: FraudEvent = serde_json::from_str(&payload)?;
        Ok(Some((entry.id, event)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_payload_round_trip() {
        let event = FraudEvent::new("0xabc", "ethereum");
        let payload = serde_json::to_string(&event).unwrap();
        let decoded: FraudEvent = serde_json::from_str(&payload).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_event_payload_field_names() {
        let event = FraudEvent::new("0xabc", "bsc");
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(json["wallet_address"], "0xabc");
        assert_eq!(json["chain"], "bsc");
        assert!(json["event_id"].is_string());
        assert!(json["observed_at"].is_string());
    }

    #[test]
    fn test_invalid_redis_url_is_rejected() {
        assert!(FraudEventStream::new("not-a-url", "fraud-events").is_err());
    }
}
