//! Asynchronous ingestion path feeding future analyses
//!
//! A separate worker loop tails the fraud event stream and logs what
//! arrives, enriched with the source chain's head block when the RPC
//! provider answers. The scoring path never reads or writes the stream.

mod stream;

pub use stream::{FraudEvent, FraudEventStream, IngestionError, STREAM_START};

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::chains::MultiChainRpcClient;

/// Pause after a stream error before retrying
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Consume the event stream forever.
///
/// Transient errors are logged and retried after a short backoff; this
/// task only exits with the process.
pub async fn run_ingestion_loop(stream: Arc<FraudEventStream>, rpc: Arc<MultiChainRpcClient>) {
    tracing::info!(stream = %stream.stream_name(), "Ingestion consumer started");
    let mut last_id = STREAM_START.to_string();

    loop {
        match stream.read_next(&last_id).await {
            Ok(Some((entry_id, event))) => {
                // Best-effort enrichment; a failed lookup must not stall
                // the stream
                let chain_head = rpc.latest_block(&event.chain).await.ok();
                tracing::info!(
                    entry_id = %entry_id,
                    event_id = %event.event_id,
                    wallet = %event.wallet_address,
                    chain = %event.chain,
                    chain_head = ?chain_head,
                    "Received fraud event"
                );
                last_id = entry_id;
            }
            Ok(None) => {
                // Read timed out with nothing new; poll again
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read from event stream");
                sleep(ERROR_BACKOFF).await;
            }
        }
    }
}
