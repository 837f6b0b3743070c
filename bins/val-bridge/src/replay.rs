//! Feed a capture file through the transport.
//!
//! One JSON object per line: `{"topic": "val/amoc/1/location", "payload": {...}}`.
//! A string payload is sent as raw text; anything else is re-serialized.

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use val_api::transport::Transport;

#[derive(Debug, Deserialize)]
struct CapturedMessage {
    topic: String,
    payload: serde_json::Value,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub sent: usize,
    pub skipped: usize,
}

pub async fn replay_file(path: &str, transport: &dyn Transport) -> std::io::Result<ReplayStats> {
    let file = tokio::fs::File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut stats = ReplayStats::default();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let msg: CapturedMessage = match serde_json::from_str(&line) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(path, line = line_no, error = %e, "skipping capture line");
                stats.skipped += 1;
                continue;
            }
        };
        let bytes = match msg.payload {
            serde_json::Value::String(text) => text.into_bytes(),
            other => other.to_string().into_bytes(),
        };
        if let Err(e) = transport.put(&msg.topic, bytes).await {
            tracing::warn!(topic = %msg.topic, error = %e, "replay put failed");
            stats.skipped += 1;
            continue;
        }
        stats.sent += 1;
    }

    tracing::info!(path, sent = stats.sent, skipped = stats.skipped, "replay finished");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use val_engine::MemoryTransport;

    #[tokio::test]
    async fn test_replay_sends_valid_lines() {
        let path = std::env::temp_dir().join(format!("val-bridge-replay-{}.jsonl", std::process::id()));
        let capture = concat!(
            r#"{"topic": "val/amoc/1/location", "payload": {"mmsi": 1}}"#, "\n",
            "\n",
            "not json\n",
            r#"{"topic": "val/amoc/vessels", "payload": "{\"vessels\": []}"}"#, "\n",
        );
        tokio::fs::write(&path, capture).await.unwrap();

        let transport = MemoryTransport::new(8);
        let mut sub = transport.subscribe("val/**").await.unwrap();
        let stats = replay_file(path.to_str().unwrap(), &transport).await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(stats, ReplayStats { sent: 2, skipped: 1 });
        let first = sub.recv().await.unwrap();
        assert_eq!(first.topic, "val/amoc/1/location");
        assert_eq!(first.payload, br#"{"mmsi":1}"#);
        let second = sub.recv().await.unwrap();
        assert_eq!(second.payload, br#"{"vessels": []}"#);
    }
}
