//! Where extracted records go.

use std::fmt;
use std::sync::Arc;

use prost::Message;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use val_api::record::TypedRecord;
use val_api::transport::{Delivery, Transport};

use crate::envelope::{EnvelopeComposer, EnvelopeField};
use crate::router::join_prefix;

/// Sink of a binding.
///
/// In TOML: `sink = { kind = "log" }`,
/// `sink = { kind = "publish", topic = "out/x" }`,
/// `sink = { kind = "compose", field = "alerts" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkKind {
    /// `info!` the record.
    Log,
    /// Encode as protobuf and put on `topic`.
    Publish { topic: String },
    /// Merge into the vessel envelope. `field` defaults from the record kind.
    Compose {
        #[serde(default)]
        field: Option<String>,
    },
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Log => f.write_str("log"),
            SinkKind::Publish { topic } => write!(f, "publish:{topic}"),
            SinkKind::Compose { field: Some(field) } => write!(f, "compose:{field}"),
            SinkKind::Compose { field: None } => f.write_str("compose"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound queue
// ---------------------------------------------------------------------------

/// Handle to the outbound publisher.
///
/// Sinks never wait on the transport: messages are queued with `try_send`
/// and one task puts them in queue order. A full queue drops the message
/// with a warning.
#[derive(Debug, Clone)]
pub struct Outbound {
    tx: mpsc::Sender<Delivery>,
}

impl Outbound {
    /// Spawn the publisher task. It stops once every `Outbound` is dropped
    /// and the queue is drained.
    pub fn spawn(transport: Arc<dyn Transport>, buffer: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let handle = tokio::spawn(run_outbound(transport, rx));
        (Self { tx }, handle)
    }

    pub fn send(&self, topic: String, payload: Vec<u8>) {
        match self.tx.try_send(Delivery { topic, payload }) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(d)) => {
                tracing::warn!(topic = %d.topic, "outbound queue full, dropping message");
            }
            Err(mpsc::error::TrySendError::Closed(d)) => {
                tracing::warn!(topic = %d.topic, "outbound publisher stopped, dropping message");
            }
        }
    }
}

async fn run_outbound(transport: Arc<dyn Transport>, mut rx: mpsc::Receiver<Delivery>) {
    while let Some(delivery) = rx.recv().await {
        if let Err(e) = transport.put(&delivery.topic, delivery.payload).await {
            tracing::warn!(topic = %delivery.topic, error = %e, "publish failed");
        }
    }
    tracing::debug!("outbound publisher stopped");
}

// ---------------------------------------------------------------------------
// Sink context
// ---------------------------------------------------------------------------

/// Shared state the sinks write through.
pub struct SinkContext {
    outbound: Outbound,
    composer: Arc<EnvelopeComposer>,
    envelope_publish_to: Option<String>,
}

impl SinkContext {
    pub fn new(
        outbound: Outbound,
        composer: Arc<EnvelopeComposer>,
        envelope_publish_to: Option<String>,
    ) -> Self {
        Self {
            outbound,
            composer,
            envelope_publish_to,
        }
    }

    pub fn composer(&self) -> &Arc<EnvelopeComposer> {
        &self.composer
    }

    /// Hand `record` to `sink`. Never blocks and never fails; problems are
    /// logged and the record is dropped.
    pub fn deliver(&self, topic: &str, schema: &str, sink: &SinkKind, record: &TypedRecord) {
        match sink {
            SinkKind::Log => {
                tracing::info!(topic = %topic, schema, "Received {}: {:?}", record.kind().message_name(), record);
            }
            SinkKind::Publish { topic: out } => {
                self.outbound.send(out.clone(), record.encode_to_vec());
                tracing::debug!(topic = %topic, out = %out, schema, "queued record");
            }
            SinkKind::Compose { field } => self.compose(topic, field.as_deref(), record),
        }
    }

    fn compose(&self, topic: &str, field: Option<&str>, record: &TypedRecord) {
        let field = match field {
            Some(f) => f,
            None => match EnvelopeField::for_kind(record.kind()) {
                Some(f) => f.as_str(),
                None => {
                    tracing::warn!(topic = %topic, kind = ?record.kind(), "record kind has no envelope field");
                    return;
                }
            },
        };

        let Some(mmsi) = record.entity_id() else {
            tracing::debug!(topic = %topic, field, "record has no mmsi, skipping envelope");
            return;
        };

        // Queued under the entity lock so snapshots of one vessel leave in
        // the order they were composed.
        let updated = self.composer.compose_with(mmsi, field, record, |envelope| {
            if let Some(prefix) = &self.envelope_publish_to {
                let out = join_prefix(prefix, &mmsi.to_string());
                self.outbound.send(out, envelope.encode_to_vec());
            }
        });
        if updated.is_some() {
            tracing::debug!(topic = %topic, mmsi, field, "envelope updated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use val_api::record::{Measurement, MeasurementValue, VesselEnvelope};

    #[derive(Deserialize)]
    struct Holder {
        sink: SinkKind,
    }

    #[test]
    fn test_sink_from_toml() {
        let h: Holder = toml::from_str(r#"sink = { kind = "log" }"#).unwrap();
        assert_eq!(h.sink, SinkKind::Log);

        let h: Holder = toml::from_str(r#"sink = { kind = "publish", topic = "out/x" }"#).unwrap();
        assert_eq!(h.sink, SinkKind::Publish { topic: "out/x".into() });

        let h: Holder = toml::from_str(r#"sink = { kind = "compose" }"#).unwrap();
        assert_eq!(h.sink, SinkKind::Compose { field: None });
    }

    #[test]
    fn test_sink_display() {
        assert_eq!(SinkKind::Compose { field: Some("alerts".into()) }.to_string(), "compose:alerts");
        assert_eq!(SinkKind::Log.to_string(), "log");
    }

    fn value(mmsi: u32, name: String) -> TypedRecord {
        TypedRecord::MeasurementValue(MeasurementValue {
            mmsi,
            publish_stamp: None,
            measurement: Some(Measurement { name, value: 1.0, unit: String::new() }),
        })
    }

    #[tokio::test]
    async fn test_full_outbound_queue_drops_without_waiting() {
        let transport = Arc::new(MemoryTransport::new(1));
        let sub = transport.subscribe("out/**").await.unwrap();
        let (outbound, handle) = Outbound::spawn(transport.clone(), 1);

        // Queue of one and nobody reading: extra messages are dropped and
        // `send` never waits.
        for i in 0..20 {
            outbound.send("out/x".into(), vec![i]);
        }
        drop(outbound);
        drop(sub);
        handle.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_envelope_snapshots_leave_in_compose_order() {
        const TASKS: usize = 4;
        const PER_TASK: usize = 25;

        let transport = Arc::new(MemoryTransport::new(TASKS * PER_TASK));
        let mut sub = transport.subscribe("env/**").await.unwrap();
        let (outbound, handle) = Outbound::spawn(transport.clone(), TASKS * PER_TASK);
        let composer = Arc::new(EnvelopeComposer::new());
        let sinks = Arc::new(SinkContext::new(outbound, Arc::clone(&composer), Some("env".into())));

        let mut tasks = Vec::new();
        for t in 0..TASKS {
            let sinks = Arc::clone(&sinks);
            tasks.push(tokio::spawn(async move {
                let sink = SinkKind::Compose { field: None };
                for i in 0..PER_TASK {
                    let record = value(257, format!("m{t}-{i}"));
                    sinks.deliver("val/amoc/257/value", "measurement_value", &sink, &record);
                    tokio::task::yield_now().await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        drop(sinks);
        handle.await.unwrap();

        // Every update adds one distinct measurement, so snapshots published
        // in order grow by exactly one each time.
        for expected in 1..=TASKS * PER_TASK {
            let delivery = sub.recv().await.unwrap();
            assert_eq!(delivery.topic, "env/257");
            let env = VesselEnvelope::decode(delivery.payload.as_slice()).unwrap();
            assert_eq!(env.measurement_values.len(), expected);
        }
        assert_eq!(composer.snapshot(257).unwrap().measurement_values.len(), TASKS * PER_TASK);
    }
}
