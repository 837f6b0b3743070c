//! Delivery → route → decode → extract → sink.
//!
//! One reader task drains the transport subscription and shards deliveries
//! by topic hash onto N workers. Per-topic order is preserved; different
//! topics are processed in parallel. This is the only place decode and
//! extraction errors become log lines.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use val_api::transport::{Delivery, Subscription};

use crate::codec;
use crate::extract::{extract, Extraction};
use crate::router::Router;
use crate::sink::SinkContext;

/// Running dispatch tasks.
pub(crate) struct DispatchTasks {
    pub reader: JoinHandle<()>,
    pub workers: Vec<JoinHandle<()>>,
}

pub(crate) fn spawn(
    subscription: Box<dyn Subscription>,
    router: Arc<Router>,
    sinks: Arc<SinkContext>,
    workers: usize,
    buffer: usize,
    shutdown_rx: watch::Receiver<bool>,
) -> DispatchTasks {
    let workers = workers.max(1);
    let mut senders = Vec::with_capacity(workers);
    let mut handles = Vec::with_capacity(workers);

    for id in 0..workers {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        senders.push(tx);
        handles.push(tokio::spawn(run_worker(id, rx, Arc::clone(&router), Arc::clone(&sinks))));
    }

    let reader = tokio::spawn(run_reader(subscription, senders, shutdown_rx));
    DispatchTasks { reader, workers: handles }
}

async fn run_reader(
    mut subscription: Box<dyn Subscription>,
    workers: Vec<mpsc::Sender<Delivery>>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        let delivery = tokio::select! {
            _ = shutdown_rx.changed() => {
                tracing::debug!("dispatch reader received shutdown signal");
                break;
            }
            next = subscription.recv() => match next {
                Some(d) => d,
                None => {
                    tracing::debug!("subscription closed");
                    break;
                }
            },
        };

        let shard = shard_for(&delivery.topic, workers.len());
        if workers[shard].send(delivery).await.is_err() {
            tracing::error!(worker = shard, "dispatch worker gone, stopping reader");
            break;
        }
    }
    // Dropping the senders lets workers drain their queues and exit.
}

async fn run_worker(
    id: usize,
    mut rx: mpsc::Receiver<Delivery>,
    router: Arc<Router>,
    sinks: Arc<SinkContext>,
) {
    while let Some(delivery) = rx.recv().await {
        let span = tracing::debug_span!("delivery", worker = id, topic = %delivery.topic);
        span.in_scope(|| process(&delivery, &router, &sinks));
    }
    tracing::debug!(worker = id, "dispatch worker stopped");
}

fn shard_for(topic: &str, workers: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    topic.hash(&mut hasher);
    (hasher.finish() % workers as u64) as usize
}

/// Handle one delivery. Never fails and never waits: every error is logged
/// here and the delivery (or the offending binding) is dropped.
pub fn process(delivery: &Delivery, router: &Router, sinks: &SinkContext) {
    let topic = delivery.topic.as_str();
    let bindings = router.route(topic);
    if bindings.is_empty() {
        tracing::trace!(topic = %topic, "no binding for topic");
        return;
    }

    let tree = match codec::decode_payload(&delivery.payload) {
        Ok(tree) => tree,
        Err(e) => {
            if e.is_payload_fatal() {
                tracing::error!(topic = %topic, error = %e, "dropping payload");
            } else {
                tracing::warn!(topic = %topic, error = %e, "dropping payload");
            }
            return;
        }
    };

    // Several bindings may share a schema (log + compose); extract once each.
    let mut extracted: Vec<(&'static str, Option<Extraction>)> = Vec::new();
    for binding in bindings {
        let schema = binding.schema.name;
        let slot = match extracted.iter().position(|(name, _)| *name == schema) {
            Some(i) => i,
            None => {
                let result = match extract(&tree, binding.schema) {
                    Ok(extraction) => {
                        for e in &extraction.element_errors {
                            tracing::warn!(topic = %topic, schema, error = %e, "skipped list element");
                        }
                        Some(extraction)
                    }
                    Err(e) if e.is_payload_fatal() => {
                        tracing::error!(topic = %topic, schema, error = %e, "extraction failed");
                        None
                    }
                    Err(e) => {
                        tracing::warn!(topic = %topic, schema, error = %e, "extraction failed");
                        None
                    }
                };
                extracted.push((schema, result));
                extracted.len() - 1
            }
        };

        let Some(extraction) = &extracted[slot].1 else {
            continue;
        };
        sinks.deliver(topic, schema, &binding.sink, &extraction.record);
    }
}
