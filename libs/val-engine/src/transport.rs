//! In-process [`Transport`]: key-expression matching over mpsc channels.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, RwLock};

use val_api::transport::{Delivery, Subscription, Transport, TransportError};

use crate::router::TopicPattern;

struct Subscriber {
    key_expr: TopicPattern,
    tx: mpsc::Sender<Delivery>,
}

pub struct MpscSubscription {
    rx: mpsc::Receiver<Delivery>,
}

impl Subscription for MpscSubscription {
    fn recv(&mut self) -> Pin<Box<dyn Future<Output = Option<Delivery>> + Send + '_>> {
        Box::pin(async { self.rx.recv().await })
    }
}

/// Loopback pub/sub bus used by the binary and the tests.
///
/// `put` waits for channel capacity on every matching subscriber, so a slow
/// subscriber applies backpressure to publishers.
pub struct MemoryTransport {
    buffer: usize,
    subscribers: RwLock<Vec<Subscriber>>,
    closed: AtomicBool,
}

impl MemoryTransport {
    pub fn new(buffer: usize) -> Self {
        Self {
            buffer: buffer.max(1),
            subscribers: RwLock::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    fn check_open(&self) -> Result<(), TransportError> {
        if self.closed.load(Ordering::Acquire) {
            Err(TransportError::Closed)
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl Transport for MemoryTransport {
    fn subscribe(
        &self,
        key_expr: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn Subscription>, TransportError>> + Send + '_>> {
        let parsed = TopicPattern::parse(key_expr)
            .map_err(|_| TransportError::InvalidKeyExpr(key_expr.to_string()));
        Box::pin(async move {
            self.check_open()?;
            let key_expr = parsed?;
            let (tx, rx) = mpsc::channel(self.buffer);
            tracing::debug!(key_expr = %key_expr, "memory transport subscriber added");
            self.subscribers.write().await.push(Subscriber { key_expr, tx });
            Ok(Box::new(MpscSubscription { rx }) as Box<dyn Subscription>)
        })
    }

    fn put(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + '_>> {
        let topic = topic.to_string();
        Box::pin(async move {
            self.check_open()?;

            // Senders are cloned out so the lock is not held across sends.
            let targets: Vec<mpsc::Sender<Delivery>> = self
                .subscribers
                .read()
                .await
                .iter()
                .filter(|s| s.key_expr.matches(&topic))
                .map(|s| s.tx.clone())
                .collect();

            let mut stale = false;
            for tx in targets {
                let delivery = Delivery {
                    topic: topic.clone(),
                    payload: payload.clone(),
                };
                if tx.send(delivery).await.is_err() {
                    stale = true;
                }
            }

            if stale {
                let mut subs = self.subscribers.write().await;
                subs.retain(|s| !s.tx.is_closed());
                tracing::debug!(topic = %topic, remaining = subs.len(), "pruned closed subscribers");
            }
            Ok(())
        })
    }

    fn close(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if self.closed.swap(true, Ordering::AcqRel) {
                return;
            }
            let mut subs = self.subscribers.write().await;
            tracing::debug!(subscribers = subs.len(), "memory transport closed");
            // Dropping the senders ends every subscription once drained.
            subs.clear();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_reaches_matching_subscribers() {
        let transport = MemoryTransport::new(8);
        let mut all = transport.subscribe("val/**").await.unwrap();
        let mut values = transport.subscribe("val/*/value").await.unwrap();

        transport.put("val/1/value", b"a".to_vec()).await.unwrap();
        transport.put("val/vessels", b"b".to_vec()).await.unwrap();

        assert_eq!(all.recv().await.unwrap().topic, "val/1/value");
        assert_eq!(all.recv().await.unwrap().topic, "val/vessels");
        let only = values.recv().await.unwrap();
        assert_eq!(only.payload, b"a");
    }

    #[tokio::test]
    async fn test_close_ends_subscriptions_after_drain() {
        let transport = MemoryTransport::new(8);
        let mut sub = transport.subscribe("**").await.unwrap();
        transport.put("x", b"1".to_vec()).await.unwrap();
        transport.close().await;

        assert!(sub.recv().await.is_some());
        assert!(sub.recv().await.is_none());
        assert!(matches!(
            transport.put("x", Vec::new()).await,
            Err(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_invalid_key_expr() {
        let transport = MemoryTransport::default();
        assert!(matches!(
            transport.subscribe("val//x").await,
            Err(TransportError::InvalidKeyExpr(_))
        ));
    }

    #[tokio::test]
    async fn test_dropped_subscription_pruned() {
        let transport = MemoryTransport::new(1);
        let sub = transport.subscribe("**").await.unwrap();
        drop(sub);
        transport.put("x", Vec::new()).await.unwrap();
        assert_eq!(transport.subscriber_count().await, 0);
    }
}
