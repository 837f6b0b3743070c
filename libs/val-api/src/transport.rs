use std::future::Future;
use std::pin::Pin;

/// One inbound message: the concrete topic it was published on plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl Delivery {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid key expression '{0}'")]
    InvalidKeyExpr(String),

    #[error("transport closed")]
    Closed,

    #[error("transport error: {0}")]
    Other(String),
}

/// Stream of deliveries for one key expression.
pub trait Subscription: Send {
    /// Next delivery. `None` = transport closed / subscription cancelled.
    fn recv(&mut self) -> Pin<Box<dyn Future<Output = Option<Delivery>> + Send + '_>>;
}

/// Pub/sub boundary. The engine only sees this trait; the wire protocol
/// behind it is out of scope.
pub trait Transport: Send + Sync {
    /// Subscribe to every topic matching `key_expr` (`*` / `**` wildcards).
    #[allow(clippy::type_complexity)]
    fn subscribe(
        &self,
        key_expr: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn Subscription>, TransportError>> + Send + '_>>;

    /// Publish raw bytes on a concrete topic.
    fn put(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + '_>>;

    /// Close the session. Open subscriptions drain and then yield `None`.
    fn close(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}
