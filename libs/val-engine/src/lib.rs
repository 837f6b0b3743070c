pub mod bootstrap;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod resolver;
pub mod router;
pub mod schema;
pub mod sink;
pub mod transport;

pub use bootstrap::{build_router, create_transport, Engine};
pub use config::BridgeConfig;
pub use envelope::{EnvelopeComposer, EnvelopeField};
pub use error::EngineError;
pub use extract::{extract, Extraction};
pub use router::{Binding, Router, RouterError, TopicPattern};
pub use schema::SchemaDescriptor;
pub use sink::SinkKind;
pub use transport::MemoryTransport;
