use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use val_api::transport::Transport;

use crate::catalog;
use crate::config::{BindingConfig, BridgeConfig, TransportConfig};
use crate::dispatch::{self, DispatchTasks};
use crate::envelope::EnvelopeComposer;
use crate::error::EngineError;
use crate::router::{join_prefix, Binding, Router, TopicPattern};
use crate::sink::{Outbound, SinkContext};
use crate::transport::MemoryTransport;

/// The running bridge: router, envelope table, dispatch and publisher tasks.
pub struct Engine {
    router: Arc<Router>,
    composer: Arc<EnvelopeComposer>,
    tasks: DispatchTasks,
    outbound: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
    config: BridgeConfig,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("router", &self.router)
            .field("envelopes", &self.composer.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Engine {
    /// Bootstrap the engine from a parsed configuration.
    ///
    /// Builds the binding table, subscribes once to the configured key
    /// expression and spawns the dispatch tasks.
    pub async fn bootstrap(
        config: BridgeConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, EngineError> {
        // --- 1. Binding table ---
        let router = Arc::new(build_router(&config)?);
        tracing::info!(
            bindings = router.len(),
            patterns = router.patterns().len(),
            "binding table ready"
        );

        // --- 2. Subscribe ---
        let key_expr = config.subscribe_key();
        let subscription = transport.subscribe(&key_expr).await?;
        tracing::info!(key_expr = %key_expr, "subscribed");
        if let Ok(subscribed) = TopicPattern::parse(&key_expr) {
            for binding in unreachable_bindings(&router, &subscribed) {
                tracing::warn!(
                    pattern = %binding.pattern,
                    schema = binding.schema.name,
                    key_expr = %key_expr,
                    "binding lies outside the subscription and will never match"
                );
            }
        }

        // --- 3. Spawn publisher and dispatch ---
        let (outbound, outbound_task) = Outbound::spawn(transport, config.worker_buffer);
        let composer = Arc::new(EnvelopeComposer::new());
        let sinks = Arc::new(SinkContext::new(
            outbound,
            Arc::clone(&composer),
            config.envelope.publish_to.clone(),
        ));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let tasks = dispatch::spawn(
            subscription,
            Arc::clone(&router),
            sinks,
            config.workers,
            config.worker_buffer,
            shutdown_rx,
        );
        tracing::info!(workers = tasks.workers.len(), "dispatch started");

        Ok(Engine {
            router,
            composer,
            tasks,
            outbound: outbound_task,
            shutdown_tx,
            config,
        })
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn composer(&self) -> &Arc<EnvelopeComposer> {
        &self.composer
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Wait for the subscription to end (transport closed) and for every
    /// queued delivery to be processed.
    pub async fn wait(self) {
        // Keep the shutdown sender alive: dropping it reads as a signal.
        let Engine { tasks, outbound, shutdown_tx, .. } = self;
        join(tasks, outbound).await;
        drop(shutdown_tx);
        tracing::info!("engine stopped");
    }

    /// Graceful shutdown: stop reading, finish what is queued, join tasks.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        join(self.tasks, self.outbound).await;
        tracing::info!("engine shut down");
    }
}

/// Workers hold the only outbound senders, so the publisher drains and
/// stops once they are joined.
async fn join(tasks: DispatchTasks, outbound: JoinHandle<()>) {
    if let Err(e) = tasks.reader.await {
        tracing::error!(error = %e, "dispatch reader panicked");
    }
    for (id, handle) in tasks.workers.into_iter().enumerate() {
        if let Err(e) = handle.await {
            tracing::error!(worker = id, error = %e, "dispatch worker panicked");
        }
    }
    if let Err(e) = outbound.await {
        tracing::error!(error = %e, "outbound publisher panicked");
    }
}

/// Bindings whose pattern can match topics the subscription never delivers.
fn unreachable_bindings<'a>(router: &'a Router, subscribed: &TopicPattern) -> Vec<&'a Binding> {
    router
        .bindings()
        .iter()
        .filter(|b| !subscribed.covers(&b.pattern))
        .collect()
}

// ---------------------------------------------------------------------------
// Binding table from config
// ---------------------------------------------------------------------------

/// Resolve `[[bindings]]` (or the built-in catalogue) into a router.
pub fn build_router(config: &BridgeConfig) -> Result<Router, EngineError> {
    let defaults;
    let bindings: &[BindingConfig] = if config.bindings.is_empty() {
        defaults = catalog::default_bindings();
        &defaults
    } else {
        &config.bindings
    };

    let mut router = Router::new();
    for (index, binding) in bindings.iter().enumerate() {
        let ctx = format!("binding #{index} ({})", binding.pattern);
        let schema = catalog::by_name(&binding.schema)
            .ok_or_else(|| EngineError::UnknownSchema(binding.schema.clone()).with_context(&ctx))?;
        let pattern = join_prefix(&config.prefix, &binding.pattern);
        router.register(&pattern, schema, binding.sink.clone())?;
    }
    Ok(router)
}

/// Create the transport named by `[transport] kind`.
pub fn create_transport(
    config: &TransportConfig,
    buffer: usize,
) -> Result<Arc<dyn Transport>, EngineError> {
    match config.kind.as_str() {
        "memory" => {
            tracing::info!(mode = %config.mode, "using in-process transport");
            Ok(Arc::new(MemoryTransport::new(buffer)))
        }
        other => Err(EngineError::Config(format!(
            "transport kind '{other}' is not available (endpoint {})",
            config.endpoint
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkKind;

    #[test]
    fn test_build_router_default_catalogue() {
        let router = build_router(&BridgeConfig::default()).unwrap();
        let schemas: Vec<_> = router
            .route("val/amoc/123/location")
            .iter()
            .map(|b| (b.schema.name, b.sink.to_string()))
            .collect();
        assert_eq!(
            schemas,
            vec![
                ("location", "log".to_string()),
                ("location", "compose".to_string()),
                ("alerts", "log".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_router_unknown_schema() {
        let config = BridgeConfig {
            bindings: vec![BindingConfig {
                pattern: "x".into(),
                schema: "nope".into(),
                sink: SinkKind::Log,
            }],
            ..Default::default()
        };
        let err = build_router(&config).unwrap_err();
        assert!(matches!(err, EngineError::UnknownSchema(_)));
        assert!(err.to_string().contains("binding #0"));
    }

    #[test]
    fn test_build_router_duplicate() {
        let binding = BindingConfig {
            pattern: "**/value".into(),
            schema: "measurement_value".into(),
            sink: SinkKind::Log,
        };
        let config = BridgeConfig {
            bindings: vec![binding.clone(), binding],
            ..Default::default()
        };
        assert!(matches!(
            build_router(&config),
            Err(EngineError::Router(crate::router::RouterError::DuplicateBinding { .. }))
        ));
    }

    #[test]
    fn test_unreachable_bindings_under_narrow_subscription() {
        let router = build_router(&BridgeConfig::default()).unwrap();
        let everything = TopicPattern::parse("val/amoc/**").unwrap();
        assert!(unreachable_bindings(&router, &everything).is_empty());

        let one_vessel = TopicPattern::parse("val/amoc/257/**").unwrap();
        let unreachable: Vec<_> = unreachable_bindings(&router, &one_vessel)
            .iter()
            .map(|b| b.pattern.as_str())
            .collect();
        assert!(unreachable.contains(&"val/amoc/vessels"));
        assert!(unreachable.contains(&"val/amoc/**/location"));
        assert_eq!(unreachable.len(), router.len());
    }

    #[test]
    fn test_create_transport_unknown_kind() {
        let config = TransportConfig {
            kind: "zenoh".into(),
            ..Default::default()
        };
        assert!(matches!(create_transport(&config, 8), Err(EngineError::Config(_))));
    }
}
