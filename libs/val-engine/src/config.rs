use serde::Deserialize;

use crate::error::EngineError;
use crate::sink::SinkKind;

/// Root configuration, parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Root of the topic space; binding patterns are relative to it.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Number of dispatch workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Per-worker delivery queue capacity.
    #[serde(default = "default_worker_buffer")]
    pub worker_buffer: usize,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub envelope: EnvelopeConfig,

    /// Binding table. Empty = built-in catalogue.
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

fn default_prefix() -> String {
    "val/amoc".to_string()
}

fn default_workers() -> usize {
    4
}

fn default_worker_buffer() -> usize {
    1024
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Transport implementation. Only `memory` is built in.
    #[serde(default = "default_transport_kind")]
    pub kind: String,

    /// Router endpoint, e.g. `tcp/127.0.0.1:7447`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Session mode: `client` or `peer`.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Key expression to subscribe to. Defaults to `<prefix>/**`.
    #[serde(default)]
    pub subscribe: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: default_transport_kind(),
            endpoint: default_endpoint(),
            mode: default_mode(),
            subscribe: None,
        }
    }
}

fn default_transport_kind() -> String {
    "memory".to_string()
}

fn default_endpoint() -> String {
    "tcp/127.0.0.1:7447".to_string()
}

fn default_mode() -> String {
    "client".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvelopeConfig {
    /// When set, every envelope update is published to `<publish_to>/<mmsi>`.
    #[serde(default)]
    pub publish_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BindingConfig {
    /// Topic pattern relative to `prefix`.
    pub pattern: String,
    /// Schema name from the catalogue.
    pub schema: String,
    #[serde(default = "default_sink")]
    pub sink: SinkKind,
}

fn default_sink() -> SinkKind {
    SinkKind::Log
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            workers: default_workers(),
            worker_buffer: default_worker_buffer(),
            transport: TransportConfig::default(),
            envelope: EnvelopeConfig::default(),
            bindings: Vec::new(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.workers == 0 {
            return Err(EngineError::Config("workers must be at least 1".into()));
        }
        if self.worker_buffer == 0 {
            return Err(EngineError::Config("worker_buffer must be at least 1".into()));
        }
        if !matches!(self.transport.mode.as_str(), "client" | "peer") {
            return Err(EngineError::Config(format!(
                "transport.mode must be 'client' or 'peer', got '{}'",
                self.transport.mode
            )));
        }
        Ok(())
    }

    /// Key expression the dispatch loop subscribes to.
    pub fn subscribe_key(&self) -> String {
        match &self.transport.subscribe {
            Some(key) => key.clone(),
            None => crate::router::join_prefix(&self.prefix, "**"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = BridgeConfig::parse("").unwrap();
        assert_eq!(config.prefix, "val/amoc");
        assert_eq!(config.workers, 4);
        assert_eq!(config.worker_buffer, 1024);
        assert_eq!(config.transport.kind, "memory");
        assert_eq!(config.transport.mode, "client");
        assert!(config.bindings.is_empty());
        assert_eq!(config.subscribe_key(), "val/amoc/**");
    }

    #[test]
    fn test_parse_full() {
        let toml = r#"
prefix = "val/test"
workers = 2

[transport]
endpoint = "tcp/10.0.0.1:7447"
mode = "peer"
subscribe = "val/**"

[envelope]
publish_to = "val/envelopes"

[[bindings]]
pattern = "**/location"
schema = "location"

[[bindings]]
pattern = "**/location"
schema = "location"
sink = { kind = "publish", topic = "out/location" }
"#;
        let config = BridgeConfig::parse(toml).unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.transport.endpoint, "tcp/10.0.0.1:7447");
        assert_eq!(config.subscribe_key(), "val/**");
        assert_eq!(config.envelope.publish_to.as_deref(), Some("val/envelopes"));
        assert_eq!(config.bindings.len(), 2);
        assert_eq!(config.bindings[0].sink, SinkKind::Log);
        assert_eq!(
            config.bindings[1].sink,
            SinkKind::Publish { topic: "out/location".into() }
        );
    }

    #[test]
    fn test_parse_rejects_zero_workers() {
        assert!(matches!(BridgeConfig::parse("workers = 0"), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_parse_rejects_bad_mode() {
        let err = BridgeConfig::parse("[transport]\nmode = \"router\"").unwrap_err();
        assert!(err.to_string().contains("transport.mode"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = BridgeConfig::load("/nonexistent/val-bridge.toml").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
