use serde::Deserialize;

use crate::broker::retention::RetentionBuffer;

/// Top-level configuration for the relay.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub broker: BrokerSettings,
}

/// Where the broker listens.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Operational parameters of the broker core.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    /// How long published messages stay eligible for replay, in seconds.
    pub retention_secs: i64,
}

/// Partial configuration as loaded from files or the environment; missing
/// values fall back to `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub retention_secs: Option<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 12345,
            },
            broker: BrokerSettings {
                retention_secs: RetentionBuffer::DEFAULT_WINDOW_SECS,
            },
        }
    }
}
