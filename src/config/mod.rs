mod settings;

use config::{Config, ConfigError, Environment, File};

use crate::config::settings::PartialSettings;

pub use settings::{BrokerSettings, ServerSettings, Settings};


/// Load configuration from `config/default` and environment variables,
/// merging whatever is present over the built-in defaults.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Deserialize what is available, then fill the gaps from defaults.
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        broker: BrokerSettings {
            retention_secs: partial
                .broker
                .as_ref()
                .and_then(|b| b.retention_secs)
                .unwrap_or(default.broker.retention_secs),
        },
    })
}
