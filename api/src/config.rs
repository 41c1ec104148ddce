//! Process bootstrap: configuration loading and tracing setup

use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blog_shared::{AppConfig, LogFormat, LoggingConfig};

/// Directory holding `<environment>.yaml`, overridable with `CONFIG_DIR`
const DEFAULT_CONFIG_DIR: &str = "config";

/// Loads and validates the application configuration
pub fn load() -> anyhow::Result<AppConfig> {
    let dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    AppConfig::load(&dir).with_context(|| format!("failed to load configuration from '{}'", dir))
}

/// Installs the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("invalid log level")?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match logging.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    };

    result.context("tracing subscriber already installed")
}
