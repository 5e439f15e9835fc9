//! Tracing setup for the browser binary.
//!
//! Console output goes to stderr so rendered pages on stdout stay clean.
//! File output rolls daily under the configured log directory, as plain text
//! or JSON lines.

use crate::Config;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Crates whose events follow the configured level
const WORKSPACE_TARGETS: [&str; 3] = ["anime_browser", "catalog_api", "shared"];

/// HTTP stack crates kept at warn
const QUIET_TARGETS: [&str; 3] = ["hyper", "reqwest", "h2"];

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_dir: String,
    /// Binary name, used as the log file prefix
    pub component: String,
    pub default_level: Level,
    pub console: bool,
    pub file: bool,
    /// Write file logs as JSON lines
    pub json_format: bool,
}

impl LogConfig {
    /// Logging settings for `component`; `verbose` forces DEBUG
    pub fn from_config(config: &Config, component: &str, verbose: bool) -> Self {
        Self {
            log_dir: config.log_dir().to_string_lossy().to_string(),
            component: component.to_string(),
            default_level: if verbose { Level::DEBUG } else { config.log_level() },
            console: config.logging.console,
            file: config.logging.file,
            json_format: config.logging.json_format,
        }
    }

    /// Filter used when `RUST_LOG` is not set
    pub fn filter_directive(&self) -> String {
        let level = self.default_level;
        let component = self.component.replace('-', "_");

        let mut directives = vec![format!("{}={}", component, level)];
        directives.extend(
            WORKSPACE_TARGETS
                .iter()
                .filter(|target| **target != component)
                .map(|target| format!("{}={}", target, level)),
        );
        directives.extend(QUIET_TARGETS.iter().map(|target| format!("{}=warn", target)));

        directives.join(",")
    }
}

fn console_layer<S>() -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .boxed()
}

fn file_layer<S>(log_dir: &Path, component: &str, json: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let appender = tracing_appender::rolling::daily(log_dir, component);

    if json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(appender)
            .boxed()
    } else {
        fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(appender)
            .boxed()
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides [`LogConfig::filter_directive`].
pub fn init(config: LogConfig) -> Result<()> {
    let log_dir = Path::new(&config.log_dir);
    if config.file {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    let mut layers = Vec::new();
    if config.console {
        layers.push(console_layer());
    }
    if config.file {
        layers.push(file_layer(log_dir, &config.component, config.json_format));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        component = %config.component,
        log_dir = %config.log_dir,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut app_config = Config::default();
        app_config.logging.json_format = true;
        app_config.logging.default_level = "warn".to_string();

        let config = LogConfig::from_config(&app_config, "anime-browser", false);
        assert_eq!(config.component, "anime-browser");
        assert_eq!(config.default_level, Level::WARN);
        assert!(config.json_format);
        assert!(config.log_dir.ends_with("logs"));

        let verbose = LogConfig::from_config(&app_config, "anime-browser", true);
        assert_eq!(verbose.default_level, Level::DEBUG);
    }

    #[test]
    fn test_filter_directive() {
        let config = LogConfig::from_config(&Config::default(), "anime-browser", true);

        assert_eq!(
            config.filter_directive(),
            "anime_browser=DEBUG,catalog_api=DEBUG,shared=DEBUG,hyper=warn,reqwest=warn,h2=warn"
        );
    }
}
