//! Logger initialization.
//!
//! Everything in scenebind logs through the `log` facade; this only installs
//! an `env_logger` backend for binaries and tests that want output.
//!
//! Filter precedence: the config's own filter, then `RUST_LOG`, then
//! [`DEFAULT_FILTER`]. Directives added with
//! [`with_directive`](LoggingConfig::with_directive) apply on top of
//! whichever base filter wins.

use std::sync::Once;

/// Quiet for dependencies, module loads and teardowns visible.
pub const DEFAULT_FILTER: &str = "warn,scenebind_runtime=info,scenebind_registry=info";

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "scenebind_registry=debug,scenebind_runtime::lifetime=trace"). It is
/// also read from `SCENEBIND_LOG` by [`BridgeConfig::from_env`].
///
/// [`BridgeConfig::from_env`]: crate::BridgeConfig::from_env
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub directives: Vec<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            directives: Vec::new(),
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Raise or lower one target, e.g. `("scenebind_runtime::lifetime", Trace)`.
    pub fn with_directive(mut self, target: &str, level: log::LevelFilter) -> Self {
        self.directives
            .push(format!("{}={}", target, level.as_str().to_ascii_lowercase()));
        self
    }

    /// Trace ordering checks and teardown, the two places misconfiguration
    /// shows up first.
    pub fn diagnostics() -> Self {
        Self::default()
            .with_directive("scenebind_registry::ordering", log::LevelFilter::Trace)
            .with_directive("scenebind_runtime::lifetime", log::LevelFilter::Trace)
    }

    /// The filter string handed to `env_logger`.
    pub fn resolve_filter(&self, rust_log: Option<String>) -> String {
        let base = self
            .env_filter
            .clone()
            .or(rust_log)
            .filter(|filter| !filter.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        std::iter::once(base)
            .chain(self.directives.iter().cloned())
            .collect::<Vec<_>>()
            .join(",")
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Subsequent calls are ignored, as is a logger installed by someone else.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolve_filter(std::env::var("RUST_LOG").ok());
        let mut builder = env_logger::Builder::new();
        builder
            .parse_filters(&filter)
            .write_style(config.write_style)
            .format_target(true);

        if builder.try_init().is_ok() {
            log::debug!("logging initialized with '{}'", filter);
        }
    });
}
