//! Tracing subscriber configuration.
//!
//! Provides [`TracingConfig`], a builder that installs a `tracing_subscriber`
//! registry with an [`EnvFilter`] and a formatting layer writing to stderr.
//! Hook failures and node diagnostics are reported through this subscriber.
//!
//! # Example
//!
//! ```
//! use hive_core::{TracingConfig, TracingFormat};
//! use tracing::Level;
//!
//! TracingConfig::default()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .init();
//!
//! tracing::debug!("subscriber installed");
//! ```

use core::fmt;
use core::str::FromStr;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable multi-line output.
    Pretty,
    /// Compact single-line output (default).
    #[default]
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

impl fmt::Display for TracingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TracingFormat::Pretty => "pretty",
            TracingFormat::Compact => "compact",
            TracingFormat::Json => "json",
        })
    }
}

impl FromStr for TracingFormat {
    type Err = TracingInitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(TracingFormat::Pretty),
            "compact" => Ok(TracingFormat::Compact),
            "json" => Ok(TracingFormat::Json),
            other => Err(TracingInitError::UnknownFormat(other.to_owned())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingInitError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while configuring or installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TracingInitError {
    /// The filter directive string could not be parsed.
    #[error("invalid filter directive '{directive}': {source}")]
    InvalidFilter {
        /// The rejected directive string.
        directive: String,
        /// Parser error.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// The format name is not one of `pretty`, `compact`, `json`.
    #[error("unknown tracing format '{0}' (expected pretty, compact, or json)")]
    UnknownFormat(String),

    /// A global subscriber is already installed.
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing configuration builder.
///
/// # Configuration Options
///
/// ```
/// use hive_core::{TracingConfig, TracingFormat};
/// use tracing::Level;
///
/// // Development: pretty output with span enter/exit events
/// let dev = TracingConfig::new()
///     .with_level(Level::DEBUG)
///     .with_format(TracingFormat::Pretty)
///     .with_span_events(true);
///
/// // Production: JSON output, per-target levels, RUST_LOG wins when set
/// let prod = TracingConfig::new()
///     .with_format(TracingFormat::Json)
///     .with_env_filter("hive_graph=info,hook_harness=warn")
///     .with_env_override(true);
/// ```
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Maximum log level.
    level: Level,
    /// Output format.
    format: TracingFormat,
    /// Explicit filter directives (e.g., `"hive_graph=debug"`).
    env_filter: Option<String>,
    /// Whether `RUST_LOG` overrides the configured filter.
    env_override: bool,
    /// Whether to include span events (enter/exit).
    span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::default(),
            env_filter: None,
            env_override: false,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets explicit filter directives.
    ///
    /// Format: `target=level,target=level,...`
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Lets a `RUST_LOG` environment variable replace the configured filter.
    #[must_use]
    pub fn with_env_override(mut self, enabled: bool) -> Self {
        self.env_override = enabled;
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the configured level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the configured format.
    #[must_use]
    pub fn format(&self) -> TracingFormat {
        self.format
    }

    /// Builds the filter the subscriber will use.
    ///
    /// # Errors
    ///
    /// Returns [`TracingInitError::InvalidFilter`] if the explicit directive
    /// string does not parse.
    pub fn build_filter(&self) -> Result<EnvFilter, TracingInitError> {
        if self.env_override
            && let Ok(filter) = EnvFilter::try_from_default_env()
        {
            return Ok(filter);
        }

        match &self.env_filter {
            Some(directive) => {
                EnvFilter::try_new(directive).map_err(|source| TracingInitError::InvalidFilter {
                    directive: directive.clone(),
                    source,
                })
            }
            None => Ok(EnvFilter::new(self.level.as_str())),
        }
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter is invalid or a subscriber is already
    /// installed.
    pub fn try_init(&self) -> Result<(), TracingInitError> {
        let env_filter = self.build_filter()?;

        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let registry = tracing_subscriber::registry().with(env_filter);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(span_events);

        let installed = match self.format {
            TracingFormat::Pretty => registry.with(layer.pretty()).try_init(),
            TracingFormat::Compact => registry.with(layer.compact()).try_init(),
            TracingFormat::Json => registry.with(layer.json()).try_init(),
        };
        installed.map_err(|_| TracingInitError::AlreadyInitialized)?;

        tracing::debug!(
            level = %self.level,
            format = %self.format,
            "tracing initialized"
        );
        Ok(())
    }

    /// Installs the global subscriber, tolerating an existing one.
    ///
    /// An invalid filter falls back to the configured level.
    pub fn init(&self) {
        match self.try_init() {
            Ok(()) | Err(TracingInitError::AlreadyInitialized) => {}
            Err(err) => {
                Self {
                    env_filter: None,
                    env_override: false,
                    ..self.clone()
                }
                .try_init()
                .ok();
                tracing::warn!(error = %err, "falling back to level-only tracing filter");
            }
        }
    }
}
