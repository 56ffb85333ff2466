//! Command-line configuration for the harness.

use core::str::FromStr;

use hive_core::{TracingConfig, TracingFormat, TracingInitError};
use tracing::Level;

use crate::runner::Scenario;

/// Usage line printed on argument errors.
pub const USAGE: &str =
    "Usage: hook-harness [--debug] [--log-format pretty|compact|json] [--log-level LEVEL] [SCENARIO...]";

/// Errors in the harness arguments.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A flag the harness does not recognize.
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    /// A flag that takes a value was given none.
    #[error("missing value for {0}")]
    MissingValue(&'static str),

    /// `--log-level` was not a valid level.
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),

    /// `--log-format` was not a valid format.
    #[error(transparent)]
    InvalidFormat(#[from] TracingInitError),

    /// A positional argument named no known scenario.
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
}

/// Parsed harness configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Print the full error detail for failing scenarios.
    pub debug: bool,
    /// Log output format.
    pub log_format: TracingFormat,
    /// Maximum log level.
    pub log_level: Level,
    /// Scenario names to run; empty runs all.
    pub filters: Vec<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_format: TracingFormat::Compact,
            log_level: Level::WARN,
            filters: Vec::new(),
        }
    }
}

impl HarnessConfig {
    /// Parses arguments, excluding the program name.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown flags, missing flag values, or invalid
    /// levels and formats.
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--debug" => config.debug = true,
                "--log-format" => {
                    let value = args.next().ok_or(ConfigError::MissingValue("--log-format"))?;
                    config.log_format = value.parse()?;
                }
                "--log-level" => {
                    let value = args.next().ok_or(ConfigError::MissingValue("--log-level"))?;
                    config.log_level =
                        Level::from_str(&value).map_err(|_| ConfigError::InvalidLevel(value))?;
                }
                flag if flag.starts_with("--") => {
                    return Err(ConfigError::UnknownFlag(flag.to_owned()));
                }
                _ => config.filters.push(arg),
            }
        }

        Ok(config)
    }

    /// Tracing configuration for this run. `RUST_LOG` takes precedence.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig::new()
            .with_level(self.log_level)
            .with_format(self.log_format)
            .with_env_override(true)
    }

    /// Keeps the scenarios named by the filters, in suite order.
    ///
    /// Names match case-insensitively. Without filters every scenario is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownScenario`] for a filter that matches
    /// nothing.
    pub fn select(&self, scenarios: Vec<Scenario>) -> Result<Vec<Scenario>, ConfigError> {
        if self.filters.is_empty() {
            return Ok(scenarios);
        }

        if let Some(unknown) = self.filters.iter().find(|filter| {
            !scenarios
                .iter()
                .any(|scenario| scenario.name().eq_ignore_ascii_case(filter))
        }) {
            return Err(ConfigError::UnknownScenario(unknown.clone()));
        }

        Ok(scenarios
            .into_iter()
            .filter(|scenario| {
                self.filters
                    .iter()
                    .any(|filter| scenario.name().eq_ignore_ascii_case(filter))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_scenario(name: &'static str) -> Scenario {
        Scenario::new(name, || async { Ok(()) })
    }

    #[test]
    fn defaults_without_arguments() {
        let config = HarnessConfig::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert!(!config.debug);
        assert_eq!(config.log_level, Level::WARN);
    }

    #[test]
    fn parses_flags_and_filters() {
        let config = HarnessConfig::from_args([
            "--debug",
            "--log-format",
            "json",
            "--log-level",
            "debug",
            "Basic Hooks",
        ])
        .unwrap();

        assert!(config.debug);
        assert_eq!(config.log_format, TracingFormat::Json);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.filters, vec!["Basic Hooks".to_string()]);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(
            HarnessConfig::from_args(["--verbose"]),
            Err(ConfigError::UnknownFlag(flag)) if flag == "--verbose"
        ));
        assert!(matches!(
            HarnessConfig::from_args(["--log-level"]),
            Err(ConfigError::MissingValue("--log-level"))
        ));
        assert!(matches!(
            HarnessConfig::from_args(["--log-level", "chatty"]),
            Err(ConfigError::InvalidLevel(level)) if level == "chatty"
        ));
        assert!(matches!(
            HarnessConfig::from_args(["--log-format", "xml"]),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn select_keeps_order_and_ignores_case() {
        let config = HarnessConfig::from_args(["clear idempotent", "BASIC HOOKS"]).unwrap();
        let selected = config
            .select(vec![
                noop_scenario("Basic Hooks"),
                noop_scenario("Skip Short-Circuit"),
                noop_scenario("Clear Idempotent"),
            ])
            .unwrap();

        let names: Vec<_> = selected.iter().map(Scenario::name).collect();
        assert_eq!(names, vec!["Basic Hooks", "Clear Idempotent"]);
    }

    #[test]
    fn select_rejects_unknown_names() {
        let config = HarnessConfig::from_args(["Nope"]).unwrap();
        let err = config.select(vec![noop_scenario("Basic Hooks")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownScenario(name) if name == "Nope"));
    }
}
