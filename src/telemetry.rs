use attendance_core::config::TelemetryConfig;
use std::error::Error;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

const VERBOSE_DIRECTIVE: &str = "debug";

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter {
        directive: String,
        source: ParseError,
    },
    Install(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter { directive, source } => {
                write!(f, "APP_LOG_LEVEL '{directive}' is not a valid filter: {source}")
            }
            TelemetryError::Install(err) => {
                write!(f, "failed to install log subscriber: {err}")
            }
        }
    }
}

impl Error for TelemetryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source, .. } => Some(source),
            TelemetryError::Install(err) => Some(&**err),
        }
    }
}

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays pipeable; `RUST_LOG` takes precedence over the configured
/// level and `verbose` forces `debug`.
pub fn init(config: &TelemetryConfig, verbose: bool) -> Result<(), TelemetryError> {
    let env_filter = if verbose {
        build_filter(VERBOSE_DIRECTIVE)?
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => build_filter(&config.log_level)?,
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Install)
}

fn build_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directive).map_err(|source| TelemetryError::InvalidFilter {
        directive: directive.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_target_directives_are_accepted() {
        assert!(build_filter("info,attendance_core::store=debug").is_ok());
    }

    #[test]
    fn invalid_directive_is_reported_with_value() {
        match build_filter("attendance=verbose") {
            Err(TelemetryError::InvalidFilter { directive, .. }) => {
                assert_eq!(directive, "attendance=verbose")
            }
            Err(other) => panic!("expected invalid filter, got {other}"),
            Ok(_) => panic!("directive should not parse"),
        }
    }
}
