//! Logging bootstrap
//!
//! Host code logs through the `log` facade; the host installs env_logger
//! once, piping its output into a [`LogSink`]. Connectors own a
//! [`ConnectorLogger`] writing into their own sink, so two connectors with
//! different sinks never share output.

use std::fmt;

use env_logger::{Builder, Logger, Target};
use log::{Level, Log, Record, SetLoggerError};
use xbridge_ports::LogSink;

/// Connector log filter unless one is configured
pub const DEFAULT_FILTER: &str = "info";

/// Install env_logger writing into `sink`
///
/// `RUST_LOG` wins over `default_filter` when set. Fails if a global logger
/// is already installed.
pub fn init_logging(sink: &LogSink, default_filter: &str) -> Result<(), SetLoggerError> {
    builder(sink, &resolve_filter(default_filter)).try_init()
}

/// `RUST_LOG` if set, otherwise `default_filter`
pub fn resolve_filter(default_filter: &str) -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string())
}

fn builder(sink: &LogSink, filter: &str) -> Builder {
    let mut builder = Builder::new();
    builder
        .parse_filters(filter)
        .target(Target::Pipe(Box::new(sink.clone())))
        .format_timestamp_millis();
    builder
}

/// env_logger instance private to one connector
///
/// Records carry `target` and go straight into the connector's sink,
/// bypassing the global logger. `filter` is used as given; a discarding
/// sink disables the logger.
pub struct ConnectorLogger {
    target: String,
    logger: Option<Logger>,
}

impl ConnectorLogger {
    pub fn new(target: impl Into<String>, sink: &LogSink, filter: &str) -> Self {
        let logger = (!sink.is_discard()).then(|| builder(sink, filter).build());
        Self {
            target: target.into(),
            logger,
        }
    }

    pub fn discard(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            logger: None,
        }
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let Some(logger) = &self.logger else {
            return;
        };
        let record = Record::builder()
            .args(args)
            .level(level)
            .target(&self.target)
            .build();
        if logger.enabled(record.metadata()) {
            logger.log(&record);
            logger.flush();
        }
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }
}

impl fmt::Debug for ConnectorLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorLogger")
            .field("target", &self.target)
            .field("enabled", &self.logger.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_reach_the_sink() {
        let (sink, capture) = LogSink::capture();
        let logger = builder(&sink, "debug").build();

        logger.log(
            &log::Record::builder()
                .args(format_args!("book refreshed"))
                .level(log::Level::Info)
                .target("xbridge_gateway")
                .build(),
        );
        logger.flush();

        assert!(capture.contents().contains("book refreshed"));
    }

    #[test]
    fn test_connector_loggers_keep_separate_sinks() {
        let (first_sink, first) = LogSink::capture();
        let (second_sink, second) = LogSink::capture();
        let a = ConnectorLogger::new("venue_a", &first_sink, "debug");
        let b = ConnectorLogger::new("venue_b", &second_sink, "debug");

        a.info(format_args!("order 1 placed"));
        b.warn(format_args!("order 2 rejected"));

        assert!(first.contents().contains("order 1 placed"));
        assert!(!first.contents().contains("order 2"));
        assert!(second.contents().contains("order 2 rejected"));
        assert!(second.contents().contains("venue_b"));
    }

    #[test]
    fn test_discarding_logger_is_silent() {
        let logger = ConnectorLogger::discard("venue");
        logger.info(format_args!("dropped"));
        assert!(format!("{logger:?}").contains("enabled: false"));
    }
}
