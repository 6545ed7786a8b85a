//! crates/logging/src/registry.rs
//! The logging context: three channels sharing one verbosity filter.
//!
//! A [`Logging`] value owns the channels built from a validated
//! [`LoggingConfig`]. It is the only place a [`VerbosityFilter`] is created;
//! every channel receives a clone of the same [`Arc`], so
//! [`Logging::set_verbosity`] takes effect on all channels at once.

use std::collections::BTreeMap;
use std::sync::Arc;

use logging_sink::{Destination, StreamTarget};

use crate::channel::{Channel, ChannelKind, Handler};
use crate::config::{ConfigurationError, LoggingConfig};
use crate::format::{FormatPolicy, Formatter, FormattingError};
use crate::record::LogRecord;
use crate::verbosity::{FilterStateError, Verbosity, VerbosityFilter};

/// Three configured channels and their shared verbosity filter.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use logging::{ChannelKind, LogRecord, Logging, LoggingConfig, Severity};
/// use logging_sink::{CaptureBuffer, SharedSink, StreamTarget};
///
/// let stdout = CaptureBuffer::new();
/// let logging = Logging::builder(LoggingConfig::default())
///     .destination(StreamTarget::Stdout, Arc::new(SharedSink::new(stdout.clone())))
///     .destination(StreamTarget::Stderr, Arc::new(SharedSink::new(Vec::new())))
///     .build()
///     .unwrap();
///
/// let chatty = LogRecord::new(ChannelKind::General, Severity::Info, "SEND HEADERS")
///     .with_verbosity(2);
/// assert!(!logging.log(&chatty).unwrap());
///
/// logging.set_verbosity(2).unwrap();
/// assert!(logging.log(&chatty).unwrap());
/// assert!(stdout.contents().ends_with("[INFO] SEND HEADERS\n"));
/// ```
#[derive(Debug)]
pub struct Logging {
    filter: Arc<VerbosityFilter>,
    channels: Channels,
    config: LoggingConfig,
    destinations: Destinations,
    policy: FormatPolicy,
}

#[derive(Debug)]
struct Channels {
    general: Channel,
    error: Channel,
    access: Channel,
}

impl Logging {
    /// Starts building a context from `config`.
    #[must_use]
    pub fn builder(config: LoggingConfig) -> LoggingBuilder {
        LoggingBuilder::new(config)
    }

    /// Builds a context from the default configuration writing to the
    /// process streams.
    pub fn from_defaults() -> Result<Self, ConfigurationError> {
        Self::builder(LoggingConfig::default()).build()
    }

    /// Returns the filter shared by every channel.
    #[must_use]
    pub fn filter(&self) -> &Arc<VerbosityFilter> {
        &self.filter
    }

    /// Updates the shared verbosity threshold.
    pub fn set_verbosity(&self, threshold: i32) -> Result<(), FilterStateError> {
        self.filter.set_threshold(threshold)
    }

    /// Returns the shared verbosity threshold.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        self.filter.threshold()
    }

    /// Returns the channel of the given kind.
    #[must_use]
    pub const fn channel(&self, kind: ChannelKind) -> &Channel {
        match kind {
            ChannelKind::General => &self.channels.general,
            ChannelKind::Error => &self.channels.error,
            ChannelKind::Access => &self.channels.access,
        }
    }

    /// Returns the general channel.
    #[must_use]
    pub const fn general(&self) -> &Channel {
        &self.channels.general
    }

    /// Returns the error channel.
    #[must_use]
    pub const fn error(&self) -> &Channel {
        &self.channels.error
    }

    /// Returns the access channel.
    #[must_use]
    pub const fn access(&self) -> &Channel {
        &self.channels.access
    }

    /// Routes `record` to the channel it names.
    pub fn log(&self, record: &LogRecord) -> Result<bool, FormattingError> {
        self.channel(record.channel()).log(record)
    }

    /// Returns the configuration the channels were built from.
    #[must_use]
    pub const fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Replaces every channel with ones built from `config`.
    ///
    /// The verbosity filter, destinations and format policy are kept. On
    /// error the current channels stay in place.
    pub fn reconfigure(&mut self, config: LoggingConfig) -> Result<(), ConfigurationError> {
        config.validate()?;
        let channels = build_channels(&config, &self.filter, &mut self.destinations, self.policy)?;
        self.flush();
        self.channels = channels;
        self.config = config;
        tracing::debug!(target: "sanic::internal", "logging channels reconfigured");
        Ok(())
    }

    /// Flushes every handler of every channel.
    pub fn flush(&self) {
        for kind in ChannelKind::ALL {
            self.channel(kind).flush();
        }
    }
}

/// Builder for [`Logging`].
#[derive(Debug)]
pub struct LoggingBuilder {
    config: LoggingConfig,
    filter: Option<Arc<VerbosityFilter>>,
    destinations: Destinations,
    policy: FormatPolicy,
}

impl LoggingBuilder {
    fn new(config: LoggingConfig) -> Self {
        Self {
            config,
            filter: None,
            destinations: Destinations::default(),
            policy: FormatPolicy::default(),
        }
    }

    /// Uses an existing filter instead of creating a fresh one.
    #[must_use]
    pub fn filter(mut self, filter: Arc<VerbosityFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sends every handler bound to `target` to `destination`.
    #[must_use]
    pub fn destination(mut self, target: StreamTarget, destination: Arc<dyn Destination>) -> Self {
        self.destinations.set(target, destination);
        self
    }

    /// Selects how rendering failures are handled.
    #[must_use]
    pub const fn format_policy(mut self, policy: FormatPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validates the configuration and builds the channels.
    pub fn build(self) -> Result<Logging, ConfigurationError> {
        let Self {
            config,
            filter,
            mut destinations,
            policy,
        } = self;
        config.validate()?;

        let filter = filter.unwrap_or_default();
        let channels = build_channels(&config, &filter, &mut destinations, policy)?;
        Ok(Logging {
            filter,
            channels,
            config,
            destinations,
            policy,
        })
    }
}

/// One destination per process stream, opened on first use.
#[derive(Default)]
struct Destinations {
    streams: BTreeMap<StreamTarget, Arc<dyn Destination>>,
}

impl Destinations {
    fn set(&mut self, target: StreamTarget, destination: Arc<dyn Destination>) {
        self.streams.insert(target, destination);
    }

    fn get(&mut self, target: StreamTarget) -> Arc<dyn Destination> {
        Arc::clone(self.streams.entry(target).or_insert_with(|| target.open()))
    }
}

impl std::fmt::Debug for Destinations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.streams.keys()).finish()
    }
}

fn build_channels(
    config: &LoggingConfig,
    filter: &Arc<VerbosityFilter>,
    destinations: &mut Destinations,
    policy: FormatPolicy,
) -> Result<Channels, ConfigurationError> {
    let mut formatters: BTreeMap<&str, Arc<Formatter>> = BTreeMap::new();
    let mut build = |kind: ChannelKind| -> Result<Channel, ConfigurationError> {
        let logger = config
            .logger(kind)
            .ok_or(ConfigurationError::MissingChannel {
                channel: kind,
                logger: kind.logger_name(),
            })?;

        let mut handlers = Vec::with_capacity(logger.handlers.len());
        for name in &logger.handlers {
            let entry = config.handlers.get(name).ok_or_else(|| {
                ConfigurationError::UnknownHandler {
                    logger: kind.logger_name().to_owned(),
                    handler: name.clone(),
                }
            })?;
            let formatter = match formatters.get(entry.formatter.as_str()) {
                Some(formatter) => Arc::clone(formatter),
                None => {
                    let formatter = Arc::new(config.compile_formatter(name)?);
                    formatters.insert(entry.formatter.as_str(), Arc::clone(&formatter));
                    formatter
                }
            };
            handlers.push(Handler::new(name.clone(), formatter, destinations.get(entry.stream)));
        }

        let name = logger
            .qualname
            .clone()
            .unwrap_or_else(|| kind.logger_name().to_owned());
        Ok(Channel::new(
            kind,
            name,
            logger.level,
            logger.propagate.unwrap_or(true),
            handlers,
            Arc::clone(filter),
            policy,
        ))
    };

    Ok(Channels {
        general: build(ChannelKind::General)?,
        error: build(ChannelKind::Error)?,
        access: build(ChannelKind::Access)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;
    use logging_sink::{CaptureBuffer, SharedSink};

    struct Streams {
        stdout: CaptureBuffer,
        stderr: CaptureBuffer,
    }

    fn capture(config: LoggingConfig) -> (Logging, Streams) {
        let streams = Streams {
            stdout: CaptureBuffer::new(),
            stderr: CaptureBuffer::new(),
        };
        let logging = Logging::builder(config)
            .destination(StreamTarget::Stdout, Arc::new(SharedSink::new(streams.stdout.clone())))
            .destination(StreamTarget::Stderr, Arc::new(SharedSink::new(streams.stderr.clone())))
            .build()
            .unwrap();
        (logging, streams)
    }

    #[test]
    fn channels_share_one_filter() {
        let (logging, _) = capture(LoggingConfig::default());
        for kind in ChannelKind::ALL {
            assert!(Arc::ptr_eq(logging.filter(), logging.channel(kind).filter()));
        }
        logging.set_verbosity(3).unwrap();
        assert_eq!(logging.access().filter().threshold(), Verbosity::new(3));
    }

    #[test]
    fn default_channels_route_to_expected_streams() {
        let (logging, streams) = capture(LoggingConfig::default());
        logging.general().emit(Severity::Info, "general line").unwrap();
        logging.error().emit(Severity::Error, "error line").unwrap();
        logging
            .log(&LogRecord::access("", "127.0.0.1", "GET /", 200, 5))
            .unwrap();

        let stdout = streams.stdout.lines();
        assert_eq!(stdout.len(), 2);
        assert!(stdout[0].ends_with("[INFO] general line"));
        assert!(stdout[1].contains("(sanic.access)[INFO][127.0.0.1]: GET /  200 5"));
        assert_eq!(streams.stderr.lines().len(), 1);
        assert!(streams.stderr.contents().contains("[ERROR] error line"));
    }

    #[test]
    fn default_levels_hide_debug() {
        let (logging, streams) = capture(LoggingConfig::default());
        assert!(!logging.general().emit(Severity::Debug, "hidden").unwrap());
        assert!(streams.stdout.contents().is_empty());

        let (logging, streams) = capture(LoggingConfig::default().with_debug());
        assert!(logging.general().emit(Severity::Debug, "shown").unwrap());
        assert!(streams.stdout.contents().contains("[DEBUG] shown"));
    }

    #[test]
    fn builder_accepts_external_filter() {
        let filter = Arc::new(VerbosityFilter::with_threshold(4).unwrap());
        let logging = Logging::builder(LoggingConfig::default())
            .filter(Arc::clone(&filter))
            .destination(StreamTarget::Stdout, Arc::new(SharedSink::new(Vec::new())))
            .destination(StreamTarget::Stderr, Arc::new(SharedSink::new(Vec::new())))
            .build()
            .unwrap();
        assert!(Arc::ptr_eq(logging.filter(), &filter));
        assert_eq!(logging.verbosity(), Verbosity::new(4));
    }

    #[test]
    fn build_rejects_invalid_configuration() {
        let mut config = LoggingConfig::default();
        config.loggers.remove("sanic.error");
        assert!(matches!(
            Logging::builder(config).build(),
            Err(ConfigurationError::MissingChannel { .. })
        ));
    }

    #[test]
    fn reconfigure_keeps_filter_and_swaps_channels() {
        let (mut logging, streams) = capture(LoggingConfig::default());
        let filter = Arc::clone(logging.filter());
        logging.set_verbosity(2).unwrap();

        let config = LoggingConfig::default().with_level(ChannelKind::General, Severity::Error);
        logging.reconfigure(config.clone()).unwrap();

        assert!(Arc::ptr_eq(logging.filter(), &filter));
        assert_eq!(logging.verbosity(), Verbosity::new(2));
        assert_eq!(logging.config(), &config);
        assert!(!logging.general().emit(Severity::Info, "quiet now").unwrap());
        assert!(streams.stdout.contents().is_empty());
    }

    #[test]
    fn failed_reconfigure_keeps_previous_channels() {
        let (mut logging, _) = capture(LoggingConfig::default());
        let mut config = LoggingConfig::default();
        config.version = 7;
        assert!(logging.reconfigure(config).is_err());
        assert_eq!(logging.config(), &LoggingConfig::default());
    }

    #[test]
    fn qualname_and_propagate_flow_into_channels() {
        let mut config = LoggingConfig::default();
        config.loggers.get_mut("sanic.error").unwrap().qualname = Some("app.errors".to_owned());
        let (logging, _) = capture(config);
        assert_eq!(logging.error().name(), "app.errors");
        assert_eq!(logging.general().name(), "sanic.root");
        assert!(logging.access().propagate());
    }
}
