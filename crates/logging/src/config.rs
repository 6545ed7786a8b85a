//! crates/logging/src/config.rs
//! Typed logging configuration and its default.
//!
//! [`LoggingConfig`] mirrors the nested mapping consumed by dictionary-based
//! logging backends: `version`, `disable_existing_loggers`, `loggers`,
//! `handlers` and `formatters`. The default value is the exported
//! configuration artefact; external consumers merge their overrides into its
//! JSON form, so field names and default values are fixed.

use std::collections::BTreeMap;

use logging_sink::StreamTarget;

use crate::channel::ChannelKind;
use crate::format::Formatter;
use crate::severity::Severity;

/// Schema version of the configuration mapping.
pub const CONFIG_VERSION: u32 = 1;

/// Template of the `generic` formatter.
pub const GENERIC_FORMAT: &str = "%(asctime)s [%(process)d] [%(levelname)s] %(message)s";

/// Template of the `access` formatter.
pub const ACCESS_FORMAT: &str = concat!(
    "%(asctime)s - (%(name)s)[%(levelname)s][%(host)s]: ",
    "%(request)s %(message)s %(status)d %(byte)d"
);

/// Timestamp pattern shared by both default formatters.
pub const DEFAULT_DATE_FORMAT: &str = "[%Y-%m-%d %H:%M:%S %z]";

/// The only handler class understood by this crate.
pub const STREAM_HANDLER_CLASS: &str = "logging.StreamHandler";

/// The only formatter class understood by this crate.
pub const FORMATTER_CLASS: &str = "logging.Formatter";

/// Errors detected while validating or loading a [`LoggingConfig`].
///
/// All of them are raised before any channel exists, so a bad configuration
/// never produces partial logging.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The JSON document could not be parsed into a configuration.
    #[error("invalid logging configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The `version` key is not [`CONFIG_VERSION`].
    #[error(
        "unsupported logging configuration version {0}; expected {expected}",
        expected = CONFIG_VERSION
    )]
    UnsupportedVersion(u32),

    /// One of the three channels has no logger entry.
    #[error("no logger configured for the {channel} channel (expected '{logger}')")]
    MissingChannel {
        /// Channel lacking a logger.
        channel: ChannelKind,
        /// Logger key that was looked up.
        logger: &'static str,
    },

    /// A logger names a handler that is not defined.
    #[error("logger '{logger}' references unknown handler '{handler}'")]
    UnknownHandler {
        /// Logger holding the reference.
        logger: String,
        /// Missing handler name.
        handler: String,
    },

    /// A handler names a formatter that is not defined.
    #[error("handler '{handler}' references unknown formatter '{formatter}'")]
    UnknownFormatter {
        /// Handler holding the reference.
        handler: String,
        /// Missing formatter name.
        formatter: String,
    },

    /// A handler uses a class other than [`STREAM_HANDLER_CLASS`].
    #[error("handler '{handler}' uses unsupported class '{class}'")]
    UnsupportedHandlerClass {
        /// Handler name.
        handler: String,
        /// Rejected class.
        class: String,
    },

    /// A formatter uses a class other than [`FORMATTER_CLASS`].
    #[error("formatter '{formatter}' uses unsupported class '{class}'")]
    UnsupportedFormatterClass {
        /// Formatter name.
        formatter: String,
        /// Rejected class.
        class: String,
    },

    /// A format template could not be parsed.
    #[error("invalid format template {format:?} at byte {position}: {reason}")]
    Template {
        /// Offending template.
        format: String,
        /// Byte offset of the problem.
        position: usize,
        /// What went wrong.
        reason: &'static str,
    },

    /// A date pattern contains a directive this crate cannot render.
    #[error("unsupported directive '%{directive}' in date format {datefmt:?}")]
    DateFormat {
        /// Offending pattern.
        datefmt: String,
        /// Unsupported directive character.
        directive: char,
    },
}

/// Logger entry: level gate and attached handlers.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoggerConfig {
    /// Minimum severity written by the logger.
    pub level: Severity,
    /// Handler names, in emission order.
    pub handlers: Vec<String>,
    /// Whether records also reach ancestor loggers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagate: Option<bool>,
    /// Name rendered by `%(name)s`; defaults to the logger key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualname: Option<String>,
}

/// Handler entry: formatter plus destination stream.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HandlerConfig {
    /// Handler implementation; only [`STREAM_HANDLER_CLASS`] is supported.
    #[serde(default = "default_handler_class")]
    pub class: String,
    /// Name of the formatter entry.
    pub formatter: String,
    /// Process stream the handler writes to.
    pub stream: StreamTarget,
}

/// Formatter entry: template and timestamp pattern.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FormatterConfig {
    /// `%(field)s` style template.
    pub format: String,
    /// strftime-style pattern rendered by `%(asctime)s`.
    pub datefmt: String,
    /// Formatter implementation; only [`FORMATTER_CLASS`] is supported.
    #[serde(default = "default_formatter_class")]
    pub class: String,
}

fn default_handler_class() -> String {
    STREAM_HANDLER_CLASS.to_owned()
}

fn default_formatter_class() -> String {
    FORMATTER_CLASS.to_owned()
}

/// Complete configuration of the three logging channels.
///
/// # Examples
///
/// ```
/// use logging::{ChannelKind, LoggingConfig, Severity};
///
/// let config = LoggingConfig::default().with_level(ChannelKind::Access, Severity::Warning);
/// config.validate().unwrap();
///
/// let json = config.to_json_pretty().unwrap();
/// let parsed = LoggingConfig::from_json(&json).unwrap();
/// assert_eq!(parsed, config);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoggingConfig {
    /// Schema version, always [`CONFIG_VERSION`].
    pub version: u32,
    /// Whether loggers not named here are disabled.
    pub disable_existing_loggers: bool,
    /// Logger entries keyed by logger name.
    pub loggers: BTreeMap<String, LoggerConfig>,
    /// Handler entries keyed by handler name.
    pub handlers: BTreeMap<String, HandlerConfig>,
    /// Formatter entries keyed by formatter name.
    pub formatters: BTreeMap<String, FormatterConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let loggers = BTreeMap::from([
            (
                ChannelKind::General.logger_name().to_owned(),
                LoggerConfig {
                    level: Severity::Info,
                    handlers: vec!["console".to_owned()],
                    propagate: None,
                    qualname: None,
                },
            ),
            (
                ChannelKind::Error.logger_name().to_owned(),
                LoggerConfig {
                    level: Severity::Info,
                    handlers: vec!["error_console".to_owned()],
                    propagate: Some(true),
                    qualname: Some(ChannelKind::Error.logger_name().to_owned()),
                },
            ),
            (
                ChannelKind::Access.logger_name().to_owned(),
                LoggerConfig {
                    level: Severity::Info,
                    handlers: vec!["access_console".to_owned()],
                    propagate: Some(true),
                    qualname: Some(ChannelKind::Access.logger_name().to_owned()),
                },
            ),
        ]);

        let stream_handler = |formatter: &str, stream| HandlerConfig {
            class: default_handler_class(),
            formatter: formatter.to_owned(),
            stream,
        };
        let handlers = BTreeMap::from([
            ("console".to_owned(), stream_handler("generic", StreamTarget::Stdout)),
            ("error_console".to_owned(), stream_handler("generic", StreamTarget::Stderr)),
            ("access_console".to_owned(), stream_handler("access", StreamTarget::Stdout)),
        ]);

        let formatter = |format: &str| FormatterConfig {
            format: format.to_owned(),
            datefmt: DEFAULT_DATE_FORMAT.to_owned(),
            class: default_formatter_class(),
        };
        let formatters = BTreeMap::from([
            ("generic".to_owned(), formatter(GENERIC_FORMAT)),
            ("access".to_owned(), formatter(ACCESS_FORMAT)),
        ]);

        Self {
            version: CONFIG_VERSION,
            disable_existing_loggers: false,
            loggers,
            handlers,
            formatters,
        }
    }
}

impl LoggingConfig {
    /// Parses a configuration from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises the configuration as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, ConfigurationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the logger entry backing `channel`.
    #[must_use]
    pub fn logger(&self, channel: ChannelKind) -> Option<&LoggerConfig> {
        self.loggers.get(channel.logger_name())
    }

    /// Returns a copy with the level of `channel` replaced.
    ///
    /// Channels without a logger entry are left alone; [`validate`](Self::validate)
    /// reports them.
    #[must_use]
    pub fn with_level(mut self, channel: ChannelKind, level: Severity) -> Self {
        if let Some(logger) = self.loggers.get_mut(channel.logger_name()) {
            logger.level = level;
        }
        self
    }

    /// Returns a copy with the general channel lowered to `DEBUG`, as the
    /// server does when it runs in debug mode.
    #[must_use]
    pub fn with_debug(self) -> Self {
        self.with_level(ChannelKind::General, Severity::Debug)
    }

    /// Checks every cross reference and compiles every formatter.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigurationError::UnsupportedVersion(self.version));
        }

        for channel in ChannelKind::ALL {
            if self.logger(channel).is_none() {
                return Err(ConfigurationError::MissingChannel {
                    channel,
                    logger: channel.logger_name(),
                });
            }
        }

        for (logger, entry) in &self.loggers {
            for handler in &entry.handlers {
                if !self.handlers.contains_key(handler) {
                    return Err(ConfigurationError::UnknownHandler {
                        logger: logger.clone(),
                        handler: handler.clone(),
                    });
                }
            }
        }

        for (name, handler) in &self.handlers {
            if handler.class != STREAM_HANDLER_CLASS {
                return Err(ConfigurationError::UnsupportedHandlerClass {
                    handler: name.clone(),
                    class: handler.class.clone(),
                });
            }
            if !self.formatters.contains_key(&handler.formatter) {
                return Err(ConfigurationError::UnknownFormatter {
                    handler: name.clone(),
                    formatter: handler.formatter.clone(),
                });
            }
        }

        for (name, entry) in &self.formatters {
            compile(name, entry)?;
        }

        Ok(())
    }

    /// Compiles the formatter used by the handler called `handler`.
    pub(crate) fn compile_formatter(&self, handler: &str) -> Result<Formatter, ConfigurationError> {
        let entry = self.handlers.get(handler).ok_or_else(|| {
            ConfigurationError::UnknownHandler {
                logger: String::from("<builder>"),
                handler: handler.to_owned(),
            }
        })?;
        let formatter = self.formatters.get(&entry.formatter).ok_or_else(|| {
            ConfigurationError::UnknownFormatter {
                handler: handler.to_owned(),
                formatter: entry.formatter.clone(),
            }
        })?;
        compile(&entry.formatter, formatter)
    }
}

fn compile(name: &str, entry: &FormatterConfig) -> Result<Formatter, ConfigurationError> {
    if entry.class != FORMATTER_CLASS {
        return Err(ConfigurationError::UnsupportedFormatterClass {
            formatter: name.to_owned(),
            class: entry.class.clone(),
        });
    }
    Formatter::new(name, &entry.format, &entry.datefmt)
}
