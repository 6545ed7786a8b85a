use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Arg, ArgAction, Command, builder::PathBufValueParser};
use logging::{
    ConfigurationError, DeprecationEmitter, FormatPolicy, FormattingError, Interactivity,
    LogRecord, Logging, LoggingConfig, WarningSink,
};
use logging_sink::{Destination, StreamTarget};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::{Layer as _, SubscriberExt};

const PROGRAM_NAME: &str = "srvlog";
const TRACE_ENV: &str = "SRVLOG_TRACE";

pub(crate) struct ParsedArgs {
    pub(crate) dump_config: bool,
    pub(crate) config: Option<PathBuf>,
    pub(crate) debug: bool,
    pub(crate) strict: bool,
    pub(crate) verbose: u8,
    pub(crate) deprecation: Option<String>,
    pub(crate) deprecated_in: f64,
}

fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .about("Exercise the server logging channels.")
        .arg(
            Arg::new("dump-config")
                .long("dump-config")
                .help("Print the logging configuration as JSON and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Load the logging configuration from a JSON file.")
                .value_parser(PathBufValueParser::new()),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Lower the general channel to DEBUG.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Fail when a record cannot be formatted.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Raise the verbosity threshold; repeat for more.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("deprecation")
                .long("deprecation")
                .value_name("MESSAGE")
                .help("Emit a deprecation notice with MESSAGE."),
        )
        .arg(
            Arg::new("deprecated-in")
                .long("deprecated-in")
                .value_name("VERSION")
                .default_value("22.0")
                .help("Version named by --deprecation.")
                .value_parser(clap::value_parser!(f64)),
        )
}

pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    let mut matches = clap_command().try_get_matches_from(args)?;

    Ok(ParsedArgs {
        dump_config: matches.get_flag("dump-config"),
        config: matches.remove_one::<PathBuf>("config"),
        debug: matches.get_flag("debug"),
        strict: matches.get_flag("strict"),
        verbose: matches.get_count("verbose"),
        deprecation: matches.remove_one::<String>("deprecation"),
        deprecated_in: matches.remove_one::<f64>("deprecated-in").unwrap_or(22.0),
    })
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigurationError),
    #[error(transparent)]
    Verbosity(#[from] logging::FilterStateError),
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
    #[error(transparent)]
    Format(#[from] FormattingError),
}

/// Parses `args`, builds the channels on top of the given destinations and
/// emits a sample of general, error and access records.
pub fn run_with<I, S>(
    args: I,
    stdout: Arc<dyn Destination>,
    stderr: Arc<dyn Destination>,
    warnings: Arc<dyn WarningSink>,
) -> ExitCode
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let parsed = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(error) => {
            let rendered = error.render().to_string();
            let target = if error.use_stderr() { &stderr } else { &stdout };
            let _ = target.write_line(rendered.trim_end());
            return if error.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&parsed, Arc::clone(&stdout), Arc::clone(&stderr), warnings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = stderr.write_line(&format!("{PROGRAM_NAME}: {error}"));
            ExitCode::FAILURE
        }
    }
}

fn run(
    parsed: &ParsedArgs,
    stdout: Arc<dyn Destination>,
    stderr: Arc<dyn Destination>,
    warnings: Arc<dyn WarningSink>,
) -> Result<(), RunError> {
    let mut config = match &parsed.config {
        Some(path) => {
            let json = fs::read_to_string(path).map_err(|source| RunError::Read {
                path: path.clone(),
                source,
            })?;
            LoggingConfig::from_json(&json)?
        }
        None => LoggingConfig::default(),
    };
    if parsed.debug {
        config = config.with_debug();
    }

    if parsed.dump_config {
        stdout.write_line(&config.to_json_pretty()?)?;
        return Ok(());
    }

    let logging = Arc::new(
        Logging::builder(config)
            .destination(StreamTarget::Stdout, Arc::clone(&stdout))
            .destination(StreamTarget::Stderr, stderr)
            .format_policy(if parsed.strict {
                FormatPolicy::Strict
            } else {
                FormatPolicy::Fallback
            })
            .build()?,
    );

    // Internal diagnostics stay silent unless SRVLOG_TRACE selects them.
    let diagnostics = EnvFilter::try_from_env(TRACE_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    let subscriber = tracing_subscriber::registry()
        .with(logging::ChannelLayer::new(Arc::clone(&logging)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(diagnostics),
        );

    tracing::subscriber::with_default(subscriber, || -> Result<(), RunError> {
        logging.set_verbosity(i32::from(parsed.verbose))?;
        emit_samples();

        // Records built directly skip the tracing layer.
        logging.log(&LogRecord::access(
            "",
            "127.0.0.1:50514",
            "GET http://127.0.0.1:8000/",
            200,
            13,
        ))?;

        if let Some(message) = &parsed.deprecation {
            DeprecationEmitter::new(Interactivity::Detect, warnings)
                .emit(message, parsed.deprecated_in);
        }

        logging.flush();
        Ok(())
    })
}

fn emit_samples() {
    logging::log_general!(INFO, "Goin' Fast @ http://127.0.0.1:8000");
    logging::log_general!(DEBUG, "Starting worker [{}]", std::process::id());
    logging::log_general!(INFO, verbosity = 1, "Dispatching signal: server.init.after");
    logging::log_general!(INFO, verbosity = 2, "SEND HEADERS");
    logging::log_error!(
        ERROR,
        "Exception occurred while handling uri: 'http://127.0.0.1:8000/boom'"
    );
    logging::log_access!(
        INFO,
        host = "127.0.0.1:50514",
        request = "GET http://127.0.0.1:8000/",
        status = 200u16,
        byte = 13u64,
        ""
    );
}
