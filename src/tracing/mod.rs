//! Extensions and utilities for the [`tracing`] crate.

use camino::Utf8Path;
use miette::Context;
use miette::IntoDiagnostic;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::JsonFields;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

use crate::cli::Opts;

/// Options for initializing the [`tracing`] logging framework. This is like a lower-effort builder
/// interface, mostly provided because Rust tragically lacks named arguments.
pub struct TracingOpts<'opts> {
    /// Filter directives to control which events are logged.
    pub filter_directives: &'opts str,
    /// If given, log as JSON to the given path.
    pub json_log_path: Option<&'opts Utf8Path>,
}

impl<'opts> TracingOpts<'opts> {
    /// Construct options for initializing the [`tracing`] logging framework from parsed
    /// commmand-line interface arguments as [`Opts`].
    pub fn from_cli(opts: &'opts Opts) -> Self {
        Self {
            filter_directives: &opts.logging.tracing_filter,
            json_log_path: opts.logging.log_json.as_deref(),
        }
    }

    /// Initialize the [`tracing`] logging framework.
    ///
    /// Human-readable logs go to stderr, leaving stdout to the launched command. If a JSON log
    /// is written, the returned guard must be held until the program exits so buffered events
    /// are flushed.
    pub fn install(&self) -> miette::Result<Option<WorkerGuard>> {
        let env_filter = EnvFilter::try_new(self.filter_directives).into_diagnostic()?;

        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(env_filter);

        let registry = tracing_subscriber::registry();

        let registry = registry.with(fmt_layer);

        match &self.json_log_path {
            Some(path) => {
                let (json_layer, guard) = tracing_json_layer(self.filter_directives, path)?;
                registry.with(json_layer).init();
                Ok(Some(guard))
            }
            None => {
                registry.init();
                Ok(None)
            }
        }
    }
}

fn tracing_json_layer<S>(
    filter_directives: &str,
    log_path: &Utf8Path,
) -> miette::Result<(
    Box<dyn tracing_subscriber::Layer<S> + Send + Sync + 'static>,
    WorkerGuard,
)>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let file = std::fs::File::create(log_path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to open {log_path:?}"))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let env_filter = EnvFilter::try_new(filter_directives).into_diagnostic()?;

    let layer = fmt::layer()
        .event_format(fmt::format::json())
        .fmt_fields(JsonFields::new())
        .with_writer(writer)
        .with_filter(env_filter)
        .boxed();

    Ok((layer, guard))
}
