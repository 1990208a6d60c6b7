//! Recording launched commands.

use std::fmt::Debug;
use std::io::Write;

use camino::Utf8PathBuf;
use miette::Context;
use miette::IntoDiagnostic;

use crate::command::ShellCommand;
use crate::context::ExecutionContext;

/// Something that records each command before it's launched.
pub trait CommandLogger: Debug + Send + Sync {
    /// Record that `command` is about to be launched in `context`.
    fn log(&self, context: &ExecutionContext, command: &dyn ShellCommand) -> miette::Result<()>;
}

/// The line a [`CommandLogger`] should record for a command: the working directory and the
/// serialized command line.
pub fn log_line(context: &ExecutionContext, command: &dyn ShellCommand) -> String {
    format!("{}: {}\n", context.working_dir(), command.serialize())
}

/// A [`CommandLogger`] appending to a file.
///
/// If the context has a non-empty log key, `{log_key}` in the path is replaced with the log key
/// and `{start}` is replaced with the context's start time, formatted as an RFC 3339 timestamp.
/// This lets several runs of a program each log to their own file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommandLogger {
    path: String,
}

impl FileCommandLogger {
    /// Log to the given path, which may contain `{log_key}` and `{start}` placeholders.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Log to the path in the environment variable `key`, or `None` if it's unset or empty.
    pub fn from_env(key: &str) -> Option<Self> {
        std::env::var(key)
            .ok()
            .filter(|path| !path.is_empty())
            .map(Self::new)
    }

    /// The path to log to for the given context, with placeholders filled in.
    pub fn path(&self, context: &ExecutionContext) -> Utf8PathBuf {
        if context.log_key().is_empty() {
            return self.path.clone().into();
        }

        self.path
            .replace("{log_key}", context.log_key())
            .replace(
                "{start}",
                &humantime::format_rfc3339_seconds(context.start()).to_string(),
            )
            .into()
    }
}

impl CommandLogger for FileCommandLogger {
    fn log(&self, context: &ExecutionContext, command: &dyn ShellCommand) -> miette::Result<()> {
        let path = self.path(context);

        let mut options = std::fs::OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to open command log {path}"))?;

        file.write_all(log_line(context, command).as_bytes())
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write to command log {path}"))
    }
}
