//! The environment commands are launched in.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use camino::Utf8Path;
use camino::Utf8PathBuf;

use crate::command_log::CommandLogger;
use crate::cwd::current_dir_utf8;
use crate::writer::InputStream;
use crate::writer::OutputStream;

mod launch;

/// The working directory, environment, and default streams commands are launched with.
///
/// The context is only read while launching commands, so one context can launch any number of
/// commands, concurrently or not.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    working_dir: Utf8PathBuf,
    /// Overrides applied on top of this process's environment.
    env: BTreeMap<String, String>,
    stdin: InputStream,
    stdout: OutputStream,
    stderr: OutputStream,
    command_logger: Option<Arc<dyn CommandLogger>>,
    log_key: String,
    start: SystemTime,
}

impl ExecutionContext {
    /// Construct a context in the current directory, inheriting this process's environment and
    /// standard streams.
    pub fn new() -> miette::Result<Self> {
        Ok(Self::in_dir(current_dir_utf8()?))
    }

    /// Construct a context in the given directory, inheriting this process's environment and
    /// standard streams.
    pub fn in_dir(working_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            env: BTreeMap::new(),
            stdin: InputStream::Stdin,
            stdout: OutputStream::stdout(),
            stderr: OutputStream::stderr(),
            command_logger: None,
            log_key: String::new(),
            start: SystemTime::now(),
        }
    }

    /// The directory commands are launched in.
    pub fn working_dir(&self) -> &Utf8Path {
        &self.working_dir
    }

    /// Set the directory commands are launched in.
    pub fn set_working_dir(&mut self, working_dir: impl Into<Utf8PathBuf>) -> &mut Self {
        self.working_dir = working_dir.into();
        self
    }

    /// Set an environment variable for launched commands, overriding any inherited value.
    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The value of an environment variable set with [`ExecutionContext::set_env`].
    pub fn custom_env_value(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// The environment variables set with [`ExecutionContext::set_env`], as `KEY=VALUE` strings
    /// sorted by key.
    pub fn custom_env(&self) -> Vec<String> {
        self.env
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect()
    }

    /// The overrides set with [`ExecutionContext::set_env`].
    pub(crate) fn env_overrides(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// The environment launched commands see: this process's environment with the overrides
    /// applied.
    pub fn full_env(&self) -> BTreeMap<OsString, OsString> {
        let mut env = std::env::vars_os().collect::<BTreeMap<_, _>>();
        env.extend(
            self.env
                .iter()
                .map(|(key, value)| (OsString::from(key), OsString::from(value))),
        );
        env
    }

    /// Where connected commands read their stdin from.
    pub fn stdin(&self) -> &InputStream {
        &self.stdin
    }

    /// Set where connected commands read their stdin from.
    pub fn set_stdin(&mut self, stdin: InputStream) -> &mut Self {
        self.stdin = stdin;
        self
    }

    /// Where shown stdout is written.
    pub fn stdout(&self) -> &OutputStream {
        &self.stdout
    }

    /// Set where shown stdout is written.
    pub fn set_stdout(&mut self, stdout: OutputStream) -> &mut Self {
        self.stdout = stdout;
        self
    }

    /// Where shown stderr is written.
    pub fn stderr(&self) -> &OutputStream {
        &self.stderr
    }

    /// Set where shown stderr is written.
    pub fn set_stderr(&mut self, stderr: OutputStream) -> &mut Self {
        self.stderr = stderr;
        self
    }

    /// The logger commands are recorded with before they're launched.
    pub fn command_logger(&self) -> Option<&Arc<dyn CommandLogger>> {
        self.command_logger.as_ref()
    }

    /// Record commands with `logger` before they're launched.
    pub fn set_command_logger(&mut self, logger: Arc<dyn CommandLogger>) -> &mut Self {
        self.command_logger = Some(logger);
        self
    }

    /// A key identifying this context in command log file names.
    pub fn log_key(&self) -> &str {
        &self.log_key
    }

    /// Set the key identifying this context in command log file names.
    pub fn set_log_key(&mut self, log_key: impl Into<String>) -> &mut Self {
        self.log_key = log_key.into();
        self
    }

    /// When this context was created.
    pub fn start(&self) -> SystemTime {
        self.start
    }

    /// Override when this context was created, as used in command log file names.
    pub fn set_start(&mut self, start: SystemTime) -> &mut Self {
        self.start = start;
        self
    }

    /// Find a binary on the `$PATH` of [`ExecutionContext::full_env`], like a shell would.
    /// Names containing a slash are resolved relative to the working directory.
    pub fn command_path(&self, name: &str) -> Option<PathBuf> {
        let env = self.full_env();
        let path = env.get(OsStr::new("PATH"));
        match which::which_in(name, path, self.working_dir.as_std_path()) {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::trace!(name, "Failed to find command: {err}");
                None
            }
        }
    }

    /// True if [`ExecutionContext::command_path`] finds the binary.
    pub fn command_exists(&self, name: &str) -> bool {
        self.command_path(name).is_some()
    }

    /// Like [`ExecutionContext::command_path`], but exits the program if the binary isn't found.
    pub fn must_command_exist(&self, name: &str) -> PathBuf {
        match self.command_path(name) {
            Some(path) => path,
            None => {
                let report =
                    miette::miette!("Required command `{name}` wasn't found on the `$PATH`");
                eprintln!("{report:?}");
                std::process::exit(1);
            }
        }
    }
}
