//! Command-line argument parser and argument access.

use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;

use crate::clap::KeyValue;
use crate::clap::RustBacktrace;
use crate::CommandConfig;
use crate::ExecutionContext;
use crate::FileCommandLogger;
use crate::LocalCommand;
use crate::ProcessResult;
use crate::ShellCommand;
use crate::SshCommand;

/// Run a command the way a shell script would, capturing its output and exiting with its exit
/// code.
#[derive(Debug, Clone, Parser)]
#[command(version, author, about)]
#[command(max_term_width = 100)]
pub struct Opts {
    /// How to route the command's output.
    #[arg(long, value_enum, default_value_t = Mode::Debug)]
    pub mode: Mode,

    /// Launch the command in its own process group. Interrupting `shellout` kills the whole
    /// group.
    #[arg(long)]
    pub detach: bool,

    /// The directory to run the command in. Defaults to the current directory.
    #[arg(long)]
    pub cwd: Option<Utf8PathBuf>,

    /// Set an environment variable for the command. Can be given multiple times.
    #[arg(long, value_name = "KEY=VALUE")]
    pub env: Vec<KeyValue>,

    /// Run the command on this host with `ssh`, like `user@example.com`.
    #[arg(long, value_name = "TARGET")]
    pub ssh: Option<String>,

    /// Pass an `-o KEY=VALUE` option to `ssh`. Can be given multiple times.
    #[arg(long = "ssh-option", value_name = "KEY=VALUE", requires = "ssh")]
    pub ssh_options: Vec<KeyValue>,

    /// Exit without running anything if this binary isn't on the `$PATH`. Can be given multiple
    /// times.
    #[arg(long, value_name = "BINARY")]
    pub require: Vec<String>,

    /// Print the command line that would be run, quoted, and exit without running it.
    #[arg(long)]
    pub print: bool,

    /// Append each command to this file before running it.
    ///
    /// `{log_key}` and `{start}` in the path are replaced when `--log-key` is given.
    #[arg(long, env = "SHELLOUT_COMMAND_LOG")]
    pub command_log: Option<String>,

    /// A key identifying this run in the `--command-log` path.
    #[arg(long, requires = "command_log")]
    pub log_key: Option<String>,

    /// Options to modify logging and error-handling behavior.
    #[command(flatten)]
    pub logging: LoggingOpts,

    /// The command to run.
    ///
    /// A single argument is split into words like a shell would, honoring `"` and `'` quotes.
    /// Several arguments are used as-is.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// How to route a command's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Capture and show stdout and stderr.
    Debug,
    /// Capture both streams, but only show stderr.
    Silent,
    /// Capture both streams and show neither.
    FullySilent,
    /// Connect the command directly to this terminal.
    Raw,
}

impl Mode {
    /// The launch configuration for this mode.
    pub fn config(self) -> CommandConfig {
        match self {
            Mode::Debug => CommandConfig::debug(),
            Mode::Silent => CommandConfig::silent(),
            Mode::FullySilent => CommandConfig::fully_silent(),
            Mode::Raw => CommandConfig::raw(),
        }
    }
}

/// Options to modify logging and error-handling behavior.
#[derive(Debug, Clone, clap::Args)]
#[clap(next_help_heading = "Logging options")]
pub struct LoggingOpts {
    #[allow(rustdoc::bare_urls)]
    /// Tracing filter.
    ///
    /// Can be any of "error", "warn", "info", "debug", or
    /// "trace". Supports more granular filtering, as well.
    /// See: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
    ///
    /// A nice value is "shellout=debug".
    #[arg(long, default_value = "shellout=info")]
    pub tracing_filter: String,

    /// How to display backtraces in error messages. '0' for no backtraces, '1' for standard
    /// backtraces, and 'full' to display source snippets.
    #[arg(long, env = "RUST_BACKTRACE", default_value = "0")]
    pub backtrace: RustBacktrace,

    /// Path to write JSON logs to.
    #[arg(long, value_name = "PATH")]
    pub log_json: Option<Utf8PathBuf>,
}

impl Opts {
    /// Perform late initialization of the command-line arguments. If `init` isn't called before
    /// the arguments are used, the behavior is undefined.
    pub fn init(&mut self) {
        // These help our libraries (particularly `miette`) see these options.
        // The options are provided mostly for documentation.
        std::env::set_var("RUST_BACKTRACE", self.logging.backtrace.to_string());
    }

    /// The command to run, wrapped in `ssh` if `--ssh` is given.
    pub fn command(&self) -> Box<dyn ShellCommand> {
        let words: Vec<String> = match self.command.as_slice() {
            [command_line] => {
                let (binary, args) = crate::split(command_line);
                std::iter::once(binary)
                    .filter(|binary| !binary.is_empty())
                    .chain(args)
                    .collect()
            }
            words => words.to_vec(),
        };

        match &self.ssh {
            Some(target) => {
                let mut command = SshCommand::new(target);
                for option in &self.ssh_options {
                    command.add_option(&option.key, &option.value);
                }
                command.add_all(words);
                Box::new(command)
            }
            None => Box::new(words.into_iter().collect::<LocalCommand>()),
        }
    }

    /// The launch configuration.
    pub fn config(&self) -> CommandConfig {
        let config = self.mode.config();
        if self.detach {
            config.detached()
        } else {
            config
        }
    }

    /// Launch the command with the configured mode, exiting the program if it can't be started.
    ///
    /// Detached commands are still running when this returns.
    pub async fn must_launch(
        &self,
        context: &ExecutionContext,
        command: &dyn ShellCommand,
    ) -> ProcessResult {
        match (self.mode, self.detach) {
            (Mode::Debug, false) => context.must_execute_debug(command).await,
            (Mode::Debug, true) => context.must_execute_debug_detached(command).await,
            (Mode::Silent, false) => context.must_execute_silent(command).await,
            (Mode::Silent, true) => context.must_execute_silent_detached(command).await,
            (Mode::FullySilent, false) => context.must_execute_fully_silent(command).await,
            (Mode::FullySilent, true) => {
                context.must_execute_fully_silent_detached(command).await
            }
            (Mode::Raw, false) => context.must_execute_raw(command).await,
            (Mode::Raw, true) => context.must_execute_raw_detached(command).await,
        }
    }

    /// The context to run the command in.
    pub fn context(&self) -> miette::Result<ExecutionContext> {
        let mut context = match &self.cwd {
            Some(cwd) => ExecutionContext::in_dir(cwd.clone()),
            None => ExecutionContext::new()?,
        };

        for KeyValue { key, value } in &self.env {
            context.set_env(key, value);
        }

        if let Some(path) = &self.command_log {
            context.set_command_logger(Arc::new(FileCommandLogger::new(path)));
        }

        if let Some(log_key) = &self.log_key {
            context.set_log_key(log_key);
        }

        Ok(context)
    }
}
