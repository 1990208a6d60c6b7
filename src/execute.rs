//! Launching commands.

use std::io;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::process::ChildStdin;
use tokio::process::Command;
use tracing::instrument;

use crate::command::LocalCommand;
use crate::command::ShellCommand;
use crate::command_ext::SpawnExt;
use crate::command_log::CommandLogger;
use crate::config::CommandConfig;
use crate::context::ExecutionContext;
use crate::error::SpawnError;
use crate::process_result::ProcessResult;
use crate::tee::Tee;
use crate::writer::InputStream;

impl ExecutionContext {
    /// Launch a command.
    ///
    /// The command runs in this context's working directory, with this context's environment
    /// overrides applied on top of this process's environment. `config` controls where its
    /// standard streams go and whether to wait for it:
    ///
    /// - Attached commands have completed by the time this returns. Their stdout and stderr are
    ///   drained concurrently, so a command filling one pipe can't block on the other.
    /// - Detached commands are spawned in their own process group and keep running; call
    ///   [`ProcessResult::wait`] to complete them.
    ///
    /// Returns a [`SpawnError`] if the command couldn't be started. A command that starts and
    /// fails is not an error; check [`ProcessResult::successful`].
    #[instrument(skip_all, fields(command = %command.serialize()), level = "debug")]
    pub async fn execute(
        &self,
        config: CommandConfig,
        command: &dyn ShellCommand,
    ) -> Result<ProcessResult, SpawnError> {
        if let Some(logger) = self.command_logger() {
            self.log_command(logger.clone(), command).await;
        }

        let serialized = command.serialize();
        let spawn_error = |source: io::Error| SpawnError {
            command: serialized.clone(),
            working_dir: self.working_dir().to_owned(),
            source,
        };

        let binary = command.binary();
        if binary.is_empty() {
            return Err(spawn_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Command is empty",
            )));
        }

        let mut process = Command::new(&binary);
        process
            .args(command.args())
            .current_dir(self.working_dir())
            .envs(self.env_overrides())
            .stdin(self.stdin_for(config))
            .stdout(if config.raw_stdout {
                Stdio::inherit()
            } else {
                Stdio::piped()
            })
            .stderr(if config.raw_stderr {
                Stdio::inherit()
            } else {
                Stdio::piped()
            });

        let mut result = ProcessResult::new(serialized.clone());
        let mut child = process.spawn_child(config.detach).map_err(spawn_error)?;
        tracing::debug!(pid = child.id(), detached = config.detach, "Spawned process");

        if let Some(stdout) = child.inner_mut().stdout.take() {
            let tee = Tee::new(
                "stdout",
                result.stdout_buffer(),
                config.output_stdout.then(|| self.stdout().clone()),
            );
            result.push_io_task(tokio::spawn(tee.drain(stdout)));
        }

        if let Some(stderr) = child.inner_mut().stderr.take() {
            let tee = Tee::new(
                "stderr",
                result.stderr_buffer(),
                config.output_stderr.then(|| self.stderr().clone()),
            );
            result.push_io_task(tokio::spawn(tee.drain(stderr)));
        }

        if let (Some(stdin), InputStream::Bytes(bytes)) =
            (child.inner_mut().stdin.take(), self.stdin())
        {
            result.push_io_task(tokio::spawn(feed_stdin(stdin, bytes.clone())));
        }

        result.set_child(child);

        if !config.detach {
            if let Err(err) = result.wait().await {
                // Also recorded in the result.
                tracing::debug!("{err}: {}", err.source);
            }
        }

        Ok(result)
    }

    /// Record `command` with `logger` on the blocking thread pool, since loggers may write files.
    /// Failures are logged and otherwise ignored.
    async fn log_command(&self, logger: Arc<dyn CommandLogger>, command: &dyn ShellCommand) {
        let context = self.clone();
        let command: LocalCommand = command.elements().into_iter().collect();
        let logged = tokio::task::spawn_blocking(move || logger.log(&context, &command)).await;
        match logged {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!("Failed to log command: {err:?}"),
            Err(err) => tracing::warn!("Command logger panicked: {err}"),
        }
    }

    fn stdin_for(&self, config: CommandConfig) -> Stdio {
        if !config.connect_stdin {
            return Stdio::null();
        }
        match self.stdin() {
            InputStream::Stdin => Stdio::inherit(),
            InputStream::Bytes(_) => Stdio::piped(),
            InputStream::Null => Stdio::null(),
        }
    }
}

async fn feed_stdin(mut stdin: ChildStdin, bytes: Arc<[u8]>) -> io::Result<()> {
    match stdin.write_all(&bytes).await {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("Process closed stdin before reading all its input");
            Ok(())
        }
        result => result,
    }
}
