//! The outcome of launching a command.

use std::fmt::Display;
use std::io;
use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use miette::miette;
use miette::IntoDiagnostic;
use miette::WrapErr;
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::child::ProcessChild;
use crate::error::CompletionError;
use crate::error::ExitCodeUnavailable;
use crate::exit_status;
use crate::exit_status::ResolvedExitStatus;
use crate::writer::CaptureBuffer;

/// A snapshot of a process after it exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessState {
    pid: Option<u32>,
    status: ExitStatus,
    elapsed: Duration,
}

impl ProcessState {
    /// The pid the process had.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// The raw exit status.
    pub fn status(&self) -> ExitStatus {
        self.status
    }

    /// How long the process ran, from just before it was spawned until it was reaped.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The exit status reduced to a single integer.
    pub fn resolved(&self) -> ResolvedExitStatus {
        exit_status::resolve(self.status)
    }

    /// True if the process exited normally, rather than being killed by a signal.
    pub fn exited(&self) -> bool {
        !self.resolved().signaled
    }

    /// True if the process was killed by a signal.
    pub fn signaled(&self) -> bool {
        self.resolved().signaled
    }

    /// The decoded exit code.
    pub fn exit_code(&self) -> i32 {
        self.resolved().code
    }

    /// True if the exit code is 0.
    pub fn success(&self) -> bool {
        self.exit_code() == 0
    }
}

/// The captured output and eventual exit status of a launched command.
///
/// Commands launched attached are complete by the time their `ProcessResult` is returned.
/// Detached commands keep running (and keep filling the output buffers) until
/// [`ProcessResult::wait`] is called.
pub struct ProcessResult {
    command: String,
    pid: Option<u32>,
    child: Option<ProcessChild>,
    stdout: CaptureBuffer,
    stderr: CaptureBuffer,
    /// Tasks draining the child's output and feeding its input.
    io_tasks: Vec<JoinHandle<io::Result<()>>>,
    started: Instant,
    state: Option<ProcessState>,
    error: Option<CompletionError>,
}

impl ProcessResult {
    pub(crate) fn new(command: String) -> Self {
        Self {
            command,
            pid: None,
            child: None,
            stdout: CaptureBuffer::new(),
            stderr: CaptureBuffer::new(),
            io_tasks: Vec::new(),
            started: Instant::now(),
            state: None,
            error: None,
        }
    }

    pub(crate) fn stdout_buffer(&self) -> CaptureBuffer {
        self.stdout.clone()
    }

    pub(crate) fn stderr_buffer(&self) -> CaptureBuffer {
        self.stderr.clone()
    }

    pub(crate) fn set_child(&mut self, child: ProcessChild) {
        self.pid = child.id();
        self.child = Some(child);
    }

    pub(crate) fn push_io_task(&mut self, task: JoinHandle<io::Result<()>>) {
        self.io_tasks.push(task);
    }

    /// The serialized command line.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Everything the process has written to stdout so far.
    ///
    /// Empty if stdout was passed through with `raw_stdout`.
    pub fn output(&self) -> String {
        self.stdout.contents()
    }

    /// Everything the process has written to stderr so far.
    ///
    /// Empty if stderr was passed through with `raw_stderr`.
    pub fn error(&self) -> String {
        self.stderr.contents()
    }

    /// [`ProcessResult::output`] without leading or trailing whitespace.
    pub fn trimmed_output(&self) -> String {
        self.output().trim().to_owned()
    }

    /// [`ProcessResult::error`] without leading or trailing whitespace.
    pub fn trimmed_error(&self) -> String {
        self.error().trim().to_owned()
    }

    /// The process's exit code, once it has completed.
    pub fn exit_code(&self) -> Result<i32, ExitCodeUnavailable> {
        self.state
            .as_ref()
            .map(ProcessState::exit_code)
            .ok_or(ExitCodeUnavailable { pid: self.pid })
    }

    /// True if the process has completed with exit code 0.
    pub fn successful(&self) -> bool {
        self.exit_code() == Ok(0)
    }

    /// The process's pid.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// The process's state after it exited, if it has completed.
    pub fn state(&self) -> Option<&ProcessState> {
        self.state.as_ref()
    }

    /// The error that occurred while completing the process, if any.
    pub fn completion_error(&self) -> Option<&CompletionError> {
        self.error.as_ref()
    }

    /// True once [`ProcessResult::wait`] has finished, successfully or not.
    pub fn is_complete(&self) -> bool {
        self.state.is_some() || self.error.is_some()
    }

    /// A one-line summary of the process state, for debugging.
    pub fn state_string(&self) -> String {
        fn or_unknown<T: Display>(value: Option<T>) -> String {
            value.map_or_else(|| "?".to_owned(), |value| value.to_string())
        }

        let elapsed = self
            .state
            .as_ref()
            .map_or_else(|| self.started.elapsed(), ProcessState::elapsed);

        format!(
            "PID: {}, Exited: {}, Exit Code: {}, Success: {}, Wall Time: {:.2?}",
            or_unknown(self.pid),
            self.state.is_some(),
            or_unknown(self.exit_code().ok()),
            self.successful(),
            elapsed,
        )
    }

    /// Send a signal to the process, or to its whole process group if it was detached.
    #[cfg(unix)]
    pub fn signal(&self, signal: nix::sys::signal::Signal) -> miette::Result<()> {
        if self.state.is_some() {
            return Err(miette!("`{}` has already exited", self.command));
        }
        let pid = self
            .pid
            .ok_or_else(|| miette!("`{}` has no pid", self.command))?;
        let detached = self.child.as_ref().map_or(false, ProcessChild::is_detached);
        crate::child::send_signal(pid, detached, signal)
    }

    /// Start killing the process, or its whole process group if it was detached.
    ///
    /// This doesn't wait for the process to exit; call [`ProcessResult::wait`] afterwards.
    pub fn kill(&mut self) -> miette::Result<()> {
        if self.state.is_some() {
            return Ok(());
        }
        match &mut self.child {
            Some(child) => child
                .start_kill()
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to kill `{}`", self.command)),
            None => Ok(()),
        }
    }

    /// Wait for the process to exit and for its output to be fully captured.
    ///
    /// Once this returns, the result is complete and later calls return the same outcome
    /// immediately. Dropping the returned future before it completes is safe; the wait can be
    /// started again, for example after [`ProcessResult::kill`].
    #[instrument(skip(self), fields(command = %self.command, pid = ?self.pid), level = "debug")]
    pub async fn wait(&mut self) -> Result<(), CompletionError> {
        if self.is_complete() {
            return self.error.clone().map_or(Ok(()), Err);
        }

        let child = match &mut self.child {
            Some(child) => child,
            None => return Ok(()),
        };

        let status = match child.wait().await {
            Ok(status) => status,
            Err(err) => return Err(self.fail(err)),
        };
        let elapsed = self.started.elapsed();
        tracing::debug!(%status, "Process exited in {elapsed:.2?}");

        let mut io_error = None;
        while let Some(task) = self.io_tasks.first_mut() {
            let result = task.await;
            self.io_tasks.remove(0);
            let err = match result {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err,
                Err(err) => io::Error::new(io::ErrorKind::Other, err),
            };
            tracing::debug!("Stream task failed: {err}");
            io_error.get_or_insert(err);
        }

        self.state = Some(ProcessState {
            pid: self.pid,
            status,
            elapsed,
        });

        match io_error {
            Some(err) => Err(self.fail(err)),
            None => Ok(()),
        }
    }

    fn fail(&mut self, err: io::Error) -> CompletionError {
        let err = CompletionError {
            command: self.command.clone(),
            source: Arc::new(err),
        };
        self.error = Some(err.clone());
        err
    }
}

impl std::fmt::Debug for ProcessResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessResult")
            .field("command", &self.command)
            .field("pid", &self.pid)
            .field("state", &self.state)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
