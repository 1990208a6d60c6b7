//! Errors callers may want to match on.

use std::error::Error;
use std::fmt::Display;
use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;

/// A command couldn't be started.
///
/// This covers missing binaries, permission problems, invalid working directories, and empty
/// commands. A command that starts and then fails is not a `SpawnError`; check
/// [`ProcessResult::successful`][crate::ProcessResult::successful] instead.
#[derive(Debug)]
pub struct SpawnError {
    /// The command line that failed to start.
    pub command: String,
    /// The working directory the command was started in.
    pub working_dir: Utf8PathBuf,
    /// The underlying error.
    pub source: io::Error,
}

impl SpawnError {
    /// The kind of the underlying error.
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

impl Display for SpawnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Failed to start `{}` in {}",
            self.command, self.working_dir
        )
    }
}

impl Error for SpawnError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

impl miette::Diagnostic for SpawnError {
    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        match self.source.kind() {
            io::ErrorKind::NotFound => Some(Box::new(
                "Check that the binary is on the `$PATH` and the working directory exists",
            )),
            io::ErrorKind::PermissionDenied => {
                Some(Box::new("Check that the binary is executable"))
            }
            _ => None,
        }
    }
}

/// A process has no exit code yet, because it hasn't been waited for or because waiting failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodeUnavailable {
    /// The process's pid, if it was spawned.
    pub pid: Option<u32>,
}

impl Display for ExitCodeUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.pid {
            Some(pid) => write!(f, "No exit code available for process {pid}"),
            None => write!(f, "No exit code available"),
        }
    }
}

impl Error for ExitCodeUnavailable {}

impl miette::Diagnostic for ExitCodeUnavailable {
    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(
            "Detached processes have an exit code after `ProcessResult::wait` returns",
        ))
    }
}

/// Waiting for a process or reading its output failed.
#[derive(Debug, Clone)]
pub struct CompletionError {
    /// The command line of the process.
    pub command: String,
    /// The underlying error.
    pub source: Arc<io::Error>,
}

impl Display for CompletionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to wait for `{}`", self.command)
    }
}

impl Error for CompletionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}

impl miette::Diagnostic for CompletionError {}
