//! A handle to a spawned child process, attached or in its own process group.

use std::fmt::Debug;
use std::io;
use std::process::ExitStatus;

use command_group::AsyncGroupChild;
use tokio::process::Child;

/// A spawned child process.
pub enum ProcessChild {
    /// A child in this process's process group.
    Attached(Child),
    /// A child leading its own process group.
    Detached(AsyncGroupChild),
}

impl ProcessChild {
    /// The child's pid, or `None` if it has already been waited for.
    pub fn id(&self) -> Option<u32> {
        match self {
            Self::Attached(child) => child.id(),
            Self::Detached(child) => child.id(),
        }
    }

    /// True if the child leads its own process group.
    pub fn is_detached(&self) -> bool {
        matches!(self, Self::Detached(_))
    }

    /// The underlying [`Child`], for taking its standard streams.
    pub fn inner_mut(&mut self) -> &mut Child {
        match self {
            Self::Attached(child) => child,
            Self::Detached(child) => child.inner(),
        }
    }

    /// Wait for the child to exit. This can be called again after it returns.
    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        match self {
            Self::Attached(child) => child.wait().await,
            Self::Detached(child) => child.wait().await,
        }
    }

    /// Start killing the child (and its process group, if detached) without waiting for it to
    /// exit.
    pub fn start_kill(&mut self) -> io::Result<()> {
        match self {
            Self::Attached(child) => child.start_kill(),
            // Sends `SIGKILL` to the whole group and returns without reaping.
            Self::Detached(child) => child.kill(),
        }
    }
}

impl Debug for ProcessChild {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessChild")
            .field("pid", &self.id())
            .field("detached", &self.is_detached())
            .finish()
    }
}

/// Send a signal to a child process, or to its whole process group if it's detached.
#[cfg(unix)]
pub fn send_signal(
    pid: u32,
    detached: bool,
    signal: nix::sys::signal::Signal,
) -> miette::Result<()> {
    use miette::IntoDiagnostic;
    use miette::WrapErr;
    use nix::unistd::Pid;

    let pid = Pid::from_raw(
        pid.try_into()
            .into_diagnostic()
            .wrap_err("Failed to convert pid type")?,
    );

    let result = if detached {
        // A group-spawned child's pid is also its process group id.
        nix::sys::signal::killpg(pid, signal)
    } else {
        nix::sys::signal::kill(pid, signal)
    };

    result
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to send {signal} to process {pid}"))
}
