//! Launch configuration for [`ExecutionContext::execute`][crate::ExecutionContext::execute].

/// How a command's standard streams are routed, and whether to wait for it.
///
/// The default configuration captures both output streams without showing them, leaves the
/// child's stdin unconnected, and waits for the child to exit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandConfig {
    /// Copy captured stdout to the context's output stream.
    pub output_stdout: bool,
    /// Copy captured stderr to the context's error stream.
    pub output_stderr: bool,
    /// Connect the context's input stream to the child's stdin.
    pub connect_stdin: bool,
    /// Return as soon as the child is spawned, in its own process group.
    pub detach: bool,
    /// Connect the child's stdout directly to this process's stdout. Nothing is captured.
    pub raw_stdout: bool,
    /// Connect the child's stderr directly to this process's stderr. Nothing is captured.
    pub raw_stderr: bool,
}

impl CommandConfig {
    /// Capture both output streams and show them.
    pub fn debug() -> Self {
        Self {
            output_stdout: true,
            output_stderr: true,
            ..Default::default()
        }
    }

    /// Capture both output streams and show only stderr.
    pub fn silent() -> Self {
        Self {
            output_stderr: true,
            ..Default::default()
        }
    }

    /// Capture both output streams and show neither.
    pub fn fully_silent() -> Self {
        Self::default()
    }

    /// Pass all three standard streams through to the child.
    pub fn raw() -> Self {
        Self {
            connect_stdin: true,
            raw_stdout: true,
            raw_stderr: true,
            ..Default::default()
        }
    }

    /// Don't wait for the child to exit.
    pub fn detached(self) -> Self {
        Self {
            detach: true,
            ..self
        }
    }

    /// Connect the context's input stream to the child.
    pub fn with_stdin(self) -> Self {
        Self {
            connect_stdin: true,
            ..self
        }
    }
}
