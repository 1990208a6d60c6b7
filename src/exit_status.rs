//! Decoding a platform [`ExitStatus`] into a single integer exit code.

use std::process::ExitStatus;

/// An exit status reduced to a single integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedExitStatus {
    /// The exit code. Normal exits are in `0..=255`.
    pub code: i32,
    /// True if the process was terminated by a signal, in which case `code` is `128 + signal`,
    /// like shells report it.
    pub signaled: bool,
}

/// Decode an [`ExitStatus`].
#[cfg(unix)]
pub fn resolve(status: ExitStatus) -> ResolvedExitStatus {
    use std::os::unix::process::ExitStatusExt;

    if let Some(code) = status.code() {
        ResolvedExitStatus {
            code: code & 0xff,
            signaled: false,
        }
    } else if let Some(signal) = status.signal() {
        ResolvedExitStatus {
            code: 128 + signal,
            signaled: true,
        }
    } else {
        // Stopped or continued; neither should be observable after `wait`.
        ResolvedExitStatus {
            code: (status.into_raw() >> 8) & 0xff,
            signaled: false,
        }
    }
}

/// Decode an [`ExitStatus`].
#[cfg(not(unix))]
pub fn resolve(status: ExitStatus) -> ResolvedExitStatus {
    ResolvedExitStatus {
        code: status.code().unwrap_or(-1),
        signaled: false,
    }
}
