//! `shellout` runs external commands the way a shell script would.
//!
//! Build a command from a command line or from parts, launch it in an [`ExecutionContext`] with
//! a [`CommandConfig`] saying where its output goes, and inspect its output and exit code in the
//! returned [`ProcessResult`]:
//!
//! ```no_run
//! # async fn run() -> miette::Result<()> {
//! use shellout::ExecutionContext;
//! use shellout::LocalCommand;
//!
//! let context = ExecutionContext::new()?;
//! let result = context
//!     .execute_fully_silent(&LocalCommand::from_string("git rev-parse HEAD"))
//!     .await?;
//! if result.successful() {
//!     println!("HEAD is {}", result.trimmed_output());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Commands can also be launched detached and completed later with [`ProcessResult::wait`], or
//! wrapped in `ssh` with [`SshCommand`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod buffers;
mod child;
mod clap;
pub mod cli;
mod command;
mod command_ext;
mod command_log;
mod config;
mod context;
mod cwd;
mod error;
mod execute;
mod exit_status;
mod process_result;
mod split;
mod tee;
mod tracing;
mod writer;

pub use command::join;
pub use command::quote;
pub use command::LocalCommand;
pub use command::ShellCommand;
pub use command::SshCommand;
pub use command_log::log_line;
pub use command_log::CommandLogger;
pub use command_log::FileCommandLogger;
pub use config::CommandConfig;
pub use context::ExecutionContext;
pub use error::CompletionError;
pub use error::ExitCodeUnavailable;
pub use error::SpawnError;
pub use exit_status::resolve as resolve_exit_status;
pub use exit_status::ResolvedExitStatus;
pub use process_result::ProcessResult;
pub use process_result::ProcessState;
pub use split::split;
pub use tee::Tee;
pub use tracing::TracingOpts;
pub use writer::CaptureBuffer;
pub use writer::InputStream;
pub use writer::OutputStream;

#[cfg(unix)]
pub use nix::sys::signal::Signal;
