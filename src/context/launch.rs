//! Shorthands for launching commands with the preset [`CommandConfig`]s.

use crate::command::ShellCommand;
use crate::config::CommandConfig;
use crate::error::SpawnError;
use crate::process_result::ProcessResult;

use super::ExecutionContext;

impl ExecutionContext {
    /// Launch a command, showing its stdout and stderr.
    pub async fn execute_debug(
        &self,
        command: &dyn ShellCommand,
    ) -> Result<ProcessResult, SpawnError> {
        self.execute(CommandConfig::debug(), command).await
    }

    /// Launch a command in the background, showing its stdout and stderr.
    pub async fn execute_debug_detached(
        &self,
        command: &dyn ShellCommand,
    ) -> Result<ProcessResult, SpawnError> {
        self.execute(CommandConfig::debug().detached(), command).await
    }

    /// Launch a command, showing only its stderr.
    pub async fn execute_silent(
        &self,
        command: &dyn ShellCommand,
    ) -> Result<ProcessResult, SpawnError> {
        self.execute(CommandConfig::silent(), command).await
    }

    /// Launch a command in the background, showing only its stderr.
    pub async fn execute_silent_detached(
        &self,
        command: &dyn ShellCommand,
    ) -> Result<ProcessResult, SpawnError> {
        self.execute(CommandConfig::silent().detached(), command).await
    }

    /// Launch a command, capturing its output without showing it.
    pub async fn execute_fully_silent(
        &self,
        command: &dyn ShellCommand,
    ) -> Result<ProcessResult, SpawnError> {
        self.execute(CommandConfig::fully_silent(), command).await
    }

    /// Launch a command in the background, capturing its output without showing it.
    pub async fn execute_fully_silent_detached(
        &self,
        command: &dyn ShellCommand,
    ) -> Result<ProcessResult, SpawnError> {
        self.execute(CommandConfig::fully_silent().detached(), command)
            .await
    }

    /// Launch a command connected directly to this process's standard streams.
    pub async fn execute_raw(
        &self,
        command: &dyn ShellCommand,
    ) -> Result<ProcessResult, SpawnError> {
        self.execute(CommandConfig::raw(), command).await
    }

    /// Launch a command in the background, connected directly to this process's standard
    /// streams.
    pub async fn execute_raw_detached(
        &self,
        command: &dyn ShellCommand,
    ) -> Result<ProcessResult, SpawnError> {
        self.execute(CommandConfig::raw().detached(), command).await
    }

    /// Like [`ExecutionContext::execute_debug`], but exits the program if the command can't be
    /// started.
    pub async fn must_execute_debug(&self, command: &dyn ShellCommand) -> ProcessResult {
        or_exit(self.execute_debug(command).await)
    }

    /// Like [`ExecutionContext::execute_debug_detached`], but exits the program if the command
    /// can't be started.
    pub async fn must_execute_debug_detached(&self, command: &dyn ShellCommand) -> ProcessResult {
        or_exit(self.execute_debug_detached(command).await)
    }

    /// Like [`ExecutionContext::execute_silent`], but exits the program if the command can't be
    /// started.
    pub async fn must_execute_silent(&self, command: &dyn ShellCommand) -> ProcessResult {
        or_exit(self.execute_silent(command).await)
    }

    /// Like [`ExecutionContext::execute_silent_detached`], but exits the program if the command
    /// can't be started.
    pub async fn must_execute_silent_detached(&self, command: &dyn ShellCommand) -> ProcessResult {
        or_exit(self.execute_silent_detached(command).await)
    }

    /// Like [`ExecutionContext::execute_fully_silent`], but exits the program if the command
    /// can't be started.
    pub async fn must_execute_fully_silent(&self, command: &dyn ShellCommand) -> ProcessResult {
        or_exit(self.execute_fully_silent(command).await)
    }

    /// Like [`ExecutionContext::execute_fully_silent_detached`], but exits the program if the
    /// command can't be started.
    pub async fn must_execute_fully_silent_detached(
        &self,
        command: &dyn ShellCommand,
    ) -> ProcessResult {
        or_exit(self.execute_fully_silent_detached(command).await)
    }

    /// Like [`ExecutionContext::execute_raw`], but exits the program if the command can't be
    /// started.
    pub async fn must_execute_raw(&self, command: &dyn ShellCommand) -> ProcessResult {
        or_exit(self.execute_raw(command).await)
    }

    /// Like [`ExecutionContext::execute_raw_detached`], but exits the program if the command
    /// can't be started.
    pub async fn must_execute_raw_detached(&self, command: &dyn ShellCommand) -> ProcessResult {
        or_exit(self.execute_raw_detached(command).await)
    }
}

fn or_exit(result: Result<ProcessResult, SpawnError>) -> ProcessResult {
    match result {
        Ok(result) => result,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(1);
        }
    }
}
