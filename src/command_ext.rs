use std::io;

use command_group::AsyncCommandGroup;
use tokio::process::Command;

use crate::child::ProcessChild;

/// Extension trait for spawning commands as a [`ProcessChild`].
pub trait SpawnExt {
    /// Spawn the command. If `detach` is true, the child is placed in a new process group so
    /// that it can be signalled as a unit and doesn't receive this process's terminal signals.
    fn spawn_child(&mut self, detach: bool) -> io::Result<ProcessChild>;
}

impl SpawnExt for Command {
    fn spawn_child(&mut self, detach: bool) -> io::Result<ProcessChild> {
        if detach {
            self.group_spawn().map(ProcessChild::Detached)
        } else {
            self.spawn().map(ProcessChild::Attached)
        }
    }
}
