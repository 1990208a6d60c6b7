use std::fmt::Display;

use tap::Tap;

use super::ShellCommand;

/// A command run on another machine over `ssh`.
///
/// The command's own elements are appended after `ssh`, its `-o` options and the target, so
/// `SshCommand::from_string("root@example.com", "ls -la")` runs `ssh root@example.com ls -la`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshCommand {
    target: String,
    /// `-o` options, in the order they were first added.
    options: Vec<(String, String)>,
    elements: Vec<String>,
}

impl SshCommand {
    /// Construct an empty command for the given `ssh` target, like `user@host`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            options: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Construct a command for the given target by splitting a command line with
    /// [`split`][crate::split()].
    pub fn from_string(target: impl Into<String>, command_line: &str) -> Self {
        let (binary, args) = crate::split(command_line);
        Self::new(target).tap_mut(|command| {
            if !binary.is_empty() || !args.is_empty() {
                command.add(binary).add_all(args);
            }
        })
    }

    /// The `ssh` target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Set an `ssh` option, passed as `-o KEY=VALUE`.
    ///
    /// Setting an option again replaces its value but keeps its original position.
    pub fn add_option(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.options.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, existing)) => *existing = value,
            None => self.options.push((key, value)),
        }
        self
    }
}

impl ShellCommand for SshCommand {
    fn elements(&self) -> Vec<String> {
        let mut elements = Vec::with_capacity(2 + 2 * self.options.len() + self.elements.len());
        elements.push("ssh".to_owned());
        for (key, value) in &self.options {
            elements.push("-o".to_owned());
            elements.push(format!("{key}={value}"));
        }
        elements.push(self.target.clone());
        elements.extend(self.elements.iter().cloned());
        elements
    }

    fn push(&mut self, element: String) {
        self.elements.push(element);
    }
}

impl Display for SshCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.serialize())
    }
}
