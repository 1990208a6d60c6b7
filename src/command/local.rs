use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;

use tap::Tap;

use super::ShellCommand;

/// A command run on this machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalCommand {
    elements: Vec<String>,
}

impl LocalCommand {
    /// Construct an empty command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a command by splitting a command line with [`split`][crate::split()].
    ///
    /// An empty or all-space command line produces an empty command.
    pub fn from_string(command_line: &str) -> Self {
        let (binary, args) = crate::split(command_line);
        Self::new().tap_mut(|command| {
            if !binary.is_empty() || !args.is_empty() {
                command.add(binary).add_all(args);
            }
        })
    }
}

impl ShellCommand for LocalCommand {
    fn elements(&self) -> Vec<String> {
        self.elements.clone()
    }

    fn push(&mut self, element: String) {
        self.elements.push(element);
    }
}

impl FromStr for LocalCommand {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_string(s))
    }
}

impl<S: Into<String>> FromIterator<S> for LocalCommand {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            elements: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Display for LocalCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.serialize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_string() {
        let command = LocalCommand::from_string("ls -la");
        assert_eq!(command.binary(), "ls");
        assert_eq!(command.args(), vec!["-la".to_owned()]);
        assert_eq!(command.elements(), vec!["ls".to_owned(), "-la".to_owned()]);
    }

    #[test]
    fn test_from_string_empty() {
        let command: LocalCommand = "   ".parse().unwrap();
        assert_eq!(command, LocalCommand::new());
        assert_eq!(command.binary(), "");
        assert_eq!(command.args(), Vec::<String>::new());
        assert_eq!(command.serialize(), "");
    }

    #[test]
    fn test_add() {
        let mut command = LocalCommand::new();
        command.add("git");
        assert_eq!(command.binary(), "git");
        assert_eq!(command.args(), Vec::<String>::new());

        command.add("commit").add_all(["-m", "first commit"]);
        assert_eq!(command.binary(), "git");
        assert_eq!(
            command.args(),
            vec!["commit".to_owned(), "-m".to_owned(), "first commit".to_owned()]
        );
    }

    #[test]
    fn test_serialize() {
        let cases = [
            (vec!["ls", "-al", "file"], "ls -al file"),
            (vec!["ls", "my file.txt"], r#"ls "my file.txt""#),
            (vec!["ls", "*.test"], "ls *.test"),
            (vec!["ls", r#"weird".file"#], r#"ls weird\".file"#),
            (vec!["ls", "'my custom file'"], "ls 'my custom file'"),
        ];

        for (elements, expected) in cases {
            let command = elements.into_iter().collect::<LocalCommand>();
            assert_eq!(command.serialize(), expected);
            assert_eq!(command.to_string(), expected);
        }
    }

    #[test]
    fn test_serialize_round_trip() {
        let command = ["cp", "my file.txt", "other file.txt", "-v"]
            .into_iter()
            .collect::<LocalCommand>();
        assert_eq!(LocalCommand::from_string(&command.serialize()), command);
    }
}
