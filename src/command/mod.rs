//! Commands: ordered lists of a binary and its arguments, and their shell-style serialization.

use std::borrow::Cow;
use std::fmt::Debug;

use itertools::Itertools;

mod local;
mod ssh;

pub use local::LocalCommand;
pub use ssh::SshCommand;

/// A command which can be launched by an [`ExecutionContext`][crate::ExecutionContext].
///
/// Element 0 is the binary and the rest are its arguments. Commands only ever grow: the first
/// element added becomes the binary, and every later element is appended as an argument.
pub trait ShellCommand: Debug + Send + Sync {
    /// The full list of elements this command will execute, binary first.
    fn elements(&self) -> Vec<String>;

    /// Append a single element.
    fn push(&mut self, element: String);

    /// Append an element. If the command is empty, this becomes the binary.
    fn add(&mut self, element: impl Into<String>) -> &mut Self
    where
        Self: Sized,
    {
        self.push(element.into());
        self
    }

    /// Append several elements in order.
    fn add_all<I>(&mut self, elements: I) -> &mut Self
    where
        Self: Sized,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for element in elements {
            self.push(element.into());
        }
        self
    }

    /// The binary, or the empty string for an empty command.
    fn binary(&self) -> String {
        self.elements().into_iter().next().unwrap_or_default()
    }

    /// Every element after the binary.
    fn args(&self) -> Vec<String> {
        self.elements().into_iter().skip(1).collect()
    }

    /// Serialize the command into a single line, quoting elements so that
    /// [`split`][crate::split()] reads them back.
    fn serialize(&self) -> String {
        join(self.elements())
    }
}

/// Join elements into a command line, quoting each with [`quote`].
pub fn join<I>(elements: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    elements
        .into_iter()
        .map(|element| quote(element.as_ref()).into_owned())
        .join(" ")
}

/// Quote a single element.
///
/// Double quotes are escaped with a backslash. Elements containing a space are then wrapped in
/// double quotes, unless they're already wrapped in a matching pair of `"` or `'`.
pub fn quote(element: &str) -> Cow<'_, str> {
    let escaped = if element.contains('"') {
        Cow::Owned(element.replace('"', "\\\""))
    } else {
        Cow::Borrowed(element)
    };

    if escaped.contains(' ') && !is_wrapped(&escaped) {
        Cow::Owned(format!("\"{escaped}\""))
    } else {
        escaped
    }
}

fn is_wrapped(element: &str) -> bool {
    element.len() >= 2
        && ['"', '\'']
            .into_iter()
            .any(|quote| element.starts_with(quote) && element.ends_with(quote))
}
