//! Splitting command-line strings into tokens.
//!
//! Tokens are separated by runs of ASCII spaces, and `"` or `'` delimit quoted tokens. Inside a
//! quoted token, a backslash followed by the token's own delimiter is a literal delimiter. There
//! are no other escapes, and tabs and newlines are ordinary characters.
//!
//! Splitting never fails. A quote with no matching closing quote is treated as an ordinary
//! character, so `"abc` is the single token `"abc`.

use winnow::combinator::alt;
use winnow::combinator::delimited;
use winnow::combinator::preceded;
use winnow::combinator::repeat;
use winnow::combinator::terminated;
use winnow::error::ContextError;
use winnow::token::none_of;
use winnow::token::take_till;
use winnow::token::take_while;
use winnow::PResult;
use winnow::Parser;

/// Split a command line into its binary and arguments.
///
/// ```
/// assert_eq!(
///     shellout::split(r#"git commit -m "first commit""#),
///     (
///         "git".to_owned(),
///         vec!["commit".to_owned(), "-m".to_owned(), "first commit".to_owned()]
///     )
/// );
/// ```
pub fn split(input: &str) -> (String, Vec<String>) {
    let tokens = command_line.parse(input).unwrap_or_else(|err| {
        // The grammar accepts every input; this is only a last resort.
        tracing::debug!(%err, input, "Falling back to splitting on spaces");
        input
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    });

    let mut tokens = tokens.into_iter();
    let binary = tokens.next().unwrap_or_default();
    (binary, tokens.collect())
}

/// All the tokens in a command line, with surrounding spaces discarded.
fn command_line(input: &mut &str) -> PResult<Vec<String>> {
    terminated(repeat(0.., preceded(spaces, token)), spaces).parse_next(input)
}

/// A run of zero or more ASCII spaces.
fn spaces<'i>(input: &mut &'i str) -> PResult<&'i str> {
    take_while(0.., ' ').parse_next(input)
}

/// A single token.
///
/// Quoted tokens are attempted first. If the closing quote is missing, the quoted parsers
/// backtrack and the opening quote is read as the first character of an unquoted token.
fn token(input: &mut &str) -> PResult<String> {
    alt((quoted('"', "\\\""), quoted('\'', "\\'"), unquoted)).parse_next(input)
}

/// A token delimited by `quote`, where `escape` stands for a literal `quote`.
fn quoted<'i>(
    quote: char,
    escape: &'static str,
) -> impl Parser<&'i str, String, ContextError> {
    delimited(
        quote,
        repeat(0.., alt((escape.value(quote), none_of(quote)))),
        quote,
    )
}

/// A token running up to the next space or the end of the input.
fn unquoted(input: &mut &str) -> PResult<String> {
    take_till(1.., ' ').map(ToOwned::to_owned).parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn owned(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|token| (*token).to_owned()).collect()
    }

    #[test]
    fn test_split_simple() {
        assert_eq!(split("ls -la"), ("ls".to_owned(), owned(&["-la"])));
        assert_eq!(
            split("./bin exit-code-error second_ARG"),
            ("./bin".to_owned(), owned(&["exit-code-error", "second_ARG"]))
        );
        assert_eq!(split("true"), ("true".to_owned(), vec![]));
    }

    #[test]
    fn test_split_empty() {
        assert_eq!(split(""), (String::new(), vec![]));
        assert_eq!(split("    "), (String::new(), vec![]));
    }

    #[test]
    fn test_split_whitespace_runs() {
        assert_eq!(
            split("  bin -p  \"fir st\"   \"sec ond\"  "),
            ("bin".to_owned(), owned(&["-p", "fir st", "sec ond"]))
        );

        // Only spaces separate tokens.
        assert_eq!(split("a\tb c"), ("a\tb".to_owned(), owned(&["c"])));
    }

    #[test]
    fn test_split_quoted() {
        assert_eq!(
            split(r#""quoted bin" "fir st" 'sec ond'"#),
            ("quoted bin".to_owned(), owned(&["fir st", "sec ond"]))
        );

        // Quotes of the other kind are literal.
        assert_eq!(
            split(r#"echo "it's" 'say "hi"'"#),
            ("echo".to_owned(), owned(&["it's", r#"say "hi""#]))
        );

        // A quoted token doesn't need a space after it.
        assert_eq!(split(r#""a"b"#), ("a".to_owned(), owned(&["b"])));

        // Empty quoted tokens are still tokens.
        assert_eq!(split(r#""" ls"#), (String::new(), owned(&["ls"])));
    }

    #[test]
    fn test_split_escaped_quotes() {
        assert_eq!(
            split(r#""\"bin" 'par am"'"#),
            ("\"bin".to_owned(), owned(&["par am\""]))
        );
        assert_eq!(split(r"'it\'s'"), ("it's".to_owned(), vec![]));

        // Backslashes are only special before the matching quote.
        assert_eq!(
            split(r#""C:\dir" a\b"#),
            (r"C:\dir".to_owned(), owned(&[r"a\b"]))
        );
    }

    #[test]
    fn test_split_unterminated_quotes() {
        assert_eq!(
            split(r#"echo "unterminated arg"#),
            ("echo".to_owned(), owned(&["\"unterminated", "arg"]))
        );
        assert_eq!(split("'abc"), ("'abc".to_owned(), vec![]));
        // The escape swallows the only closing quote.
        assert_eq!(split(r#""ab\""#), (r#""ab\""#.to_owned(), vec![]));
    }

    #[test]
    fn test_split_unquoted_round_trip() {
        let line = "cargo  build --release    --target x86_64-unknown-linux-gnu";
        let (binary, args) = split(line);
        let rejoined = std::iter::once(binary).chain(args).collect::<Vec<_>>().join(" ");
        assert_eq!(rejoined, line.split_whitespace().collect::<Vec<_>>().join(" "));
    }
}
