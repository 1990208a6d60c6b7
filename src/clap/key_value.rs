//! Adapter for parsing `KEY=VALUE` pairs with a [`clap::builder::Arg::value_parser`].

use std::fmt::Display;

use clap::builder::StringValueParser;
use clap::builder::TypedValueParser;
use clap::builder::ValueParserFactory;
use miette::LabeledSpan;
use miette::MietteDiagnostic;
use miette::Report;

use super::value_validation_error;

/// A `KEY=VALUE` pair, like an environment variable assignment or an `ssh -o` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// The text before the first `=`.
    pub key: String,
    /// The text after the first `=`. May be empty.
    pub value: String,
}

impl Display for KeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl ValueParserFactory for KeyValue {
    type Parser = KeyValueParser;

    fn value_parser() -> Self::Parser {
        Self::Parser::default()
    }
}

/// Adapter for parsing [`KeyValue`] with a [`clap::builder::Arg::value_parser`].
#[derive(Default, Clone)]
pub struct KeyValueParser {
    inner: StringValueParser,
}

impl TypedValueParser for KeyValueParser {
    type Value = KeyValue;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        self.inner.parse_ref(cmd, arg, value).and_then(|str_value| {
            let (message, help, labels) = match str_value.split_once('=') {
                Some(("", _)) => (
                    "Empty key",
                    None,
                    vec![LabeledSpan::at(0..1, "Expected a key before `=`")],
                ),
                Some((key, value)) => {
                    return Ok(KeyValue {
                        key: key.to_owned(),
                        value: value.to_owned(),
                    });
                }
                None => (
                    "Missing `=`",
                    Some("Write the value after an `=`, like `KEY=VALUE`".to_owned()),
                    vec![LabeledSpan::at(0..str_value.len(), "Expected `KEY=VALUE`")],
                ),
            };

            let diagnostic = Report::new(MietteDiagnostic {
                message: message.to_owned(),
                code: None,
                severity: None,
                help,
                url: None,
                labels: Some(labels),
            })
            .with_source_code(str_value.clone());
            Err(value_validation_error(
                arg,
                &str_value,
                format!("{diagnostic:?}"),
            ))
        })
    }
}
