use std::fmt::Display;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

/// Construct a [`clap::Error`] for a rejected argument value, formatted like clap's own
/// validation errors.
///
/// Clap doesn't expose a way to build these with a custom message, so this mimics the layout.
pub fn value_validation_error(
    arg: Option<&clap::Arg>,
    bad_value: &str,
    message: impl Display,
) -> clap::Error {
    clap::Error::raw(
        clap::error::ErrorKind::ValueValidation,
        format!(
            "invalid value '{bad_value}' for '{arg}': {message}\n\n\
            For more information, try '{help}'.\n",
            bad_value = bad_value.if_supports_color(Stdout, |text| text.yellow()),
            arg = arg
                .map(ToString::to_string)
                .unwrap_or_else(|| "...".to_owned())
                .if_supports_color(Stdout, |text| text.bold()),
            help = "--help".if_supports_color(Stdout, |text| text.bold()),
        ),
    )
}
