//! Adapters for parsing [`clap`] arguments to various types.

mod error_message;
mod key_value;
mod rust_backtrace;

pub use error_message::value_validation_error;
pub use key_value::KeyValue;
pub use rust_backtrace::RustBacktrace;
