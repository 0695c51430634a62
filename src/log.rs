mod error;

pub use error::Error;

use std::fmt::Display;

pub(crate) const RED: &str = "\x1B[31m";
pub(crate) const RESET: &str = "\x1B[0m";

pub const INVALID_HELPER: &str = "invalid helper";
pub const INVALID_ARGUMENT: &str = "invalid argument";
pub const INVALID_FILTER_SPEC: &str = "invalid filter spec";
pub const INVALID_RESPONSE: &str = "invalid response";

/// Return an [`Error`] describing a missing helper.
pub fn error_missing_helper(name: &str) -> Error {
    Error::build(INVALID_HELPER)
        .with_name(name)
        .with_help(format!(
            "helper `{}` not found in registry, add it with `.add_helper`",
            name
        ))
}

/// Return an [`Error`] describing a missing helper argument.
pub fn error_missing_argument<T>(helper: &str, expected: T) -> Error
where
    T: Display,
{
    Error::build(INVALID_ARGUMENT)
        .with_name(helper)
        .with_help(format!("helper `{}` expects {}", helper, expected))
}

/// Return an [`Error`] explaining that the write operation failed.
///
/// This is likely caused by a failure during a `write!` macro operation.
pub fn error_write() -> Error {
    Error::build("write failure").with_help("failed to write helper output, are you low on memory?")
}

/// Return an [`Error`] describing a response body that could not be
/// decoded as JSON.
pub fn error_undecodable(url: &str) -> Error {
    Error::build(INVALID_RESPONSE).with_help(format!(
        "response body from `{}` is not valid JSON",
        url
    ))
}
