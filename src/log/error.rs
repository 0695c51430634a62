use super::{RED, RESET};
use std::fmt::{Debug, Display, Formatter, Result};

/// Describes an error, and allows adding contextual help text.
///
/// # Examples
///
/// ```
/// use mortar::Error;
///
/// let error = Error::build("invalid argument")
///     .with_name("content")
///     .with_help("expected a category and a block name");
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces
/// this output:
///
/// ```text
/// error: invalid argument
///  --> content
///  = help: expected a category and a block name
/// ```
pub struct Error {
    /// Describes the cause of the [`Error`].
    reason: String,
    /// The name of the helper that the [`Error`] comes from.
    name: Option<String>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
}

impl Error {
    /// Create a new [`Error`] with the given reason text.
    ///
    /// The additional fields may be populated using the various methods
    /// defined on `Error`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mortar::Error;
    ///
    /// Error::build("invalid argument")
    ///     .with_help("expected a category and a block name");
    /// ```
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            reason: reason.into(),
            name: None,
            help: None,
        }
    }

    /// Set the reason text, which is a short summary of the [`Error`].
    pub fn with_reason<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.reason = text.into();

        self
    }

    /// Set the name text, which is the name of the helper that the
    /// [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the help text, which is contextual information to accompany
    /// the reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Return the name of the helper that the error is related to.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return the help text, if any.
    pub fn get_help(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            writeln!(f, "{self:#}")?;
        }
        f.debug_struct("Error")
            .field("reason", &self.reason)
            .field("name", &self.name)
            .field("help", &self.help)
            .finish()?;

        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let header = format!("{RED}error{RESET}");
        write!(f, "{header}: {}", self.reason)?;

        if f.alternate() {
            if let Some(name) = &self.name {
                write!(f, "\n --> {}", name)?;
            }
            if let Some(help) = &self.help {
                write!(f, "\n = help: {}", help)?;
            }
        }

        Ok(())
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.reason == other.reason && self.help == other.help && self.name == other.name
    }
}
