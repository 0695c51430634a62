use serde_json::Value;
use std::fmt::Write;

/// A wrapper around an underlying buffer that provides methods to write
/// helper output in template form.
pub struct Formatter<'a> {
    buffer: &'a mut String,
}

impl<'a> Formatter<'a> {
    /// Create a new Formatter which writes to the given String.
    pub fn new(buffer: &'a mut String) -> Self {
        Self { buffer }
    }

    /// Write the given Value to the Formatter buffer.
    ///
    /// Strings are written bare and null is written as nothing, so helper
    /// output lands in the page the way a template author expects.
    ///
    /// # Errors
    ///
    /// The Formatter supports all Value types, so the only error that will
    /// be returned is propagated from the [write!] macro itself.
    pub fn write_value(&mut self, value: &Value) -> std::fmt::Result {
        match value {
            Value::Null => Ok(()),
            Value::Bool(bool) => write!(self.buffer, "{}", bool),
            Value::Number(number) => write!(self.buffer, "{}", number),
            Value::String(string) => write!(self.buffer, "{}", string),
            Value::Array(array) => {
                write!(self.buffer, "[")?;
                let mut iter = array.iter();
                if let Some(item) = iter.next() {
                    self.write_value(item)?;
                    for item in iter {
                        write!(self.buffer, ", ")?;
                        self.write_value(item)?;
                    }
                }
                write!(self.buffer, "]")
            }
            Value::Object(object) => {
                write!(self.buffer, "{{")?;
                let mut iter = object.iter();
                if let Some((key, value)) = iter.next() {
                    write!(self.buffer, "{}: ", key)?;
                    self.write_value(value)?;
                    for (key, value) in iter {
                        write!(self.buffer, ", {}: ", key)?;
                        self.write_value(value)?;
                    }
                }
                write!(self.buffer, "}}")
            }
        }
    }
}
