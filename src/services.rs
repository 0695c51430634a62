//! Contains the traits for the three CMS content services.
//!
//! Each service is an opaque collaborator: the helpers forward to it and
//! return whatever it produces. How a service resolves a block, option or
//! object (REST, cache, fixture data) is its own concern.

use crate::log::Error;
use serde_json::Value;

/// Describes a type that can resolve named, categorized content blocks.
pub trait ContentBlocks: Sync + Send {
    /// Return the text of the named content block, or the default when the
    /// block does not exist.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the block cannot be resolved.
    fn get(&self, category: &str, name: &str, default: Option<&str>) -> Result<String, Error>;

    /// Return the markup that enables in-place editing of the named
    /// content block.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the markup cannot be produced.
    fn editable(&self, category: &str, name: &str) -> Result<String, Error>;
}

/// Describes a type that can resolve named, categorized configuration
/// options.
pub trait Options: Sync + Send {
    /// Return the value of the named option, or the default when the
    /// option does not exist.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the option cannot be resolved.
    fn get(&self, category: &str, name: &str, default: Option<&str>) -> Result<String, Error>;
}

/// Describes a type that can resolve composite objects, the generically
/// typed records managed by the CMS.
pub trait CompositeObjects: Sync + Send {
    /// Return every object of the given class as a [`Value`] array.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the objects cannot be fetched.
    fn by_class_name(&self, class_name: &str) -> Result<Value, Error>;

    /// Return the object with the given id.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the object cannot be fetched.
    fn get(&self, id: u64) -> Result<Value, Error>;

    /// Return the markup that enables in-place editing of the object with
    /// the given id.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the markup cannot be produced.
    fn editable(&self, id: u64) -> Result<String, Error>;
}
