//! Contains the [`Extension`], which owns the CMS collaborators and
//! implements each helper as a method.
//!
//! An `Extension` is configured fluently, in the same way a template store
//! is populated:
//!
//! ```text
//! let extension = Extension::new(client, blocks, options, objects)
//!     .with_cms_base_url("https://cms.example.com")
//!     .with_api_base_url("https://cms.example.com/api/v1")
//!     .with_editability(EditabilityContext::new(true, Some(token)));
//! ```
//!
//! Two rendering modes gate the helpers. In markup mode every helper that
//! would reach the CMS returns its default instead, so templates can be
//! previewed without live data. Editable mode adds in-place editing markup
//! to content blocks and objects, and is only active when the caller has
//! supplied a token that the CMS accepts.

use crate::{
    client::RestClient,
    log::Error,
    services::{CompositeObjects, ContentBlocks, Options},
};
use ::log::debug;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// The editability capability of the current request.
///
/// Callers derive this once per request, typically from a configuration
/// flag and the API token carried by the session, and hand it to the
/// [`Extension`]. The remote validation of the token stays behind
/// [`RestClient::validate_token`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditabilityContext {
    /// Whether editing is enabled at all for this deployment.
    pub enabled: bool,
    /// The API token of the current request, if one is present.
    pub token: Option<String>,
}

impl EditabilityContext {
    /// Create a new EditabilityContext.
    #[inline]
    pub fn new<T>(enabled: bool, token: Option<T>) -> Self
    where
        T: Into<String>,
    {
        Self {
            enabled,
            token: token.map(Into::into),
        }
    }

    /// Create a new EditabilityContext with editing disabled.
    #[inline]
    pub fn disabled() -> Self {
        Self::default()
    }
}

/// Exposes CMS content as helper methods for a template engine.
pub struct Extension {
    /// Client used to fetch resources and validate tokens.
    client: Box<dyn RestClient>,
    /// Service resolving content blocks.
    content_blocks: Box<dyn ContentBlocks>,
    /// Service resolving configuration options.
    options: Box<dyn Options>,
    /// Service resolving composite objects.
    objects: Box<dyn CompositeObjects>,
    /// Base URL that asset paths are resolved against.
    cms_base_url: String,
    /// Base URL of the CMS REST API.
    api_base_url: String,
    /// Editability of the current request.
    editability: EditabilityContext,
    /// When set, helpers return defaults instead of live data.
    markup_mode: bool,
}

impl Extension {
    /// Create a new Extension over the given collaborators.
    ///
    /// Base URLs start empty, editing starts disabled and markup mode
    /// starts off; use the `with_*` methods to change any of them.
    pub fn new<C, B, O, J>(client: C, content_blocks: B, options: O, objects: J) -> Self
    where
        C: RestClient + 'static,
        B: ContentBlocks + 'static,
        O: Options + 'static,
        J: CompositeObjects + 'static,
    {
        Self {
            client: Box::new(client),
            content_blocks: Box::new(content_blocks),
            options: Box::new(options),
            objects: Box::new(objects),
            cms_base_url: String::new(),
            api_base_url: String::new(),
            editability: EditabilityContext::disabled(),
            markup_mode: false,
        }
    }

    /// Set the base URL that [`cms_asset`][`Extension::cms_asset`] resolves
    /// resources against.
    ///
    /// Returns the Extension, so additional methods may be chained.
    #[inline]
    pub fn with_cms_base_url<T>(mut self, url: T) -> Self
    where
        T: Into<String>,
    {
        self.cms_base_url = url.into();
        self
    }

    /// Set the base URL of the CMS REST API, used by
    /// [`cms_object_url`][`Extension::cms_object_url`].
    ///
    /// Returns the Extension, so additional methods may be chained.
    #[inline]
    pub fn with_api_base_url<T>(mut self, url: T) -> Self
    where
        T: Into<String>,
    {
        self.api_base_url = url.into();
        self
    }

    /// Set the [`EditabilityContext`] of the current request.
    ///
    /// Returns the Extension, so additional methods may be chained.
    #[inline]
    pub fn with_editability(mut self, editability: EditabilityContext) -> Self {
        self.editability = editability;
        self
    }

    /// Enable or disable markup mode.
    ///
    /// Returns the Extension, so additional methods may be chained.
    #[inline]
    pub fn with_markup_mode(mut self, markup_mode: bool) -> Self {
        self.markup_mode = markup_mode;
        self
    }

    /// Fetch the given URL and decode the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the fetch fails or the body is not valid
    /// JSON.
    pub fn get_json(&self, url: &str) -> Result<Value, Error> {
        debug!("fetching `{url}`");
        self.client.get(url)?.json(url)
    }

    /// Return the text of the named content block.
    ///
    /// In markup mode the default is returned without consulting the
    /// content-block service.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the service fails to resolve the block.
    pub fn content(
        &self,
        category: &str,
        name: &str,
        default: Option<&str>,
    ) -> Result<String, Error> {
        if self.markup_mode {
            return Ok(default.unwrap_or_default().to_string());
        }

        self.content_blocks.get(category, name, default)
    }

    /// Return the markup enabling in-place editing of the named content
    /// block, or an empty string when the request is not editable or
    /// markup mode is on.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the service fails to produce the markup.
    pub fn editable(&self, category: &str, name: &str) -> Result<String, Error> {
        if self.markup_mode {
            return Ok(String::new());
        }

        if self.is_editable() {
            return self.content_blocks.editable(category, name);
        }

        Ok(String::new())
    }

    /// Return the markup enabling in-place editing of the composite object
    /// with the given id, or an empty string when the request is not
    /// editable or markup mode is on.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the service fails to produce the markup.
    pub fn editable_object(&self, id: u64) -> Result<String, Error> {
        if self.markup_mode {
            return Ok(String::new());
        }

        if self.is_editable() {
            return self.objects.editable(id);
        }

        Ok(String::new())
    }

    /// Return the value of the named configuration option.
    ///
    /// In markup mode the default is returned without consulting the
    /// option service.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the service fails to resolve the option.
    pub fn option(
        &self,
        category: &str,
        name: &str,
        default: Option<&str>,
    ) -> Result<String, Error> {
        if self.markup_mode {
            return Ok(default.unwrap_or_default().to_string());
        }

        self.options.get(category, name, default)
    }

    /// Return every composite object of the given class.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the objects cannot be fetched.
    pub fn objects(&self, class_name: &str) -> Result<Value, Error> {
        self.objects.by_class_name(class_name)
    }

    /// Return the composite object with the given id.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the object cannot be fetched.
    pub fn object(&self, id: u64) -> Result<Value, Error> {
        self.objects.get(id)
    }

    /// Return true if the current request may edit content.
    ///
    /// Requires editing to be enabled, a token to be present, and the
    /// token to be accepted by the [`RestClient`].
    pub fn is_editable(&self) -> bool {
        if !self.editability.enabled {
            return false;
        }

        match &self.editability.token {
            Some(token) => {
                let valid = self.client.validate_token(token);
                if !valid {
                    debug!("api token rejected, rendering without edit affordances");
                }
                valid
            }
            None => false,
        }
    }

    /// Resolve a resource path against the CMS base URL.
    ///
    /// In markup mode the resource is returned unchanged.
    pub fn cms_asset(&self, resource: &str) -> String {
        if self.markup_mode {
            return resource.to_string();
        }

        format!("{}/{}", self.cms_base_url, resource)
    }

    /// Return the REST URL listing every composite object of the given
    /// class.
    pub fn cms_object_url(&self, class_name: &str) -> String {
        format!(
            "{}/composite-object/objects?className={}",
            self.api_base_url, class_name
        )
    }
}

/// Collapse the whitespace between adjacent tags and trim the result.
///
/// # Examples
///
/// ```
/// use mortar::extension::spaceless;
///
/// assert_eq!(spaceless(" <p> a </p>  <p>b</p> "), "<p> a </p><p>b</p>");
/// ```
pub fn spaceless(value: &str) -> String {
    static BETWEEN_TAGS: OnceLock<Regex> = OnceLock::new();
    let pattern = BETWEEN_TAGS.get_or_init(|| Regex::new(r">\s+<").unwrap());

    pattern.replace_all(value, "><").trim().to_string()
}
