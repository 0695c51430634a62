//! Contains the [`RestClient`] trait, the boundary between the helpers and
//! the CMS REST API.
//!
//! The crate never performs HTTP itself. An [`Extension`][`crate::Extension`]
//! receives a boxed `RestClient` and forwards `get` helper calls and token
//! validation to it; anything that can produce a [`Response`] for a URL can
//! act as the client, including an in-memory double in tests.

use crate::log::{error_undecodable, Error};
use serde_json::Value;

/// A response returned by a [`RestClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code of the response.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl Response {
    /// Create a new Response with a status of 200.
    #[inline]
    pub fn ok<T>(body: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Decode the body of the Response as JSON to return a [`Value`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the body is not valid JSON. The `url` is
    /// only used to describe the failure.
    pub fn json(&self, url: &str) -> Result<Value, Error> {
        serde_json::from_str(&self.body).map_err(|_| error_undecodable(url))
    }
}

/// Describes a type that can fetch CMS resources and validate API tokens.
pub trait RestClient: Sync + Send {
    /// Fetch the resource at the given URL.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the resource cannot be fetched.
    fn get(&self, url: &str) -> Result<Response, Error>;

    /// Return true if the CMS accepts the given API token.
    fn validate_token(&self, token: &str) -> bool;
}
