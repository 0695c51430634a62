//! Mortar - CMS content helpers for template engines.
//!
//! Mortar exposes CMS-managed content as named helpers that a template
//! engine can call while rendering a page: content blocks, configuration
//! options, composite objects, asset URLs, and a declarative list filter.
//! The crate is glue, not transport; the REST client and content services
//! are injected behind traits, and every helper either formats a string or
//! forwards to one of them.
//!
//! An [`Extension`] holds the collaborators and implements each helper as
//! a method. A [`Registry`] maps helper names to [`Helper`] instances, so
//! an engine integration only needs name-based lookup.
//!
//! The list filter also stands on its own:
//!
//! ```
//! use mortar::filter::ListFilter;
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({"id": 1, "type": "page"}),
//!     json!({"id": 2, "type": "post"}),
//! ];
//!
//! let filter = ListFilter::from_value(&json!([{"type": "page"}])).unwrap();
//! assert_eq!(filter.apply(&records), vec![json!({"id": 1, "type": "page"})]);
//! ```

pub mod client;
pub mod extension;
pub mod filter;
mod format;
pub mod helpers;
mod log;
pub mod services;

pub use client::{Response, RestClient};
pub use extension::{EditabilityContext, Extension};
pub use filter::ListFilter;
pub use helpers::{Helper, Registry};
pub use crate::log::Error;
pub use services::{CompositeObjects, ContentBlocks, Options};
